/// Customer model and database operations
///
/// A customer belongs to exactly one user (the sales rep who created it).
/// Every query here takes the owner's id and filters on it, so a customer owned
/// by somebody else behaves exactly like a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE customer_status AS ENUM ('PROSPECT', 'ACTIVE', 'LOST');
///
/// CREATE TABLE customers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(64),
///     company VARCHAR(255),
///     status customer_status NOT NULL DEFAULT 'PROSPECT',
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::tag::Tag;

/// Where a customer stands in the sales pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "customer_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    /// Potential customer, not yet converted
    Prospect,

    /// Current paying customer
    Active,

    /// Former customer or lost opportunity
    Lost,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Prospect
    }
}

/// Customer row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: CustomerStatus,

    /// Owning user
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer together with its tags, the shape returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerWithTags {
    #[serde(flatten)]
    pub customer: Customer,
    pub tags: Vec<Tag>,
}

/// Input for creating a customer (already validated and trimmed)
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: CustomerStatus,

    /// Normalized tag names
    pub tags: Vec<String>,
}

/// Partial update; only `Some` fields are written
///
/// `phone` and `company` use `Some(None)` to clear the column. `tags`, when
/// present, replaces the whole tag set.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub status: Option<CustomerStatus>,
    pub tags: Option<Vec<String>>,
}

/// List filters
#[derive(Debug, Clone)]
pub struct CustomerFilter {
    /// Case-insensitive substring over name, email and company
    pub search: Option<String>,
    pub status: Option<CustomerStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for CustomerFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Per-status totals for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCounts {
    pub total: i64,
    pub prospect: i64,
    pub active: i64,
    pub lost: i64,
}

const CUSTOMER_COLUMNS: &str =
    "id, name, email, phone, company, status, user_id, created_at, updated_at";

/// Escapes `%`, `_` and `\` so user input is matched literally by ILIKE
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Customer {
    /// Inserts the customer and its tag links in one transaction
    pub async fn create(pool: &PgPool, data: CreateCustomer) -> Result<CustomerWithTags, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO customers (name, email, phone, company, status, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            CUSTOMER_COLUMNS
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(data.name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.company)
            .bind(data.status)
            .bind(data.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let tags = Tag::replace_for_customer(&mut *tx, customer.id, &data.tags).await?;

        tx.commit().await?;

        Ok(CustomerWithTags { customer, tags })
    }

    /// Finds a customer owned by `user_id`
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM customers WHERE id = $1 AND user_id = $2",
            CUSTOMER_COLUMNS
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an owned customer and loads its tags
    pub async fn find_owned_with_tags(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CustomerWithTags>, sqlx::Error> {
        let Some(customer) = Self::find_owned(pool, id, user_id).await? else {
            return Ok(None);
        };

        let tags = Tag::list_for_customer(pool, customer.id).await?;
        Ok(Some(CustomerWithTags { customer, tags }))
    }

    /// Lists the user's customers newest first, with tags
    pub async fn list_owned(
        pool: &PgPool,
        user_id: Uuid,
        filter: &CustomerFilter,
    ) -> Result<Vec<CustomerWithTags>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        qb.push(CUSTOMER_COLUMNS);
        qb.push(" FROM customers WHERE user_id = ");
        qb.push_bind(user_id);

        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR company ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY created_at DESC, id LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);

        let customers = qb.build_query_as::<Customer>().fetch_all(pool).await?;

        let ids: Vec<Uuid> = customers.iter().map(|c| c.id).collect();
        let mut tags = Tag::list_for_customers(pool, &ids).await?;

        Ok(customers
            .into_iter()
            .map(|customer| {
                let tags = tags.remove(&customer.id).unwrap_or_default();
                CustomerWithTags { customer, tags }
            })
            .collect())
    }

    /// Applies a partial update to an owned customer
    ///
    /// Returns `None` when the customer is missing or owned by someone else.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateCustomer,
    ) -> Result<Option<CustomerWithTags>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE customers SET updated_at = NOW()");

        if let Some(name) = data.name {
            qb.push(", name = ");
            qb.push_bind(name);
        }
        if let Some(email) = data.email {
            qb.push(", email = ");
            qb.push_bind(email);
        }
        if let Some(phone) = data.phone {
            qb.push(", phone = ");
            qb.push_bind(phone);
        }
        if let Some(company) = data.company {
            qb.push(", company = ");
            qb.push_bind(company);
        }
        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND user_id = ");
        qb.push_bind(user_id);
        qb.push(" RETURNING ");
        qb.push(CUSTOMER_COLUMNS);

        let Some(customer) = qb
            .build_query_as::<Customer>()
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let tags = match data.tags {
            Some(names) => Tag::replace_for_customer(&mut *tx, customer.id, &names).await?,
            None => {
                sqlx::query_as::<_, Tag>(
                    r#"
                    SELECT t.id, t.name, t.created_at
                    FROM tags t
                    JOIN customer_tags ct ON ct.tag_id = t.id
                    WHERE ct.customer_id = $1
                    ORDER BY t.name
                    "#,
                )
                .bind(customer.id)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(Some(CustomerWithTags { customer, tags }))
    }

    /// Deletes an owned customer; notes and tag links cascade
    ///
    /// Returns true if a row was deleted.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Totals per status for the user's customers
    pub async fn counts_for_user(pool: &PgPool, user_id: Uuid) -> Result<CustomerCounts, sqlx::Error> {
        let rows: Vec<(CustomerStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM customers WHERE user_id = $1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(CustomerCounts::from_rows(&rows))
    }
}

impl CustomerCounts {
    pub fn from_rows(rows: &[(CustomerStatus, i64)]) -> Self {
        let mut counts = CustomerCounts::default();
        for (status, count) in rows {
            match status {
                CustomerStatus::Prospect => counts.prospect += count,
                CustomerStatus::Active => counts.active += count,
                CustomerStatus::Lost => counts.lost += count,
            }
            counts.total += count;
        }
        counts
    }
}
