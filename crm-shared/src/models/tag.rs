/// Tag model and the customer ↔ tag link table
///
/// Tags are global labels with unique names, attached to customers through
/// `customer_tags`. A tag is created the first time a customer uses its name
/// and is never removed implicitly.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE customer_tags (
///     customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (customer_id, tag_id)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Tag with the number of the requesting user's customers carrying it
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagUsage {
    pub id: Uuid,
    pub name: String,
    pub customer_count: i64,
}

#[derive(sqlx::FromRow)]
struct CustomerTagRow {
    customer_id: Uuid,
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl Tag {
    /// Replaces the tag set of a customer, creating missing tags
    ///
    /// `names` must already be normalized (see `validation::normalize_tags`).
    /// Run inside the transaction that wrote the customer.
    ///
    /// Missing tags are inserted in one statement, in name order; existing
    /// tag rows are never locked. Concurrent writers of overlapping tag sets
    /// therefore queue in the same order.
    pub async fn replace_for_customer(
        conn: &mut PgConnection,
        customer_id: Uuid,
        names: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let names: Vec<String> = names
            .iter()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        sqlx::query("DELETE FROM customer_tags WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *conn)
            .await?;

        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT name FROM UNNEST($1::text[]) AS input(name)
            ORDER BY name
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&names)
        .execute(&mut *conn)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, created_at FROM tags WHERE name = ANY($1) ORDER BY name",
        )
        .bind(&names)
        .fetch_all(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO customer_tags (customer_id, tag_id) \
             SELECT $1, id FROM tags WHERE name = ANY($2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(customer_id)
        .bind(&names)
        .execute(&mut *conn)
        .await?;

        Ok(tags)
    }

    /// Tags of one customer, by name
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM tags t
            JOIN customer_tags ct ON ct.tag_id = t.id
            WHERE ct.customer_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await
    }

    /// Tags for several customers at once, keyed by customer id
    ///
    /// Customers without tags are absent from the map.
    pub async fn list_for_customers(
        pool: &PgPool,
        customer_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Self>>, sqlx::Error> {
        if customer_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CustomerTagRow>(
            r#"
            SELECT ct.customer_id, t.id, t.name, t.created_at
            FROM customer_tags ct
            JOIN tags t ON t.id = ct.tag_id
            WHERE ct.customer_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(customer_ids)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            map.entry(row.customer_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
            });
        }
        Ok(map)
    }

    /// All tags by name with the user's usage count
    pub async fn list_with_usage(pool: &PgPool, user_id: Uuid) -> Result<Vec<TagUsage>, sqlx::Error> {
        sqlx::query_as::<_, TagUsage>(
            r#"
            SELECT t.id, t.name, COUNT(c.id) AS customer_count
            FROM tags t
            LEFT JOIN customer_tags ct ON ct.tag_id = t.id
            LEFT JOIN customers c ON c.id = ct.customer_id AND c.user_id = $1
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
