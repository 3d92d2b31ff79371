/// Problems tracker
///
/// Problems are issues a user logs against a free-form category and moves
/// through UNSOLVED → REVIEW → SOLVED. They are private to their owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE problem_status AS ENUM ('UNSOLVED', 'SOLVED', 'REVIEW');
///
/// CREATE TABLE problems (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     category VARCHAR(100) NOT NULL,
///     status problem_status NOT NULL DEFAULT 'UNSOLVED',
///     date_solved TIMESTAMPTZ,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "problem_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemStatus {
    Unsolved,
    Solved,
    Review,
}

impl Default for ProblemStatus {
    fn default() -> Self {
        ProblemStatus::Unsolved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ProblemStatus,
    pub date_solved: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProblem {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ProblemStatus,
    pub date_solved: Option<DateTime<Utc>>,
}

/// Partial update; `date_solved: Some(None)` clears the column
#[derive(Debug, Clone, Default)]
pub struct UpdateProblem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<ProblemStatus>,
    pub date_solved: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProblemFilter {
    pub status: Option<ProblemStatus>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Summary shown above the problem list and on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStats {
    pub total: i64,
    pub solved: i64,
    pub unsolved: i64,
    pub review: i64,

    /// SOLVED count per category, sorted by category name
    pub solved_by_category: Vec<CategoryCount>,
}

impl ProblemStats {
    /// Aggregates `(category, status, count)` groups
    pub fn from_groups(groups: &[(String, ProblemStatus, i64)]) -> Self {
        let mut stats = ProblemStats::default();
        let mut by_category: BTreeMap<&str, i64> = BTreeMap::new();

        for (category, status, count) in groups {
            stats.total += count;
            let solved = by_category.entry(category.as_str()).or_insert(0);
            match status {
                ProblemStatus::Solved => {
                    stats.solved += count;
                    *solved += count;
                }
                ProblemStatus::Unsolved => stats.unsolved += count,
                ProblemStatus::Review => stats.review += count,
            }
        }

        stats.solved_by_category = by_category
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        stats
    }
}

const PROBLEM_COLUMNS: &str =
    "id, title, description, category, status, date_solved, user_id, created_at, updated_at";

impl Problem {
    pub async fn create(pool: &PgPool, data: CreateProblem) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO problems (title, description, category, status, date_solved, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PROBLEM_COLUMNS
        );

        sqlx::query_as::<_, Problem>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.category)
            .bind(data.status)
            .bind(data.date_solved)
            .bind(data.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM problems WHERE id = $1 AND user_id = $2",
            PROBLEM_COLUMNS
        );

        sqlx::query_as::<_, Problem>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's problems, newest first
    pub async fn list_owned(
        pool: &PgPool,
        user_id: Uuid,
        filter: &ProblemFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        qb.push(PROBLEM_COLUMNS);
        qb.push(" FROM problems WHERE user_id = ");
        qb.push_bind(user_id);

        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ");
            qb.push_bind(category.clone());
        }

        qb.push(" ORDER BY created_at DESC, id");

        qb.build_query_as::<Problem>().fetch_all(pool).await
    }

    /// Returns `None` when the problem is missing or owned by someone else
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateProblem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE problems SET updated_at = NOW()");

        if let Some(title) = data.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = data.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(category) = data.category {
            qb.push(", category = ");
            qb.push_bind(category);
        }
        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }
        if let Some(date_solved) = data.date_solved {
            qb.push(", date_solved = ");
            qb.push_bind(date_solved);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND user_id = ");
        qb.push_bind(user_id);
        qb.push(" RETURNING ");
        qb.push(PROBLEM_COLUMNS);

        qb.build_query_as::<Problem>().fetch_optional(pool).await
    }

    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM problems WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn stats_for_user(pool: &PgPool, user_id: Uuid) -> Result<ProblemStats, sqlx::Error> {
        let groups: Vec<(String, ProblemStatus, i64)> = sqlx::query_as(
            r#"
            SELECT category, status, COUNT(*)
            FROM problems
            WHERE user_id = $1
            GROUP BY category, status
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(ProblemStats::from_groups(&groups))
    }
}
