/// Customer notes
///
/// A note is free text attached to a customer and authored by a user. Only the
/// author may edit or delete a note, and only while they own the customer.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content TEXT NOT NULL,
///     customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub customer_id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a note's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Note as returned by the API, with its author embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWithAuthor {
    #[serde(flatten)]
    pub note: Note,
    pub user: NoteAuthor,
}

#[derive(sqlx::FromRow)]
struct NoteAuthorRow {
    id: Uuid,
    content: String,
    customer_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    author_email: String,
}

impl From<NoteAuthorRow> for NoteWithAuthor {
    fn from(row: NoteAuthorRow) -> Self {
        NoteWithAuthor {
            user: NoteAuthor {
                id: row.user_id,
                name: row.author_name,
                email: row.author_email,
            },
            note: Note {
                id: row.id,
                content: row.content,
                customer_id: row.customer_id,
                user_id: row.user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const NOTE_WITH_AUTHOR_SELECT: &str = r#"
    SELECT n.id, n.content, n.customer_id, n.user_id, n.created_at, n.updated_at,
           u.name AS author_name, u.email AS author_email
    FROM notes n
    JOIN users u ON u.id = n.user_id
"#;

impl Note {
    /// Adds a note; the caller has already checked customer ownership
    pub async fn create(
        pool: &PgPool,
        customer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<NoteWithAuthor, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (content, customer_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, customer_id, user_id, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(customer_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Self::find_with_author(pool, note.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_with_author(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<NoteWithAuthor>, sqlx::Error> {
        let sql = format!("{} WHERE n.id = $1", NOTE_WITH_AUTHOR_SELECT);

        let row = sqlx::query_as::<_, NoteAuthorRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(NoteWithAuthor::from))
    }

    /// Notes on a customer, newest first
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Vec<NoteWithAuthor>, sqlx::Error> {
        let sql = format!(
            "{} WHERE n.customer_id = $1 ORDER BY n.created_at DESC, n.id DESC",
            NOTE_WITH_AUTHOR_SELECT
        );

        let rows = sqlx::query_as::<_, NoteAuthorRow>(&sql)
            .bind(customer_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(NoteWithAuthor::from).collect())
    }

    /// Rewrites a note's content if `user_id` authored it
    ///
    /// Returns `None` when the note does not exist on that customer or was
    /// written by someone else.
    pub async fn update_by_author(
        pool: &PgPool,
        id: Uuid,
        customer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Option<NoteWithAuthor>, sqlx::Error> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE notes SET content = $1, updated_at = clock_timestamp()
            WHERE id = $2 AND customer_id = $3 AND user_id = $4
            RETURNING id
            "#,
        )
        .bind(content)
        .bind(id)
        .bind(customer_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_with_author(pool, id).await,
            None => Ok(None),
        }
    }

    /// Deletes a note if `user_id` authored it
    ///
    /// Returns true if a row was deleted.
    pub async fn delete_by_author(
        pool: &PgPool,
        id: Uuid,
        customer_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM notes WHERE id = $1 AND customer_id = $2 AND user_id = $3")
                .bind(id)
                .bind(customer_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
