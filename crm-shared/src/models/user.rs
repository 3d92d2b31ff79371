/// User model and database operations
///
/// Users are the sales reps and admins who own customers and problems.
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'SALES_REP');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,   -- stored lowercase
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'SALES_REP',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access including user management
    Admin,

    /// Manages their own customers and problems
    SalesRep,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::SalesRep => "SALES_REP",
        }
    }

    /// Whether this role may list, re-role and delete other users
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Lowercase, unique across all users
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,

    /// Already normalized to lowercase
    pub email: String,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,

    pub role: UserRole,
}

/// Input for updating an existing user
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none() && self.role.is_none()
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

impl User {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// A unique violation on `users_email_key` when the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Looks a user up by email; the lookup lowercases its argument
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE email = LOWER($1)", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Updates the given fields and bumps `updated_at`
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user; their customers, notes and problems cascade
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
