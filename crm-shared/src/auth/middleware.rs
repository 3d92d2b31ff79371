/// Session authentication for Axum
///
/// The session token is read from the `crm_session` cookie, falling back to an
/// `Authorization: Bearer <token>` header. A valid token is not enough on its
/// own: the user it names is reloaded from the database, so deleting a user
/// ends their sessions and role changes apply immediately.
///
/// # Request Extensions
///
/// After successful authentication the middleware adds an [`AuthContext`].
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use crm_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}", auth.email)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{User, UserRole};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "crm_session";

/// The authenticated caller, as loaded from the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub email: String,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            email: user.email.clone(),
        }
    }
}

/// Error type for session authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,

    #[error("{0}")]
    InvalidToken(String),

    /// Token was valid but its user no longer exists
    #[error("User not found")]
    UnknownUser,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Session expired".to_string()),
            _ => AuthError::InvalidToken("Invalid session".to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AuthError::DatabaseError(e) => {
                tracing::error!(error = %e, "Database error during authentication");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            other => (StatusCode::UNAUTHORIZED, "unauthorized", other.to_string()),
        };

        (
            status,
            Json(serde_json::json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

/// Finds the session token in the cookie or the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let from_cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Validates the request's session and loads its user
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = validate_token(&token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    Ok(AuthContext::from_user(&user))
}

/// Cookie carrying a new session
pub fn session_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    build_cookie(token, time::Duration::seconds(max_age_seconds), secure)
}

/// Cookie that removes the session from the browser
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    build_cookie(String::new(), time::Duration::ZERO, secure)
}

fn build_cookie(value: String, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .secure(secure)
        .build()
}
