/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Create a SALES_REP account
/// - `POST /v1/auth/login` - Verify credentials and start a session
/// - `POST /v1/auth/logout` - Clear the session cookie
/// - `GET /v1/auth/session` - Current user for a valid session

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use crm_shared::{
    auth::{
        jwt::{self, SessionClaims},
        middleware::{clear_session_cookie, session_cookie, AuthContext},
        password,
    },
    models::user::{CreateUser, User, UserRole},
    validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Message for every failed login, whatever the cause
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub email: Option<String>,

    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,
}

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,

    /// Same token as the cookie, for clients using `Authorization: Bearer`
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
/// {"name": "Jane Rep", "email": "jane@example.com", "password": "at-least-8"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing field, malformed email, short password
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let name = validation::required("name", req.name.as_deref())?;
    let email = validation::required("email", req.email.as_deref())?;
    let email = validation::normalize_email("email", &email)?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| validation::FieldError::new("password", "password is required"))?;
    validation::check_password("password", &password)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&password)?;

    // A concurrent registration still hits the unique constraint → 409
    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
            role: UserRole::SalesRep,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Log in with email and password
///
/// On success sets the `crm_session` cookie and returns the token as well.
///
/// # Errors
///
/// - `400 Bad Request`: missing field
/// - `401 Unauthorized`: unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;

    let email = validation::required("email", req.email.as_deref())?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| validation::FieldError::new("password", "password is required"))?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let ttl = state.session_ttl();
    let claims = SessionClaims::new(user.id, user.role, ttl);
    let token = jwt::create_token(&claims, state.session_secret())?;
    let cookie = session_cookie(token.clone(), ttl.num_seconds(), state.secure_cookies());

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: UserResponse::from(&user),
            token,
            expires_at: claims.expires_at(),
        }),
    ))
}

/// Log out by expiring the session cookie
///
/// Tokens are stateless, so a copied bearer token stays valid until it
/// expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(clear_session_cookie(state.secure_cookies())),
        Json(LogoutResponse { success: true }),
    )
}

/// Current session's user
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(UserResponse::from(&user)))
}
