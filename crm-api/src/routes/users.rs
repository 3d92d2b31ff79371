/// User profile and administration
///
/// - `GET /v1/users/me`, `PATCH /v1/users/me`: any authenticated user
/// - `GET /v1/users`, `PATCH /v1/users/:id/role`, `DELETE /v1/users/:id`:
///   ADMIN only (403 otherwise)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::UserResponse, SuccessResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use crm_shared::{
    auth::{
        authorization::{require_admin, require_other_user},
        middleware::AuthContext,
        password,
    },
    models::user::{UpdateUser, User, UserRole},
    validation,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
    pub current_password: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Changes name and/or password
///
/// A new password must come with the current one.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let mut update = UpdateUser::default();

    if let Some(name) = req.name {
        update.name = Some(validation::required("name", Some(name.as_str()))?);
    }

    if let Some(new_password) = req.password {
        validation::check_password("password", &new_password)?;

        let current = req
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                validation::FieldError::new("current_password", "current_password is required")
            })?;

        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        if !password::verify_password(&current, &user.password_hash)? {
            return Err(ApiError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        update.password_hash = Some(password::hash_password(&new_password)?);
    }

    let password_changed = update.password_hash.is_some();

    let user = if update.is_empty() {
        User::find_by_id(&state.db, auth.user_id).await?
    } else {
        User::update(&state.db, auth.user_id, update).await?
    };
    let user = user.ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %user.id, password_changed, "Profile updated");

    Ok(Json(UserResponse::from(&user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let Query(query) = query?;
    require_admin(&auth)?;

    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);

    let users = User::list(&state.db, limit, offset).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Path(id) = path?;
    require_admin(&auth)?;
    let Json(req) = payload?;

    // Admins cannot demote themselves
    if req.role != UserRole::Admin {
        require_other_user(&auth, id)?;
    }

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            role: Some(req.role),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %id, role = user.role.as_str(), by = %auth.user_id, "Role changed");

    Ok(Json(UserResponse::from(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = path?;
    require_admin(&auth)?;
    require_other_user(&auth, id)?;

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::not_found("User"));
    }

    tracing::info!(user_id = %id, by = %auth.user_id, "User deleted");

    Ok(Json(SuccessResponse::ok()))
}
