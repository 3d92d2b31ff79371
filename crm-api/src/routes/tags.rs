/// `GET /v1/tags`
///
/// Every tag by name, with how many of the requester's customers carry it.
/// Tags the requester never used are listed with a count of 0.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use crm_shared::{
    auth::middleware::AuthContext,
    models::tag::{Tag, TagUsage},
};

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TagUsage>>> {
    Ok(Json(Tag::list_with_usage(&state.db, auth.user_id).await?))
}
