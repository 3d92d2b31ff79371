/// Notes on a customer
///
/// - `GET /v1/customers/:id/notes`
/// - `POST /v1/customers/:id/notes`
/// - `PATCH /v1/customers/:id/notes/:note_id`
/// - `DELETE /v1/customers/:id/notes/:note_id`
///
/// The customer must belong to the requester. Editing and deleting are further
/// limited to the note's author; anything else answers 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::SuccessResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use crm_shared::{
    auth::middleware::AuthContext,
    models::{customer::Customer, note::{Note, NoteWithAuthor}},
    validation,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub content: Option<String>,
}

async fn ensure_customer_owned(pool: &PgPool, customer_id: Uuid, user_id: Uuid) -> ApiResult<()> {
    Customer::find_owned(pool, customer_id, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Customer"))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<NoteWithAuthor>>> {
    let Path(customer_id) = path?;
    ensure_customer_owned(&state.db, customer_id, auth.user_id).await?;

    Ok(Json(Note::list_for_customer(&state.db, customer_id).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NoteWithAuthor>)> {
    let Path(customer_id) = path?;
    let Json(req) = payload?;
    let content = validation::required("content", req.content.as_deref())?;

    ensure_customer_owned(&state.db, customer_id, auth.user_id).await?;

    let note = Note::create(&state.db, customer_id, auth.user_id, &content).await?;

    tracing::info!(note_id = %note.note.id, customer_id = %customer_id, "Note added");

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> ApiResult<Json<NoteWithAuthor>> {
    let Path((customer_id, note_id)) = path?;
    let Json(req) = payload?;
    let content = validation::required("content", req.content.as_deref())?;

    ensure_customer_owned(&state.db, customer_id, auth.user_id).await?;

    let note = Note::update_by_author(&state.db, note_id, customer_id, auth.user_id, &content)
        .await?
        .ok_or_else(|| ApiError::not_found("Note"))?;

    tracing::info!(note_id = %note_id, "Note updated");

    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path((customer_id, note_id)) = path?;
    ensure_customer_owned(&state.db, customer_id, auth.user_id).await?;

    if !Note::delete_by_author(&state.db, note_id, customer_id, auth.user_id).await? {
        return Err(ApiError::not_found("Note"));
    }

    tracing::info!(note_id = %note_id, "Note deleted");

    Ok(Json(SuccessResponse::ok()))
}
