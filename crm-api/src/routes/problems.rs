/// Problems tracker endpoints
///
/// - `GET /v1/problems?status=&category=`
/// - `POST /v1/problems`
/// - `GET /v1/problems/stats`
/// - `GET /v1/problems/:id`
/// - `PATCH|PUT /v1/problems/:id`
/// - `DELETE /v1/problems/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, SuccessResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use crm_shared::{
    auth::middleware::AuthContext,
    models::problem::{
        CreateProblem, Problem, ProblemFilter, ProblemStats, ProblemStatus, UpdateProblem,
    },
    validation,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ListProblemsQuery {
    pub status: Option<ProblemStatus>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProblemRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    pub status: Option<ProblemStatus>,
    pub date_solved: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProblemRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    pub status: Option<ProblemStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub date_solved: Option<Option<DateTime<Utc>>>,
}

impl UpdateProblemRequest {
    pub fn into_update(self) -> ApiResult<UpdateProblem> {
        self.validate()?;

        let text = |field: &str, value: Option<String>| -> ApiResult<Option<String>> {
            match value {
                Some(v) => Ok(Some(validation::required(field, Some(v.as_str()))?)),
                None => Ok(None),
            }
        };

        Ok(UpdateProblem {
            title: text("title", self.title)?,
            description: text("description", self.description)?,
            category: text("category", self.category)?,
            status: self.status,
            date_solved: self.date_solved,
        })
    }
}

pub async fn list_problems(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListProblemsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Problem>>> {
    let Query(query) = query?;
    let filter = ProblemFilter {
        status: query.status,
        category: validation::optional(query.category.as_deref()),
    };

    Ok(Json(Problem::list_owned(&state.db, auth.user_id, &filter).await?))
}

pub async fn create_problem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateProblemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Problem>)> {
    let Json(req) = payload?;
    req.validate()?;

    let problem = Problem::create(
        &state.db,
        CreateProblem {
            user_id: auth.user_id,
            title: validation::required("title", req.title.as_deref())?,
            description: validation::required("description", req.description.as_deref())?,
            category: validation::required("category", req.category.as_deref())?,
            status: req.status.unwrap_or_default(),
            date_solved: req.date_solved,
        },
    )
    .await?;

    tracing::info!(problem_id = %problem.id, user_id = %auth.user_id, "Problem created");

    Ok((StatusCode::CREATED, Json(problem)))
}

pub async fn get_problem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Problem>> {
    let Path(id) = path?;
    Problem::find_owned(&state.db, id, auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Problem"))
}

pub async fn update_problem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateProblemRequest>, JsonRejection>,
) -> ApiResult<Json<Problem>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let update = req.into_update()?;

    let problem = Problem::update_owned(&state.db, id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Problem"))?;

    tracing::info!(problem_id = %id, status = ?problem.status, "Problem updated");

    Ok(Json(problem))
}

pub async fn delete_problem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = path?;
    if !Problem::delete_owned(&state.db, id, auth.user_id).await? {
        return Err(ApiError::not_found("Problem"));
    }

    tracing::info!(problem_id = %id, "Problem deleted");

    Ok(Json(SuccessResponse::ok()))
}

pub async fn problem_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProblemStats>> {
    Ok(Json(Problem::stats_for_user(&state.db, auth.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_null_clears_date_solved() {
        let req: UpdateProblemRequest =
            serde_json::from_str(r#"{"status": "UNSOLVED", "date_solved": null}"#).unwrap();
        let update = req.into_update().unwrap();
        assert_eq!(update.status, Some(ProblemStatus::Unsolved));
        assert_eq!(update.date_solved, Some(None));
    }

    #[test]
    fn test_update_absent_date_untouched() {
        let req: UpdateProblemRequest = serde_json::from_str(r#"{"title": " New "}"#).unwrap();
        let update = req.into_update().unwrap();
        assert_eq!(update.title.as_deref(), Some("New"));
        assert!(update.date_solved.is_none());
    }

    #[test]
    fn test_update_rejects_blank_text() {
        let req: UpdateProblemRequest = serde_json::from_str(r#"{"category": ""}"#).unwrap();
        assert!(matches!(req.into_update(), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_create_request_parses_date() {
        let req: CreateProblemRequest = serde_json::from_str(
            r#"{"title": "t", "description": "d", "category": "c",
                "status": "SOLVED", "date_solved": "2025-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.status, Some(ProblemStatus::Solved));
        assert!(req.date_solved.is_some());
    }
}
