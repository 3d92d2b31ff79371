/// Dashboard data
///
/// ```text
/// GET /v1/dashboard
/// ```
///
/// ```json
/// {
///   "customers": {"total": 12, "prospect": 5, "active": 6, "lost": 1},
///   "problems": {"total": 4, "solved": 1, "unsolved": 2, "review": 1,
///                "solved_by_category": [{"category": "Billing", "count": 1}]},
///   "recent_customers": [ ... up to 5, newest first, with tags ... ]
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use crm_shared::{
    auth::middleware::AuthContext,
    models::{
        customer::{Customer, CustomerCounts, CustomerFilter, CustomerWithTags},
        problem::{Problem, ProblemStats},
    },
};
use serde::Serialize;

pub const RECENT_CUSTOMERS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub customers: CustomerCounts,
    pub problems: ProblemStats,
    pub recent_customers: Vec<CustomerWithTags>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardResponse>> {
    let recent_filter = CustomerFilter {
        limit: RECENT_CUSTOMERS,
        ..Default::default()
    };

    let (customers, problems, recent_customers) = tokio::try_join!(
        Customer::counts_for_user(&state.db, auth.user_id),
        Problem::stats_for_user(&state.db, auth.user_id),
        Customer::list_owned(&state.db, auth.user_id, &recent_filter),
    )?;

    Ok(Json(DashboardResponse {
        customers,
        problems,
        recent_customers,
    }))
}
