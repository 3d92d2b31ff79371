/// Session authentication layer
///
/// Wraps every `/v1` route except login and registration. On success the
/// request gains an [`AuthContext`] extension; otherwise the handler is never
/// reached and the client gets 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use crm_shared::auth::middleware::{authenticate, AuthContext};

use crate::{app::AppState, error::ApiError};

pub async fn session_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext = authenticate(&state.db, state.session_secret(), req.headers())
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request");
            ApiError::from(e)
        })?;

    tracing::Span::current().record("user_id", tracing::field::display(auth.user_id));
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
