/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4 }
/// }
/// ```
///
/// Always 200; a database outage shows up as `"degraded"` /
/// `"disconnected"` rather than an error status.

use crate::app::AppState;
use axum::{extract::State, Json};
use crm_shared::db::pool::{health_check as database_health_check, pool_stats, PoolStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub pool: PoolStats,
}

impl HealthResponse {
    fn from_database(connected: bool, pool: PoolStats) -> Self {
        let (status, database) = if connected {
            ("healthy", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            pool,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match database_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse::from_database(connected, pool_stats(&state.db)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response() {
        let stats = PoolStats {
            active_connections: 1,
            idle_connections: 3,
        };
        let up = HealthResponse::from_database(true, stats);
        assert_eq!(up.status, "healthy");
        assert_eq!(up.database, "connected");
        assert_eq!(up.pool, stats);

        let down = HealthResponse::from_database(false, stats);
        assert_eq!(down.status, "degraded");
        assert_eq!(down.database, "disconnected");
        assert_eq!(down.version, env!("CARGO_PKG_VERSION"));
    }
}
