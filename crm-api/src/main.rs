//! # CRM API Server
//!
//! JSON API for the CRM: session authentication, customers with tags and
//! notes, the problems tracker and dashboard data.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/crm \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p crm-api
//! ```

use crm_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry,
};
use crm_shared::db::{
    migrations::{get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing();

    tracing::info!("CRM API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let migrations = get_migration_status(&pool).await?;
    if migrations.is_up_to_date {
        tracing::info!(
            applied = migrations.applied_migrations,
            latest_version = ?migrations.latest_version,
            "Migrations applied"
        );
    } else {
        tracing::warn!(
            applied = migrations.applied_migrations,
            "Database has fewer migrations than this build embeds"
        );
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
