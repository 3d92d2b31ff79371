/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use crm_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, MAX_SESSION_TTL_HOURS},
    middleware::{auth::session_auth, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method, Request},
    routing::{delete, get, patch, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via `State`; the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Session lifetime, kept within the range `Config` accepts
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.config.session.ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }

    /// Whether cookies get the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                GET     public
/// /v1/auth/register                      POST    public
/// /v1/auth/login                         POST    public
/// /v1/auth/logout                        POST    public (clears cookie)
/// /v1/auth/session                       GET
/// /v1/dashboard                          GET
/// /v1/customers                          GET POST
/// /v1/customers/:id                      GET PATCH PUT DELETE
/// /v1/customers/:id/notes                GET POST
/// /v1/customers/:id/notes/:note_id       PATCH DELETE
/// /v1/problems                           GET POST
/// /v1/problems/stats                     GET
/// /v1/problems/:id                       GET PATCH PUT DELETE
/// /v1/tags                               GET
/// /v1/users/me                           GET PATCH
/// /v1/users                              GET            admin
/// /v1/users/:id/role                     PATCH          admin
/// /v1/users/:id                          DELETE         admin
/// ```
///
/// Layers, outermost first: security headers, CORS, compression, tracing,
/// then session authentication on the protected group.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout));

    let protected = Router::new()
        .route("/auth/session", get(routes::auth::session))
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/customers",
            get(routes::customers::list_customers).post(routes::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(routes::customers::get_customer)
                .patch(routes::customers::update_customer)
                .put(routes::customers::update_customer)
                .delete(routes::customers::delete_customer),
        )
        .route(
            "/customers/:id/notes",
            get(routes::notes::list_notes).post(routes::notes::create_note),
        )
        .route(
            "/customers/:id/notes/:note_id",
            patch(routes::notes::update_note).delete(routes::notes::delete_note),
        )
        .route(
            "/problems",
            get(routes::problems::list_problems).post(routes::problems::create_problem),
        )
        .route("/problems/stats", get(routes::problems::problem_stats))
        .route(
            "/problems/:id",
            get(routes::problems::get_problem)
                .patch(routes::problems::update_problem)
                .put(routes::problems::update_problem)
                .delete(routes::problems::delete_problem),
        )
        .route("/tags", get(routes::tags::list_tags))
        .route(
            "/users/me",
            get(routes::users::me).patch(routes::users::update_me),
        )
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/role", patch(routes::users::update_role))
        .route("/users/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth,
        ));

    let v1_routes = public.merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
