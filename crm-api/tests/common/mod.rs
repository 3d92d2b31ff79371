//! Common test utilities for integration tests
//!
//! These tests need a PostgreSQL database reachable through `DATABASE_URL`.
//! When the variable is unset the tests return early instead of failing.
//!
//! Every context registers its own user with a unique email, so tests can
//! run in parallel against one database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use crm_api::{
    app::{build_router, AppState},
    config::Config,
};
use crm_shared::{
    auth::{
        jwt::{create_token, SessionClaims},
        password::hash_password,
    },
    db::migrations::{ensure_database_exists, run_migrations},
    models::user::{CreateUser, User, UserRole},
};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-with-at-least-32-chars";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

/// Builds a configuration without reading the process environment
pub fn test_config(database_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", database_url.to_string()),
        ("JWT_SECRET", TEST_SECRET.to_string()),
        ("DATABASE_MAX_CONNECTIONS", "5".to_string()),
    ]);

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

impl TestContext {
    /// Creates a context with a fresh sales rep, or `None` without a database
    pub async fn new() -> Option<Self> {
        Self::with_role(UserRole::SalesRep).await
    }

    pub async fn with_role(role: UserRole) -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let config = test_config(&database_url);

        ensure_database_exists(&database_url)
            .await
            .expect("create database");
        let db = PgPool::connect(&database_url).await.expect("connect");
        run_migrations(&db).await.expect("migrations");

        let user = create_user(&db, role).await;
        let token = token_for(&user);

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Some(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Sends a request as this context's user
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_with_token(&self.token, method, uri, body).await
    }

    pub async fn send_with_token(
        &self,
        token: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        send(&self.app, request, body).await
    }

    /// Sends a request with no credentials
    pub async fn send_anonymous(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(&self.app, Request::builder().method(method).uri(uri), body).await
    }

    /// Deletes the user; their customers, notes and problems cascade
    pub async fn cleanup(&self) {
        User::delete(&self.db, self.user.id).await.expect("cleanup");
    }
}

pub async fn create_user(db: &PgPool, role: UserRole) -> User {
    User::create(
        db,
        CreateUser {
            name: "Test User".to_string(),
            email: unique_email(),
            password_hash: hash_password(TEST_PASSWORD).expect("hash"),
            role,
        },
    )
    .await
    .expect("create user")
}

pub fn token_for(user: &User) -> String {
    let claims = SessionClaims::new(user.id, user.role, chrono::Duration::hours(1));
    create_token(&claims, TEST_SECRET).expect("token")
}

pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

pub async fn send(
    app: &Router,
    builder: axum::http::request::Builder,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
