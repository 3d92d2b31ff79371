//! # CRM API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error type and HTTP response mapping
//! - `middleware`: Session authentication and security headers
//! - `routes`: Route handlers per resource
//! - `telemetry`: Tracing subscriber setup

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;
