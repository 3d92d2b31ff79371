//! # CRM Shared Library
//!
//! Domain types and persistence for the CRM service, shared by the API
//! server and the admin bootstrap binary.
//!
//! ## Module Organization
//!
//! - `models`: Users, customers, tags, notes and problems with their SQL
//! - `auth`: Password hashing, session tokens, request authentication
//! - `db`: Connection pool and migration runner
//! - `validation`: Field normalization shared by handlers and models

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the CRM shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
