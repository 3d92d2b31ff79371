/// Middleware for the API server
///
/// - `auth`: session authentication for the `/v1` resource routes
/// - `security`: security response headers

pub mod auth;
pub mod security;
