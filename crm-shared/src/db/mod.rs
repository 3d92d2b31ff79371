//! Database layer for the CRM
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: Runs the SQL files from the workspace `migrations/` directory
//!
//! # Example
//!
//! ```no_run
//! use crm_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     crm_shared::db::migrations::run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
