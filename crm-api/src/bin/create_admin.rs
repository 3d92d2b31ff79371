//! Creates an admin account, or promotes an existing user to admin
//!
//! ```bash
//! ADMIN_EMAIL=admin@example.com ADMIN_PASSWORD=change-me-now cargo run --bin create-admin
//! ```
//!
//! - `ADMIN_EMAIL` (default `admin@example.com`)
//! - `ADMIN_PASSWORD` (required when the user does not exist yet)
//! - `ADMIN_NAME` (default `Admin User`)

use anyhow::{bail, Context};
use crm_api::{config::Config, telemetry};
use crm_shared::{
    auth::password::hash_password,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, UpdateUser, User, UserRole},
    validation::{check_password, normalize_email, required},
};

const DEFAULT_EMAIL: &str = "admin@example.com";
const DEFAULT_NAME: &str = "Admin User";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing();

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
    let email = normalize_email("ADMIN_EMAIL", &email)?;
    let name = required(
        "ADMIN_NAME",
        Some(std::env::var("ADMIN_NAME").as_deref().unwrap_or(DEFAULT_NAME)),
    )?;
    let password = std::env::var("ADMIN_PASSWORD").ok();

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    match User::find_by_email(&pool, &email).await? {
        Some(existing) if existing.role == UserRole::Admin => {
            tracing::info!(user_id = %existing.id, email = %existing.email, "User is already an admin");
        }
        Some(existing) => {
            let update = UpdateUser {
                role: Some(UserRole::Admin),
                ..Default::default()
            };
            let user = User::update(&pool, existing.id, update)
                .await?
                .context("User disappeared during promotion")?;
            tracing::info!(user_id = %user.id, email = %user.email, "Promoted user to admin");
        }
        None => {
            let Some(password) = password else {
                bail!("ADMIN_PASSWORD is required to create a new admin");
            };
            check_password("ADMIN_PASSWORD", &password)?;

            let user = User::create(
                &pool,
                CreateUser {
                    name,
                    email,
                    password_hash: hash_password(&password)?,
                    role: UserRole::Admin,
                },
            )
            .await?;
            tracing::info!(user_id = %user.id, email = %user.email, "Created admin user");
        }
    }

    close_pool(pool).await;
    Ok(())
}
