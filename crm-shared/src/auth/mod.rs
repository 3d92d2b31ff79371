/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: session token creation and validation
/// - [`middleware`]: session extraction, user loading and cookie helpers
/// - [`authorization`]: admin and self-target checks
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use crm_shared::auth::jwt::{create_token, SessionClaims};
/// use crm_shared::auth::password::{hash_password, verify_password};
/// use crm_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = SessionClaims::new(Uuid::new_v4(), UserRole::SalesRep, Duration::hours(24));
/// let token = create_token(&claims, "secret-key-of-at-least-thirty-two-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
