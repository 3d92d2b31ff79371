/// Session tokens
///
/// A successful login issues an HS256-signed JWT carrying the user's id and
/// role. The API delivers it in the `crm_session` cookie and also accepts it
/// as a bearer token.
///
/// # Claims
///
/// - `sub`: user id
/// - `role`: role at login time (informational; the middleware reloads the user)
/// - `iss`: always `"crm"`
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use crm_shared::auth::jwt::{create_token, validate_token, SessionClaims};
/// use crm_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = SessionClaims::new(user_id, UserRole::SalesRep, Duration::hours(24));
/// let token = create_token(&claims, "a-secret-of-at-least-thirty-two-bytes")?;
///
/// let validated = validate_token(&token, "a-secret-of-at-least-thirty-two-bytes")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Issuer written to and required from every token
pub const ISSUER: &str = "crm";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid issuer")]
    InvalidIssuer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - User ID
    pub sub: Uuid,

    pub role: UserRole,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,
}

impl SessionClaims {
    /// Claims for a session that lasts `ttl` from now
    pub fn new(user_id: Uuid, role: UserRole, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Expiry as a timestamp, for the login response
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &SessionClaims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Checks signature, expiry, not-before and issuer, returning the claims
pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = SessionClaims::new(user_id, UserRole::Admin, Duration::hours(24));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.iss, "crm");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = SessionClaims::new(user_id, UserRole::SalesRep, Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.role, UserRole::SalesRep);
        assert_eq!(validated.iss, "crm");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = SessionClaims::new(Uuid::new_v4(), UserRole::SalesRep, Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_token(&token, "another-secret-key-at-least-32-bytes").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims =
            SessionClaims::new(Uuid::new_v4(), UserRole::SalesRep, Duration::seconds(-3600));
        assert!(claims.exp < Utc::now().timestamp());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = SessionClaims::new(Uuid::new_v4(), UserRole::SalesRep, Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_token("not.a.jwt", SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }
}
