/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `JWT_SECRET`: session signing secret, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: session lifetime, 1 to 8760 (default: 24)
/// - `CORS_ORIGINS`: comma-separated origins, `*` for any (default: *)
/// - `PRODUCTION`: `true` enables secure cookies and HSTS (default: false)
/// - `RUST_LOG` / `LOG_FORMAT`: read by `main`, not here
///
/// # Example
///
/// ```no_run
/// use crm_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

/// One year
pub const MAX_SESSION_TTL_HOURS: i64 = 8760;
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (secure cookies, HSTS)
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_hours: i64,
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = lookup("PRODUCTION")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_hours = lookup("SESSION_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("SESSION_TTL_HOURS is invalid: {}", e))?;

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            );
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/crm"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.session.ttl_hours, 24);
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://db/crm"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PRODUCTION", "true"),
            ("SESSION_TTL_HOURS", "8"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.allows_any_origin());
        assert!(config.api.production);
        assert_eq!(config.session.ttl_hours, 8);
    }

    #[test]
    fn test_session_ttl_bounds() {
        let with_ttl = |ttl: &str| {
            load(&[
                ("DATABASE_URL", "postgresql://localhost/crm"),
                ("JWT_SECRET", SECRET),
                ("SESSION_TTL_HOURS", ttl),
            ])
        };

        assert_eq!(with_ttl("8760").unwrap().session.ttl_hours, MAX_SESSION_TTL_HOURS);
        assert!(with_ttl("0").is_err());
        assert!(with_ttl("-5").is_err());
        assert!(with_ttl("8761").is_err());

        let err = with_ttl("9000000000000000").unwrap_err();
        assert!(err.to_string().contains("between 1 and 8760"));
        assert!(with_ttl("soon").is_err());
    }

    #[test]
    fn test_required_values() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/crm")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/crm"),
            ("JWT_SECRET", "too-short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/crm"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
    }
}
