//! API server configuration.

use bastion_core::auth::jwt::DEFAULT_USER_TOKEN_TTL_HOURS;
use thiserror::Error;

/// Configuration errors, reported once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for user-domain tokens.
    pub jwt_secret: String,
    /// HMAC secret for admin-domain tokens.
    pub admin_jwt_secret: String,
    /// Lifetime of user-domain tokens.
    pub user_token_ttl: chrono::Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                | Default                               |
    /// |-------------------------|---------------------------------------|
    /// | `BIND_ADDR`             | `127.0.0.1:8080`                      |
    /// | `DATABASE_URL`          | `postgres://localhost:5432/bastion`   |
    /// | `JWT_SECRET`            | required                              |
    /// | `ADMIN_JWT_SECRET`      | value of `JWT_SECRET`                 |
    /// | `BEARER_TOKEN_DURATION` | `168h`                                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let admin_jwt_secret = get("ADMIN_JWT_SECRET").unwrap_or_else(|| jwt_secret.clone());
        let user_token_ttl = match get("BEARER_TOKEN_DURATION") {
            Some(raw) => parse_token_duration(&raw)?,
            None => chrono::Duration::hours(DEFAULT_USER_TOKEN_TTL_HOURS),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".into()),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/bastion".into()),
            jwt_secret,
            admin_jwt_secret,
            user_token_ttl,
        })
    }
}

/// Longest accepted user token lifetime.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// Parse a duration such as `168h`, `30m` or `7d`. Zero and anything longer
/// than [`MAX_TOKEN_TTL_DAYS`] are rejected.
pub fn parse_token_duration(raw: &str) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "BEARER_TOKEN_DURATION",
        reason,
    };
    let std_duration = humantime::parse_duration(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if std_duration.is_zero() {
        return Err(invalid("duration must be positive".into()));
    }
    let ttl = chrono::Duration::from_std(std_duration).map_err(|e| invalid(e.to_string()))?;
    if ttl > chrono::Duration::days(MAX_TOKEN_TTL_DAYS) {
        return Err(invalid(format!(
            "duration must not exceed {MAX_TOKEN_TTL_DAYS} days"
        )));
    }
    Ok(ttl)
}
