//! Centralized application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::ratelimit::RateLimitConfig;
use crate::state::security_config::SecurityConfig;

/// Minimum accepted length of `BACKEND_JWT_SECRET`.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted `TOKEN_TTL_SECS`: one year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Centralized application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Security configuration
    pub jwt_secret: String,
    pub token_ttl: Duration,

    // Rate limiting; no Redis URL means the limiter is off
    pub redis_url: Option<String>,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = Self::jwt_secret_from_env()?;

        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var::<u16>("BACKEND_PORT", 8080)?;

        let token_ttl = Duration::from_secs(parse_var::<u64>("TOKEN_TTL_SECS", 86_400)?);
        if token_ttl.is_zero() {
            return Err(AppError::config("TOKEN_TTL_SECS must be greater than zero"));
        }
        if token_ttl.as_secs() > MAX_TOKEN_TTL_SECS {
            return Err(AppError::config(format!(
                "TOKEN_TTL_SECS must be at most {MAX_TOKEN_TTL_SECS}"
            )));
        }

        let redis_url = env::var("REDIS_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let rate_limit = RateLimitConfig::new(
            parse_var::<u64>("RATE_LIMIT_MAX_REQUESTS", 10)?,
            Duration::from_secs(parse_var::<u64>("RATE_LIMIT_WINDOW_SECS", 60)?),
        )?;

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl,
            redis_url,
            rate_limit,
        })
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig::new(self.jwt_secret.as_bytes()).with_token_ttl(self.token_ttl)
    }

    fn jwt_secret_from_env() -> Result<String, AppError> {
        match env::var("BACKEND_JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_JWT_SECRET_LEN => Ok(secret),
            Ok(_) => Err(AppError::config(format!(
                "BACKEND_JWT_SECRET is too short. It should be at least {MIN_JWT_SECRET_LEN} characters for security."
            ))),
            Err(_) => Err(AppError::config("BACKEND_JWT_SECRET must be set.")),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token_ttl", &self.token_ttl)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<set>"))
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
