//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT, session security and password hashing
//! - `cache` - Redis connection used for rate limiting and lockouts
//! - `database` - MySQL connection pool
//! - `environment` - Environment detection and logging
//! - `rate_limit` - Per-IP API limits and login lockout policy
//! - `server` - HTTP server and CORS

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig, LimitStrategy, PasswordConfig, SessionConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::{CorsConfig, ServerConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let cors = if environment.is_development() {
            CorsConfig::development()
        } else {
            CorsConfig::from_env()
        };

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            cors,
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Check settings that must never reach production with their defaults
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err("JWT_SECRET must be set in production".to_string());
        }
        if self.auth.jwt.secret.len() < 32 && self.environment.is_production() {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }
        if self.auth.session.max_concurrent_sessions == 0 {
            return Err("SESSION_MAX_CONCURRENT must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Read an environment variable and parse it, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
