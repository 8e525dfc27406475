//! Authentication, session security and password hashing configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("nutrilog"),
            audience: default_audience(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// What to do when a user already holds the maximum number of sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStrategy {
    /// Terminate the least recently active session to make room
    EvictOldest,
    /// Refuse the new login
    Reject,
}

impl Default for LimitStrategy {
    fn default() -> Self {
        LimitStrategy::EvictOldest
    }
}

impl std::str::FromStr for LimitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evict_oldest" | "evict" => Ok(LimitStrategy::EvictOldest),
            "reject" => Ok(LimitStrategy::Reject),
            _ => Err(format!("Invalid session limit strategy: {}", s)),
        }
    }
}

/// Server-side session tracking configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Maximum number of simultaneously active sessions per user
    #[serde(default = "default_max_concurrent_sessions")]
    pub max_concurrent_sessions: u32,

    /// Behaviour once the concurrent limit is reached
    #[serde(default)]
    pub limit_strategy: LimitStrategy,

    /// Minutes of inactivity after which a session expires
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,

    /// Hard upper bound on a session's lifetime in hours
    #[serde(default = "default_absolute_lifetime_hours")]
    pub absolute_lifetime_hours: i64,

    /// Minutes between session token rotations
    #[serde(default = "default_rotation_interval_minutes")]
    pub rotation_interval_minutes: i64,

    /// Seconds the previous token stays valid after a rotation
    #[serde(default = "default_rotation_grace_seconds")]
    pub rotation_grace_seconds: i64,

    /// Terminate the session when the client IP changes
    #[serde(default)]
    pub strict_ip_binding: bool,

    /// Terminate the session when the device fingerprint changes
    #[serde(default = "default_true")]
    pub terminate_on_device_change: bool,

    /// Days terminated sessions are kept before being purged
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Seconds between background cleanup runs
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether the API server runs the background cleanup task
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: default_max_concurrent_sessions(),
            limit_strategy: LimitStrategy::default(),
            idle_timeout_minutes: default_idle_timeout_minutes(),
            absolute_lifetime_hours: default_absolute_lifetime_hours(),
            rotation_interval_minutes: default_rotation_interval_minutes(),
            rotation_grace_seconds: default_rotation_grace_seconds(),
            strict_ip_binding: false,
            terminate_on_device_change: true,
            retention_days: default_retention_days(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            cleanup_enabled: true,
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_sessions: env_or("SESSION_MAX_CONCURRENT", defaults.max_concurrent_sessions),
            limit_strategy: env_or("SESSION_LIMIT_STRATEGY", defaults.limit_strategy),
            idle_timeout_minutes: env_or("SESSION_IDLE_TIMEOUT_MINUTES", defaults.idle_timeout_minutes),
            absolute_lifetime_hours: env_or("SESSION_LIFETIME_HOURS", defaults.absolute_lifetime_hours),
            rotation_interval_minutes: env_or("SESSION_ROTATION_MINUTES", defaults.rotation_interval_minutes),
            rotation_grace_seconds: env_or("SESSION_ROTATION_GRACE_SECONDS", defaults.rotation_grace_seconds),
            strict_ip_binding: env_or("SESSION_STRICT_IP", defaults.strict_ip_binding),
            terminate_on_device_change: env_or("SESSION_TERMINATE_ON_DEVICE_CHANGE", defaults.terminate_on_device_change),
            retention_days: env_or("SESSION_RETENTION_DAYS", defaults.retention_days),
            cleanup_interval_seconds: env_or("SESSION_CLEANUP_INTERVAL", defaults.cleanup_interval_seconds),
            cleanup_enabled: env_or("SESSION_CLEANUP_ENABLED", defaults.cleanup_enabled),
        }
    }
}

/// Password hashing and policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Minimum accepted password length
    #[serde(default = "default_min_password_length")]
    pub min_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
            min_length: default_min_password_length(),
        }
    }
}

impl PasswordConfig {
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", default_bcrypt_cost()),
            min_length: env_or("PASSWORD_MIN_LENGTH", default_min_password_length()),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session security configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            session: SessionConfig::from_env(),
            password: PasswordConfig::from_env(),
        }
    }
}

fn default_audience() -> String {
    String::from("nutrilog-api")
}

fn default_max_concurrent_sessions() -> u32 {
    5
}

fn default_idle_timeout_minutes() -> i64 {
    120
}

fn default_absolute_lifetime_hours() -> i64 {
    168 // 7 days
}

fn default_rotation_interval_minutes() -> i64 {
    15
}

fn default_rotation_grace_seconds() -> i64 {
    30
}

fn default_retention_days() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_min_password_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.max_concurrent_sessions, 5);
        assert_eq!(config.limit_strategy, LimitStrategy::EvictOldest);
        assert_eq!(config.rotation_interval_minutes, 15);
        assert!(!config.strict_ip_binding);
        assert!(config.terminate_on_device_change);
    }

    #[test]
    fn test_limit_strategy_from_str() {
        assert_eq!("reject".parse::<LimitStrategy>().unwrap(), LimitStrategy::Reject);
        assert_eq!("EVICT_OLDEST".parse::<LimitStrategy>().unwrap(), LimitStrategy::EvictOldest);
        assert!("drop".parse::<LimitStrategy>().is_err());
    }

    #[test]
    fn test_session_config_deserializes_with_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"max_concurrent_sessions": 2, "limit_strategy": "reject"}"#).unwrap();
        assert_eq!(config.max_concurrent_sessions, 2);
        assert_eq!(config.limit_strategy, LimitStrategy::Reject);
        assert_eq!(config.idle_timeout_minutes, 120);
    }
}
