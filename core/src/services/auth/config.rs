//! Configuration for the authentication service

use nl_shared::config::{AuthConfig, PasswordConfig, RateLimitConfig};

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Password hashing cost and policy
    pub password: PasswordConfig,
    /// Failed logins for one email before it is locked
    pub failed_login_threshold: u32,
    /// How long a locked email stays locked, also the failure counting window
    pub lock_duration_seconds: u64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default(), &RateLimitConfig::default())
    }
}

impl AuthServiceConfig {
    pub fn from_config(auth: &AuthConfig, rate_limit: &RateLimitConfig) -> Self {
        Self {
            password: auth.password.clone(),
            failed_login_threshold: rate_limit.auth.failed_attempts_threshold,
            lock_duration_seconds: rate_limit.auth.account_lock_duration,
        }
    }
}
