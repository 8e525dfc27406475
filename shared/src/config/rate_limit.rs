//! Per-IP request limits and login lockout settings

use serde::{Deserialize, Serialize};

use super::env_or;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Every route outside `/auth`
    #[serde(default)]
    pub api: ApiRateLimits,

    /// Register, login and refresh
    #[serde(default)]
    pub auth: AuthRateLimits,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiRateLimits {
    pub per_ip_per_minute: u32,
}

impl Default for ApiRateLimits {
    fn default() -> Self {
        Self {
            per_ip_per_minute: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthRateLimits {
    /// Max login/register requests per IP per minute
    pub per_ip_per_minute: u32,

    /// Number of failed logins for one email before locking it
    #[serde(default = "default_failed_attempts_threshold")]
    pub failed_attempts_threshold: u32,

    /// Seconds an email stays locked
    pub account_lock_duration: u64,
}

impl Default for AuthRateLimits {
    fn default() -> Self {
        Self {
            per_ip_per_minute: 10,
            failed_attempts_threshold: default_failed_attempts_threshold(),
            account_lock_duration: 900
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api: ApiRateLimits::default(),
            auth: AuthRateLimits::default(),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            api: ApiRateLimits {
                per_ip_per_minute: env_or("RATE_LIMIT_API_PER_MINUTE", defaults.api.per_ip_per_minute),
            },
            auth: AuthRateLimits {
                per_ip_per_minute: env_or("RATE_LIMIT_AUTH_PER_MINUTE", defaults.auth.per_ip_per_minute),
                failed_attempts_threshold: env_or(
                    "LOGIN_FAILED_ATTEMPTS_THRESHOLD",
                    defaults.auth.failed_attempts_threshold,
                ),
                account_lock_duration: env_or("LOGIN_LOCK_DURATION", defaults.auth.account_lock_duration),
            },
        }
    }

    /// Disable all limits (tests, local tooling)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_failed_attempts_threshold() -> u32 {
    5
}
