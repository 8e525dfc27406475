//! Redis configuration used by rate limiting and login lockouts

use serde::{Deserialize, Serialize};

use super::env_or;

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Prefix prepended to every key written by the server
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: default_connection_timeout(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Self {
            url,
            connection_timeout: env_or("REDIS_CONNECTION_TIMEOUT", default_connection_timeout()),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| default_key_prefix()),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_key_prefix() -> String {
    String::from("nutrilog:")
}
