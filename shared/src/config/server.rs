//! HTTP listener and CORS settings

use serde::{Deserialize, Serialize};

use super::env_or;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// 0 means one worker per core
    #[serde(default)]
    pub workers: usize,

    /// Seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,

    /// JSON body limit in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// Proxy addresses or CIDR ranges whose X-Forwarded-* headers are trusted
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0,
            keep_alive: default_keep_alive(),
            max_payload_size: default_max_payload_size(),
            trusted_proxies: vec![],
        }
    }
}

impl ServerConfig {
    /// `SERVER_HOST`, `SERVER_PORT`, `SERVER_WORKERS` and `TRUSTED_PROXIES`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let trusted_proxies = std::env::var("TRUSTED_PROXIES")
            .map(|value| split_list(&value))
            .unwrap_or_default();

        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env_or("SERVER_PORT", defaults.port),
            workers: env_or("SERVER_WORKERS", defaults.workers),
            trusted_proxies,
            ..defaults
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age")]
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allow_credentials: false,
            max_age: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// Any origin, with credentials
    pub fn development() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 3600,
        }
    }

    /// Read `ALLOWED_ORIGINS` as a comma separated list
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|value| split_list(&value))
            .unwrap_or_default();
        Self {
            allowed_origins,
            allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", false),
            ..Default::default()
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn default_keep_alive() -> u64 {
    75
}

fn default_max_payload_size() -> usize {
    256 * 1024
}

fn default_max_age() -> usize {
    86400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_cors_config_development() {
        let config = CorsConfig::development();
        assert!(config.allows_any_origin());
        assert!(config.allow_credentials);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
