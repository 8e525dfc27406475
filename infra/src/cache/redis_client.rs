//! Redis client for counters and short-lived locks
//!
//! One multiplexed connection shared by all workers. Every key passes through
//! [`RedisClient::key`] so deployments sharing one Redis keep their keys apart.
//! Commands failing with a transient error are retried with exponential backoff.

use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use nl_shared::config::CacheConfig;

use crate::InfrastructureError;

const MAX_BACKOFF_MS: u64 = 5000;

#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    key_prefix: String,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connects with three attempts and a 100ms base backoff
    ///
    /// ```no_run
    /// use nl_shared::config::CacheConfig;
    /// use nl_infra::cache::RedisClient;
    ///
    /// async fn connect() -> Result<RedisClient, nl_infra::InfrastructureError> {
    ///     RedisClient::new(CacheConfig::new("redis://localhost:6379")).await
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::with_retries(config, 3, 100).await
    }

    pub async fn with_retries(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| InfrastructureError::Config(format!("Invalid Redis URL: {}", e)))?;
        let connect_timeout = Duration::from_secs(config.connection_timeout);

        let mut attempt = 0;
        let mut delay = retry_delay_ms;
        let connection = loop {
            attempt += 1;
            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Config(format!(
                    "Redis connection timed out after {}s",
                    connect_timeout.as_secs()
                ))),
            };
            match result {
                Ok(connection) => break connection,
                Err(e) if attempt < max_retries => {
                    warn!("Redis connect attempt {}/{} failed: {}", attempt, max_retries, e);
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        };

        info!("Connected to Redis at {}", mask_url(&config.url));

        Ok(Self {
            connection,
            key_prefix: config.key_prefix,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Prefixes a logical key with the configured namespace
    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Increments a fixed-window counter
    ///
    /// Returns the new count and the seconds left in the window. The window's
    /// expiry is (re)set whenever the counter has none, so a crash between the
    /// two commands cannot leave a counter that never resets.
    ///
    /// The increment is sent once: after an I/O error it may already have been
    /// applied, and a retry would count the hit twice.
    pub async fn incr_window(&self, key: &str, window_seconds: u64) -> Result<(i64, u64), InfrastructureError> {
        let key = self.key(key);
        let mut conn = self.connection.clone();
        let (count, ttl): (i64, i64) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .ttl(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis INCR on {} failed: {}", key, e);
                InfrastructureError::Cache(e)
            })?;

        if ttl >= 0 {
            return Ok((count, ttl as u64));
        }

        self.with_retry(|| {
            let mut conn = self.connection.clone();
            let key = key.clone();
            async move { conn.expire::<_, ()>(&key, window_seconds as i64).await }
        })
        .await?;
        Ok((count, window_seconds))
    }

    pub async fn set_with_expiry(&self, key: &str, value: &str, seconds: u64) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        debug!("SET {} EX {}", key, seconds);
        self.with_retry(|| {
            let mut conn = self.connection.clone();
            let key = key.clone();
            let value = value.to_string();
            async move { conn.set_ex::<_, _, ()>(key, value, seconds).await }
        })
        .await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = self.key(key);
        self.with_retry(|| {
            let mut conn = self.connection.clone();
            let key = key.clone();
            async move { conn.get::<_, Option<String>>(key).await }
        })
        .await
    }

    /// `true` when the key existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.key(key);
        let deleted: u32 = self
            .with_retry(|| {
                let mut conn = self.connection.clone();
                let key = key.clone();
                async move { conn.del(key).await }
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Seconds to live; `None` for a missing key or one without expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<u64>, InfrastructureError> {
        let key = self.key(key);
        let ttl: i64 = self
            .with_retry(|| {
                let mut conn = self.connection.clone();
                let key = key.clone();
                async move { conn.ttl(key).await }
            })
            .await?;
        Ok(u64::try_from(ttl).ok())
    }

    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let pong: String = self
            .with_retry(|| {
                let mut conn = self.connection.clone();
                async move { redis::cmd("PING").query_async(&mut conn).await }
            })
            .await?;
        Ok(pong == "PONG")
    }

    async fn with_retry<T, F, Fut>(&self, command: F) -> Result<T, InfrastructureError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RedisResult<T>>,
    {
        let mut attempt = 0;
        let mut delay = self.retry_delay_ms;
        loop {
            attempt += 1;
            match command().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && is_retriable_error(&e) => {
                    warn!("Redis command failed (attempt {}/{}): {}", attempt, self.max_retries, e);
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(InfrastructureError::Cache(e)),
            }
        }
    }
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Hides credentials before a Redis URL is logged
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}
