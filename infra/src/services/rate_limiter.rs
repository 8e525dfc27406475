//! Redis-backed [`RateLimitStore`] for multi-instance deployments

use std::sync::Arc;

use async_trait::async_trait;

use nl_core::services::auth::{RateLimitDecision, RateLimitStore};
use nl_core::{DomainError, DomainResult};

use crate::cache::RedisClient;

/// Fixed-window counters (`INCR` + `TTL` in one transaction) and `SET EX` locks
pub struct RedisRateLimitStore {
    redis_client: Arc<RedisClient>,
}

impl RedisRateLimitStore {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    fn counter_key(key: &str) -> String {
        format!("rate_limit:{}", key)
    }

    fn lock_key(key: &str) -> String {
        format!("lock:{}", key)
    }
}

fn store_error(action: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to {}: {}", action, err),
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, limit: u32, window_seconds: u64) -> DomainResult<RateLimitDecision> {
        let (count, reset_after) = self
            .redis_client
            .incr_window(&Self::counter_key(key), window_seconds)
            .await
            .map_err(|e| store_error("count request", e))?;

        Ok(RateLimitDecision::new(count.max(0) as u64, limit, reset_after))
    }

    async fn reset(&self, key: &str) -> DomainResult<()> {
        self.redis_client
            .delete(&Self::counter_key(key))
            .await
            .map_err(|e| store_error("reset counter", e))?;
        Ok(())
    }

    async fn lock(&self, key: &str, seconds: u64) -> DomainResult<()> {
        self.redis_client
            .set_with_expiry(&Self::lock_key(key), "locked", seconds)
            .await
            .map_err(|e| store_error("set lock", e))
    }

    async fn lock_ttl(&self, key: &str) -> DomainResult<Option<u64>> {
        self.redis_client
            .ttl(&Self::lock_key(key))
            .await
            .map_err(|e| store_error("read lock", e))
    }
}
