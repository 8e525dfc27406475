//! Integration tests for the Redis rate-limit store
//!
//! These tests require Redis to be running.
//! Run with: cargo test -p nl_infra --test rate_limiter_integration -- --ignored

use std::sync::Arc;

use nl_core::services::auth::RateLimitStore;
use nl_infra::cache::{CacheConfig, RedisClient};
use nl_infra::services::RedisRateLimitStore;
use uuid::Uuid;

async fn create_store() -> (RedisRateLimitStore, Arc<RedisClient>) {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let config = CacheConfig {
        key_prefix: "nutrilog-test:".to_string(),
        ..CacheConfig::new(url)
    };
    let client = Arc::new(RedisClient::new(config).await.expect("Failed to create Redis client"));
    (RedisRateLimitStore::new(client.clone()), client)
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_fixed_window_counts_and_blocks() {
    let (store, _) = create_store().await;
    let key = format!("ip:{}", Uuid::new_v4());

    for i in 1..=3u32 {
        let decision = store.hit(&key, 3, 60).await.unwrap();
        assert!(decision.allowed, "request {} should pass", i);
        assert_eq!(decision.remaining, 3 - i);
        assert!(decision.reset_after_seconds > 0 && decision.reset_after_seconds <= 60);
    }

    let blocked = store.hit(&key, 3, 60).await.unwrap();
    assert!(!blocked.allowed);
    assert_eq!(blocked.remaining, 0);

    store.reset(&key).await.unwrap();
    assert!(store.hit(&key, 3, 60).await.unwrap().allowed);
    store.reset(&key).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_lock_expires() {
    let (store, _) = create_store().await;
    let key = format!("login_lock:{}@example.com", Uuid::new_v4());

    assert_eq!(store.lock_ttl(&key).await.unwrap(), None);

    store.lock(&key, 1).await.unwrap();
    let ttl = store.lock_ttl(&key).await.unwrap();
    assert!(matches!(ttl, Some(t) if t <= 1));

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert_eq!(store.lock_ttl(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_client_prefixes_keys() {
    let (_, client) = create_store().await;
    let key = format!("window:{}", Uuid::new_v4());

    client.set_with_expiry(&key, "1", 30).await.unwrap();
    assert_eq!(client.get(&key).await.unwrap().as_deref(), Some("1"));
    assert!(client.key(&key).starts_with("nutrilog-test:"));
    assert!(client.health_check().await.unwrap());

    assert!(client.delete(&key).await.unwrap());
    assert!(!client.delete(&key).await.unwrap());
}
