use crate::services::auth::{InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};

#[tokio::test]
async fn test_hits_within_limit() {
    let store = InMemoryRateLimitStore::new();

    let first = store.hit("ip:1", 3, 60).await.unwrap();
    assert!(first.allowed);
    assert_eq!(first.remaining, 2);
    assert_eq!(first.limit, 3);
    assert!(first.reset_after_seconds > 0 && first.reset_after_seconds <= 60);

    store.hit("ip:1", 3, 60).await.unwrap();
    let third = store.hit("ip:1", 3, 60).await.unwrap();
    assert!(third.allowed);
    assert_eq!(third.remaining, 0);

    let fourth = store.hit("ip:1", 3, 60).await.unwrap();
    assert!(!fourth.allowed);
    assert_eq!(fourth.remaining, 0);
}

#[tokio::test]
async fn test_keys_are_independent() {
    let store = InMemoryRateLimitStore::new();
    store.hit("a", 1, 60).await.unwrap();

    assert!(!store.hit("a", 1, 60).await.unwrap().allowed);
    assert!(store.hit("b", 1, 60).await.unwrap().allowed);
}

#[tokio::test(start_paused = true)]
async fn test_window_resets() {
    let store = InMemoryRateLimitStore::new();
    store.hit("k", 1, 10).await.unwrap();
    assert!(!store.hit("k", 1, 10).await.unwrap().allowed);

    tokio::time::advance(std::time::Duration::from_secs(11)).await;
    assert!(store.hit("k", 1, 10).await.unwrap().allowed);
}

#[tokio::test]
async fn test_reset_clears_counter() {
    let store = InMemoryRateLimitStore::new();
    store.hit("k", 1, 60).await.unwrap();
    store.reset("k").await.unwrap();

    assert!(store.hit("k", 1, 60).await.unwrap().allowed);
}

#[tokio::test(start_paused = true)]
async fn test_lock_expires() {
    let store = InMemoryRateLimitStore::new();
    assert_eq!(store.lock_ttl("k").await.unwrap(), None);

    store.lock("k", 30).await.unwrap();
    assert_eq!(store.lock_ttl("k").await.unwrap(), Some(30));

    tokio::time::advance(std::time::Duration::from_secs(31)).await;
    assert_eq!(store.lock_ttl("k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_expired_windows_are_swept() {
    let store = InMemoryRateLimitStore::new();
    for key in ["api:192.0.2.1", "api:192.0.2.2", "api:192.0.2.3"] {
        store.hit(key, 10, 10).await.unwrap();
    }
    assert_eq!(store.tracked_keys().await, (3, 0));

    tokio::time::advance(std::time::Duration::from_secs(61)).await;
    store.hit("api:192.0.2.4", 10, 10).await.unwrap();
    assert_eq!(store.tracked_keys().await, (1, 0));
}

#[tokio::test(start_paused = true)]
async fn test_live_windows_survive_sweep() {
    let store = InMemoryRateLimitStore::new();
    store.hit("long", 2, 300).await.unwrap();
    store.hit("short", 2, 10).await.unwrap();

    tokio::time::advance(std::time::Duration::from_secs(61)).await;
    store.hit("other", 2, 10).await.unwrap();
    assert_eq!(store.tracked_keys().await, (2, 0));

    // The surviving window still counts from its first hit
    assert_eq!(store.hit("long", 2, 300).await.unwrap().remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_locks_are_swept() {
    let store = InMemoryRateLimitStore::new();
    store.lock("login_lock:a@example.com", 5).await.unwrap();
    store.lock("login_lock:b@example.com", 5).await.unwrap();

    tokio::time::advance(std::time::Duration::from_secs(61)).await;
    store.lock("login_lock:c@example.com", 900).await.unwrap();
    assert_eq!(store.tracked_keys().await, (0, 1));
    assert_eq!(store.lock_ttl("login_lock:c@example.com").await.unwrap(), Some(900));
}

#[test]
fn test_decision_remaining_saturates() {
    let decision = RateLimitDecision::new(12, 10, 5);
    assert!(!decision.allowed);
    assert_eq!(decision.remaining, 0);
}
