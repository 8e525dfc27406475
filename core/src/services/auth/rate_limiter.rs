//! Fixed-window counters and temporary locks used for rate limiting and
//! brute-force protection

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::errors::DomainResult;

/// Result of counting one request against a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window closes
    pub reset_after_seconds: u64,
}

impl RateLimitDecision {
    pub fn new(count: u64, limit: u32, reset_after_seconds: u64) -> Self {
        Self {
            allowed: count <= u64::from(limit),
            limit,
            remaining: u64::from(limit).saturating_sub(count) as u32,
            reset_after_seconds,
        }
    }
}

/// Counter and lock storage shared by the rate-limit middleware and login protection
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Counts one hit on `key` in a fixed window of `window_seconds`
    async fn hit(&self, key: &str, limit: u32, window_seconds: u64) -> DomainResult<RateLimitDecision>;

    /// Clears the counter for `key`
    async fn reset(&self, key: &str) -> DomainResult<()>;

    /// Locks `key` for `seconds`
    async fn lock(&self, key: &str, seconds: u64) -> DomainResult<()>;

    /// Remaining lock time, `None` when not locked
    async fn lock_ttl(&self, key: &str) -> DomainResult<Option<u64>>;
}

/// Expired entries are dropped at most once per this interval
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    resets_at: Instant,
}

/// Keyed entries plus the time of the next expiry sweep
#[derive(Debug)]
struct Entries<T> {
    map: HashMap<String, T>,
    next_sweep: Option<Instant>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            next_sweep: None,
        }
    }
}

impl<T> Entries<T> {
    fn sweep(&mut self, now: Instant, is_live: impl Fn(&T) -> bool) {
        if self.next_sweep.map_or(false, |at| at > now) {
            return;
        }
        self.map.retain(|_, entry| is_live(entry));
        self.next_sweep = Some(now + SWEEP_INTERVAL);
    }
}

/// Process-local store, for tests and single-instance deployments
///
/// Keys whose window or lock has run out are swept on later calls, so keys
/// that never come back do not accumulate.
#[derive(Default, Clone)]
pub struct InMemoryRateLimitStore {
    windows: Arc<Mutex<Entries<Window>>>,
    locks: Arc<Mutex<Entries<Instant>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of window and lock entries currently held
    #[cfg(test)]
    pub(crate) async fn tracked_keys(&self) -> (usize, usize) {
        (self.windows.lock().await.map.len(), self.locks.lock().await.map.len())
    }
}

fn seconds_until(deadline: Instant, now: Instant) -> u64 {
    let remaining = deadline.saturating_duration_since(now);
    // Round up so a live window never reports zero
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, limit: u32, window_seconds: u64) -> DomainResult<RateLimitDecision> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.sweep(now, |w| w.resets_at > now);

        let window = windows
            .map
            .entry(key.to_string())
            .and_modify(|w| {
                if w.resets_at <= now {
                    w.count = 0;
                    w.resets_at = now + Duration::from_secs(window_seconds);
                }
            })
            .or_insert(Window {
                count: 0,
                resets_at: now + Duration::from_secs(window_seconds),
            });
        window.count += 1;

        Ok(RateLimitDecision::new(window.count, limit, seconds_until(window.resets_at, now)))
    }

    async fn reset(&self, key: &str) -> DomainResult<()> {
        self.windows.lock().await.map.remove(key);
        Ok(())
    }

    async fn lock(&self, key: &str, seconds: u64) -> DomainResult<()> {
        let now = Instant::now();
        let mut locks = self.locks.lock().await;
        locks.sweep(now, |until| *until > now);
        locks.map.insert(key.to_string(), now + Duration::from_secs(seconds));
        Ok(())
    }

    async fn lock_ttl(&self, key: &str) -> DomainResult<Option<u64>> {
        let now = Instant::now();
        let mut locks = self.locks.lock().await;
        locks.sweep(now, |until| *until > now);

        match locks.map.get(key) {
            Some(until) if *until > now => Ok(Some(seconds_until(*until, now))),
            Some(_) => {
                locks.map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
