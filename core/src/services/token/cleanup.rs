//! Purging of expired refresh tokens and stale blacklist entries

use std::sync::Arc;

use tracing::{error, info, warn};

use super::service::TokenService;

#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    pub interval_seconds: u64,
    /// Expired refresh tokens are kept this long for reuse detection
    pub grace_period_days: i64,
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            grace_period_days: 7,
            enabled: true,
        }
    }
}

/// Counts of one pass; a failing step is recorded in `errors` and the other still runs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCleanupResult {
    pub refresh_tokens_deleted: usize,
    pub blacklist_entries_deleted: usize,
    pub errors: Vec<String>,
}

impl TokenCleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> usize {
        self.refresh_tokens_deleted + self.blacklist_entries_deleted
    }
}

pub struct TokenCleanupService {
    tokens: Arc<TokenService>,
    config: TokenCleanupConfig,
}

impl TokenCleanupService {
    pub fn new(tokens: Arc<TokenService>, config: TokenCleanupConfig) -> Self {
        Self { tokens, config }
    }

    pub async fn run_cleanup(&self) -> TokenCleanupResult {
        let mut result = TokenCleanupResult::default();
        if !self.config.enabled {
            return result;
        }

        match self.tokens.cleanup_expired_tokens(self.config.grace_period_days).await {
            Ok(count) => result.refresh_tokens_deleted = count,
            Err(e) => result.errors.push(format!("refresh tokens: {}", e)),
        }
        match self.tokens.cleanup_blacklist().await {
            Ok(count) => result.blacklist_entries_deleted = count,
            Err(e) => result.errors.push(format!("blacklist: {}", e)),
        }

        info!(
            refresh_tokens = result.refresh_tokens_deleted,
            blacklist = result.blacklist_entries_deleted,
            "Token cleanup completed"
        );
        result
    }

    /// Spawns a tokio task running [`run_cleanup`](Self::run_cleanup) every
    /// `interval_seconds`
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Token cleanup task is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Token cleanup task started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    error!("Token cleanup failed: {:?}", result.errors);
                }
            }
        });
    }
}
