//! Periodic deactivation and purging of stale sessions

use std::sync::Arc;

use chrono::{Duration, Utc};
use nl_shared::config::SessionConfig;
use tracing::{error, info, warn};

use crate::errors::DomainResult;
use crate::repositories::SessionRepository;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionCleanupResult {
    /// Active sessions closed because they expired or went idle
    pub deactivated: usize,
    /// Inactive sessions deleted after the retention period
    pub purged: usize,
}

pub struct SessionCleanupService {
    repository: Arc<dyn SessionRepository>,
    config: SessionConfig,
}

impl SessionCleanupService {
    pub fn new(repository: Arc<dyn SessionRepository>, config: SessionConfig) -> Self {
        Self { repository, config }
    }

    /// Overrides how long terminated sessions are kept
    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.config.retention_days = days;
        self
    }

    pub fn retention_days(&self) -> i64 {
        self.config.retention_days
    }

    /// Runs one cleanup pass
    pub async fn run_cleanup(&self) -> DomainResult<SessionCleanupResult> {
        let now = Utc::now();
        let idle_cutoff = now - Duration::minutes(self.config.idle_timeout_minutes);

        let deactivated = self.repository.deactivate_stale(idle_cutoff, now).await?;
        let purged = self
            .repository
            .purge_inactive_before(now - Duration::days(self.config.retention_days))
            .await?;

        info!(deactivated, purged, "Session cleanup completed");
        Ok(SessionCleanupResult { deactivated, purged })
    }

    /// Spawns a tokio task running [`run_cleanup`](Self::run_cleanup) every
    /// `cleanup_interval_seconds`
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.cleanup_enabled {
            warn!("Session cleanup task is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.cleanup_interval_seconds);

        tokio::spawn(async move {
            info!(
                "Session cleanup task started - will run every {} seconds",
                self.config.cleanup_interval_seconds
            );

            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!("Session cleanup failed: {}", e);
                }
            }
        });
    }
}
