//! Session repository trait for server-side session tracking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{TerminationReason, UserSession};
use crate::errors::DomainError;

/// Persistence for [`UserSession`] records
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError>;

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError>;

    /// Writes `session` only while the stored row is active and still holds
    /// `expected_token_hash`; `false` when another writer got there first
    async fn update_if_token(&self, session: &UserSession, expected_token_hash: &str) -> Result<bool, DomainError>;

    /// Active sessions of a user, most recently active first
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError>;

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Terminate every active session of a user except `except`
    async fn deactivate_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: TerminationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Terminate active sessions past their absolute expiry (`Expired`) or
    /// idle since before `idle_cutoff` (`IdleTimeout`)
    async fn deactivate_stale(&self, idle_cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Delete inactive sessions terminated before `cutoff`
    async fn purge_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
