//! Profile repository trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::profile::UserProfile;
use crate::errors::DomainError;

/// Persistence for user profiles, keyed by user id
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError>;

    /// Insert or replace the profile of `profile.user_id`
    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, DomainError>;

    async fn delete(&self, user_id: Uuid) -> Result<bool, DomainError>;
}
