//! In-memory implementation of ProfileRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::profile::UserProfile;
use crate::errors::DomainError;

use super::trait_::ProfileRepository;

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, DomainError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.profiles.write().await.remove(&user_id).is_some())
    }
}
