//! In-memory implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::{TerminationReason, UserSession};
use crate::errors::DomainError;

use super::trait_::SessionRepository;

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, UserSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError> {
        self.sessions.write().await.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(DomainError::not_found("Session"));
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_if_token(&self, session: &UserSession, expected_token_hash: &str) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) if stored.is_active && stored.token_hash == expected_token_hash => {
                *stored = session.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("Session")),
        }
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut active: Vec<UserSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(active)
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().filter(|s| s.user_id == user_id && s.is_active).count() as u64)
    }

    async fn deactivate_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: TerminationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions.values_mut() {
            if session.user_id == user_id && session.is_active && Some(session.id) != except {
                session.terminate(reason, at);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn deactivate_stale(&self, idle_cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions.values_mut().filter(|s| s.is_active) {
            if session.is_expired_at(now) {
                session.terminate(TerminationReason::Expired, now);
                count += 1;
            } else if session.last_activity_at < idle_cutoff {
                session.terminate(TerminationReason::IdleTimeout, now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn purge_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let initial = sessions.len();
        sessions.retain(|_, s| s.is_active || s.terminated_at.map_or(true, |at| at >= cutoff));
        Ok(initial - sessions.len())
    }
}
