use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use nl_shared::config::{LimitStrategy, SessionConfig};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{harness, laptop, phone};
use crate::domain::entities::session::{TerminationReason, UserSession};
use crate::domain::value_objects::ClientInfo;
use crate::errors::{DomainError, SessionError};
use crate::repositories::{InMemorySessionRepository, InMemoryTokenRepository, SessionRepository};
use crate::services::session::{SessionAnomaly, SessionManagementService, SESSION_TOKEN_LENGTH};
use crate::services::token::{hash_token, TokenService, TokenServiceConfig};

#[tokio::test]
async fn test_create_session_stores_only_hash() {
    let h = harness(SessionConfig::default());
    let user_id = Uuid::new_v4();

    let (session, raw) = h.service.create_session(user_id, &laptop()).await.unwrap();

    assert_eq!(raw.len(), SESSION_TOKEN_LENGTH);
    assert!(raw.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(session.token_hash, hash_token(&raw));
    assert_eq!(session.ip_address, "203.0.113.10");
    assert_eq!(session.device_fingerprint, laptop().device_fingerprint());
    assert_eq!(session.expires_at - session.created_at, Duration::hours(168));
}

#[tokio::test]
async fn test_concurrent_limit_evicts_least_recently_used() {
    let config = SessionConfig {
        max_concurrent_sessions: 2,
        ..Default::default()
    };
    let h = harness(config);
    let user_id = Uuid::new_v4();

    let (mut old, _) = h.service.create_session(user_id, &laptop()).await.unwrap();
    old.last_activity_at = Utc::now() - Duration::minutes(30);
    h.sessions.update(old.clone()).await.unwrap();
    let (recent, _) = h.service.create_session(user_id, &phone()).await.unwrap();

    let (third, _) = h.service.create_session(user_id, &laptop()).await.unwrap();

    let evicted = h.sessions.find_by_id(old.id).await.unwrap().unwrap();
    assert!(!evicted.is_active);
    assert_eq!(evicted.termination_reason, Some(TerminationReason::ConcurrentLimit));

    let active: Vec<Uuid> = h.service.list_active_sessions(user_id).await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(active.len(), 2);
    assert!(active.contains(&recent.id));
    assert!(active.contains(&third.id));
}

#[tokio::test]
async fn test_concurrent_limit_reject_strategy() {
    let config = SessionConfig {
        max_concurrent_sessions: 1,
        limit_strategy: LimitStrategy::Reject,
        ..Default::default()
    };
    let h = harness(config);
    let user_id = Uuid::new_v4();

    h.service.create_session(user_id, &laptop()).await.unwrap();
    let result = h.service.create_session(user_id, &phone()).await;

    assert!(matches!(
        result,
        Err(DomainError::Session(SessionError::ConcurrentLimitReached { max: 1 }))
    ));
}

#[tokio::test]
async fn test_validate_session_happy_path() {
    let h = harness(SessionConfig::default());
    let (session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await.unwrap();

    assert!(result.rotated_token.is_none());
    assert!(result.anomalies.is_empty());
    assert!(result.session.last_activity_at >= session.last_activity_at);
}

#[tokio::test]
async fn test_unknown_and_wrong_token() {
    let h = harness(SessionConfig::default());
    let (session, _) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();

    let missing = h.service.validate_session(Uuid::new_v4(), "x", &laptop()).await;
    assert!(matches!(missing, Err(DomainError::Session(SessionError::NotFound))));

    let wrong = h.service.validate_session(session.id, "not-the-token", &laptop()).await;
    assert!(matches!(wrong, Err(DomainError::Session(SessionError::InvalidToken))));
}

#[tokio::test]
async fn test_terminated_session_rejected() {
    let h = harness(SessionConfig::default());
    let user_id = Uuid::new_v4();
    let (session, raw) = h.service.create_session(user_id, &laptop()).await.unwrap();

    h.service
        .terminate_session(user_id, session.id, TerminationReason::Logout)
        .await
        .unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::Terminated))));
}

#[tokio::test]
async fn test_idle_session_expires() {
    let h = harness(SessionConfig::default());
    let (mut session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.last_activity_at = Utc::now() - Duration::minutes(121);
    h.sessions.update(session.clone()).await.unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::Expired))));

    let stored = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.termination_reason, Some(TerminationReason::IdleTimeout));
}

#[tokio::test]
async fn test_absolute_lifetime_expires() {
    let h = harness(SessionConfig::default());
    let (mut session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.expires_at = Utc::now() - Duration::seconds(1);
    h.sessions.update(session.clone()).await.unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::Expired))));

    let stored = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.termination_reason, Some(TerminationReason::Expired));
}

#[tokio::test]
async fn test_rotation_after_interval() {
    let h = harness(SessionConfig::default());
    let (mut session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.last_rotated_at = Utc::now() - Duration::minutes(16);
    h.sessions.update(session.clone()).await.unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await.unwrap();
    let rotated = result.rotated_token.expect("token should rotate");

    assert_ne!(rotated, raw);
    assert_eq!(result.session.token_hash, hash_token(&rotated));
    assert_eq!(result.session.previous_token_hash, Some(hash_token(&raw)));

    // New token works without another rotation
    let next = h.service.validate_session(session.id, &rotated, &laptop()).await.unwrap();
    assert!(next.rotated_token.is_none());
}

#[tokio::test]
async fn test_previous_token_accepted_within_grace() {
    let h = harness(SessionConfig::default());
    let (mut session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.last_rotated_at = Utc::now() - Duration::minutes(16);
    h.sessions.update(session.clone()).await.unwrap();

    h.service.validate_session(session.id, &raw, &laptop()).await.unwrap();

    let raced = h.service.validate_session(session.id, &raw, &laptop()).await.unwrap();
    assert!(raced.rotated_token.is_none());
    assert!(raced.session.is_active);
}

#[tokio::test]
async fn test_previous_token_after_grace_terminates() {
    let h = harness(SessionConfig::default());
    let (mut session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.last_rotated_at = Utc::now() - Duration::minutes(16);
    h.sessions.update(session.clone()).await.unwrap();

    h.service.validate_session(session.id, &raw, &laptop()).await.unwrap();

    let mut rotated = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    rotated.last_rotated_at = Utc::now() - Duration::seconds(31);
    h.sessions.update(rotated).await.unwrap();

    let result = h.service.validate_session(session.id, &raw, &laptop()).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::TokenReused))));

    let stored = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.termination_reason, Some(TerminationReason::TokenReuse));
}

#[tokio::test]
async fn test_device_change_terminates_by_default() {
    let h = harness(SessionConfig::default());
    let (session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    let other_device = ClientInfo::new("203.0.113.10", Some("curl/8.4".to_string()), None);

    let result = h.service.validate_session(session.id, &raw, &other_device).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::DeviceMismatch))));

    let stored = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.termination_reason, Some(TerminationReason::DeviceChanged));
}

#[tokio::test]
async fn test_device_change_flagged_when_lenient() {
    let config = SessionConfig {
        terminate_on_device_change: false,
        ..Default::default()
    };
    let h = harness(config);
    let (session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    let other_device = ClientInfo::new("203.0.113.10", Some("curl/8.4".to_string()), None);

    let result = h.service.validate_session(session.id, &raw, &other_device).await.unwrap();
    assert_eq!(result.anomalies, vec![SessionAnomaly::DeviceChanged]);
    assert_eq!(result.session.anomaly_count, 1);
}

#[tokio::test]
async fn test_ip_change_flags_and_updates() {
    let h = harness(SessionConfig::default());
    let (session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    let mut moved = laptop();
    moved.ip_address = "192.0.2.99".to_string();

    let result = h.service.validate_session(session.id, &raw, &moved).await.unwrap();

    assert_eq!(
        result.anomalies,
        vec![SessionAnomaly::IpChanged {
            previous: "203.0.113.10".to_string(),
            current: "192.0.2.99".to_string(),
        }]
    );
    assert_eq!(result.session.ip_address, "192.0.2.99");
    assert_eq!(result.session.anomaly_count, 1);
    assert!(result.session.is_active);
}

#[tokio::test]
async fn test_ip_change_terminates_in_strict_mode() {
    let config = SessionConfig {
        strict_ip_binding: true,
        ..Default::default()
    };
    let h = harness(config);
    let (session, raw) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    let mut moved = laptop();
    moved.ip_address = "192.0.2.99".to_string();

    let result = h.service.validate_session(session.id, &raw, &moved).await;
    assert!(matches!(result, Err(DomainError::Session(SessionError::IpMismatch))));
}

#[tokio::test]
async fn test_terminate_session_of_other_user_is_not_found() {
    let h = harness(SessionConfig::default());
    let (session, _) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();

    let result = h
        .service
        .terminate_session(Uuid::new_v4(), session.id, TerminationReason::UserTerminated)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_terminate_other_sessions_keeps_current() {
    let h = harness(SessionConfig::default());
    let user_id = Uuid::new_v4();
    let (current, _) = h.service.create_session(user_id, &laptop()).await.unwrap();
    h.service.create_session(user_id, &phone()).await.unwrap();
    h.service.create_session(user_id, &phone()).await.unwrap();

    let count = h
        .service
        .terminate_other_sessions(user_id, current.id, TerminationReason::UserTerminated)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let active = h.service.list_active_sessions(user_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, current.id);
}

#[tokio::test]
async fn test_terminating_session_revokes_its_refresh_tokens() {
    let h = harness(SessionConfig::default());
    let user_id = Uuid::new_v4();
    let (session, _) = h.service.create_session(user_id, &laptop()).await.unwrap();
    let pair = h.tokens.generate_tokens(user_id, session.id, "a@b.io").await.unwrap();

    h.service
        .terminate_all_sessions(user_id, TerminationReason::LogoutAll)
        .await
        .unwrap();

    assert!(h.tokens.validate_refresh_token(&pair.refresh_token).await.is_err());
    assert!(matches!(
        h.service.ensure_active(user_id, session.id).await,
        Err(DomainError::Session(SessionError::Terminated))
    ));
}

/// Session store where another request's rotation lands right after the next read
struct InterleavedRotation {
    inner: InMemorySessionRepository,
    pending: Mutex<Option<String>>,
}

#[async_trait]
impl SessionRepository for InterleavedRotation {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError> {
        self.inner.create(session).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError> {
        let snapshot = self.inner.find_by_id(id).await?;
        if let (Some(raw), Some(session)) = (self.pending.lock().await.take(), snapshot.clone()) {
            let mut rotated = session;
            rotated.rotate(hash_token(&raw), Utc::now());
            self.inner.update(rotated).await?;
        }
        Ok(snapshot)
    }

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError> {
        self.inner.update(session).await
    }

    async fn update_if_token(&self, session: &UserSession, expected_token_hash: &str) -> Result<bool, DomainError> {
        self.inner.update_if_token(session, expected_token_hash).await
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError> {
        self.inner.list_active_by_user(user_id).await
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.inner.count_active_by_user(user_id).await
    }

    async fn deactivate_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: TerminationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.inner.deactivate_for_user(user_id, except, reason, at).await
    }

    async fn deactivate_stale(&self, idle_cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.inner.deactivate_stale(idle_cutoff, now).await
    }

    async fn purge_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.inner.purge_inactive_before(cutoff).await
    }
}

#[tokio::test]
async fn test_concurrent_rotation_keeps_first_writer() {
    let repository = Arc::new(InterleavedRotation {
        inner: InMemorySessionRepository::new(),
        pending: Mutex::new(None),
    });
    let tokens = Arc::new(TokenService::new(
        Arc::new(InMemoryTokenRepository::new()),
        TokenServiceConfig::default(),
    ));
    let service = SessionManagementService::new(repository.clone(), tokens, SessionConfig::default());

    let (mut session, raw) = service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();
    session.last_rotated_at = Utc::now() - Duration::minutes(16);
    repository.update(session.clone()).await.unwrap();

    // The other request rotates to `winner` between this request's read and write
    let winner = "W".repeat(SESSION_TOKEN_LENGTH);
    *repository.pending.lock().await = Some(winner.clone());

    let result = service.validate_session(session.id, &raw, &laptop()).await.unwrap();
    assert!(result.rotated_token.is_none());
    assert_eq!(result.session.token_hash, hash_token(&winner));

    let stored = repository.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.token_hash, hash_token(&winner));
    assert_eq!(stored.previous_token_hash, Some(hash_token(&raw)));

    // Both the winner's token and the old one (within grace) keep working
    assert!(service.validate_session(session.id, &winner, &laptop()).await.is_ok());
    assert!(service.validate_session(session.id, &raw, &laptop()).await.is_ok());
}

#[tokio::test]
async fn test_update_if_token_rejects_stale_writer() {
    let h = harness(SessionConfig::default());
    let (session, _) = h.service.create_session(Uuid::new_v4(), &laptop()).await.unwrap();

    let mut stale = session.clone();
    stale.ip_address = "198.51.100.1".to_string();
    assert!(!h.sessions.update_if_token(&stale, &hash_token("something else")).await.unwrap());
    assert!(h.sessions.update_if_token(&stale, &session.token_hash).await.unwrap());

    let stored = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.ip_address, "198.51.100.1");
}
