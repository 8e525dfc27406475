//! Session lifecycle: creation under a concurrent limit, per-request validation
//! with token rotation and anomaly detection, and termination.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use nl_shared::config::{LimitStrategy, SessionConfig};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::session::{TerminationReason, UserSession};
use crate::domain::value_objects::ClientInfo;
use crate::errors::{DomainError, DomainResult, SessionError};
use crate::repositories::SessionRepository;
use crate::services::token::{generate_random_token, hash_token, TokenService};

/// Length of the opaque session token handed to clients
pub const SESSION_TOKEN_LENGTH: usize = 64;

/// Something unusual observed while validating a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAnomaly {
    IpChanged { previous: String, current: String },
    DeviceChanged,
}

/// Outcome of a successful [`SessionManagementService::validate_session`]
#[derive(Debug, Clone)]
pub struct SessionValidation {
    pub session: UserSession,
    /// New raw token when the session token was rotated on this request
    pub rotated_token: Option<String>,
    pub anomalies: Vec<SessionAnomaly>,
}

pub struct SessionManagementService {
    repository: Arc<dyn SessionRepository>,
    tokens: Arc<TokenService>,
    config: SessionConfig,
}

impl SessionManagementService {
    pub fn new(repository: Arc<dyn SessionRepository>, tokens: Arc<TokenService>, config: SessionConfig) -> Self {
        Self {
            repository,
            tokens,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn idle_timeout(&self) -> Duration {
        Duration::minutes(self.config.idle_timeout_minutes)
    }

    fn rotation_interval(&self) -> Duration {
        Duration::minutes(self.config.rotation_interval_minutes)
    }

    fn rotation_grace(&self) -> Duration {
        Duration::seconds(self.config.rotation_grace_seconds)
    }

    /// Opens a new session for `user_id` and returns it with its raw token.
    ///
    /// When the user already holds `max_concurrent_sessions` active sessions the
    /// configured [`LimitStrategy`] decides between evicting the least recently
    /// used ones and refusing the login.
    pub async fn create_session(&self, user_id: Uuid, client: &ClientInfo) -> DomainResult<(UserSession, String)> {
        let max = self.config.max_concurrent_sessions;
        let active = self.repository.count_active_by_user(user_id).await?;

        if active >= u64::from(max) {
            match self.config.limit_strategy {
                LimitStrategy::Reject => {
                    warn!(%user_id, active, max, "Concurrent session limit reached, login rejected");
                    return Err(SessionError::ConcurrentLimitReached { max }.into());
                }
                LimitStrategy::EvictOldest => self.evict_oldest(user_id, active, max).await?,
            }
        }

        let raw_token = generate_random_token(SESSION_TOKEN_LENGTH);
        let session = UserSession::new(
            user_id,
            hash_token(&raw_token),
            client.ip_address.clone(),
            client.user_agent.clone(),
            client.device_fingerprint(),
            Duration::hours(self.config.absolute_lifetime_hours),
        );
        let session = self.repository.create(session).await?;

        info!(%user_id, session_id = %session.id, ip = %session.ip_address, "Session created");
        Ok((session, raw_token))
    }

    async fn evict_oldest(&self, user_id: Uuid, active: u64, max: u32) -> DomainResult<()> {
        // Ordered most recent first, so the tail holds the oldest
        let sessions = self.repository.list_active_by_user(user_id).await?;
        let excess = (active + 1).saturating_sub(u64::from(max)) as usize;
        let now = Utc::now();

        for session in sessions.into_iter().rev().take(excess) {
            info!(%user_id, session_id = %session.id, "Evicting session over concurrent limit");
            self.terminate(session, TerminationReason::ConcurrentLimit, now).await?;
        }
        Ok(())
    }

    /// Checks a session on an authenticated request.
    ///
    /// Expired, idle, reused or anomalous sessions are terminated before the
    /// error is returned. On success the activity timestamp is refreshed and the
    /// token is rotated once `rotation_interval_minutes` has passed.
    pub async fn validate_session(
        &self,
        session_id: Uuid,
        raw_token: &str,
        client: &ClientInfo,
    ) -> DomainResult<SessionValidation> {
        let now = Utc::now();
        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;

        if !session.is_active {
            return Err(SessionError::Terminated.into());
        }

        self.check_lifetime(&session, now).await?;

        let presented = hash_token(raw_token);
        let stored_hash = session.token_hash.clone();
        let mut may_rotate = true;
        if !hashes_match(&presented, &session.token_hash) {
            let matches_previous = session
                .previous_token_hash
                .as_deref()
                .map_or(false, |previous| hashes_match(&presented, previous));
            if !matches_previous {
                return Err(SessionError::InvalidToken.into());
            }
            if now - session.last_rotated_at > self.rotation_grace() {
                warn!(
                    user_id = %session.user_id,
                    session_id = %session.id,
                    "Rotated session token reused after grace window"
                );
                self.terminate(session, TerminationReason::TokenReuse, now).await?;
                return Err(SessionError::TokenReused.into());
            }
            // In-flight request that raced the rotation
            may_rotate = false;
        }

        let mut anomalies = Vec::new();

        let fingerprint = client.device_fingerprint();
        if fingerprint != session.device_fingerprint {
            warn!(
                user_id = %session.user_id,
                session_id = %session.id,
                "Session device fingerprint changed"
            );
            if self.config.terminate_on_device_change {
                self.terminate(session, TerminationReason::DeviceChanged, now).await?;
                return Err(SessionError::DeviceMismatch.into());
            }
            anomalies.push(SessionAnomaly::DeviceChanged);
            session.device_fingerprint = fingerprint;
            session.user_agent = client.user_agent.clone();
            session.anomaly_count += 1;
        }

        if client.ip_address != session.ip_address {
            warn!(
                user_id = %session.user_id,
                session_id = %session.id,
                previous = %session.ip_address,
                current = %client.ip_address,
                "Session IP address changed"
            );
            if self.config.strict_ip_binding {
                self.terminate(session, TerminationReason::IpChanged, now).await?;
                return Err(SessionError::IpMismatch.into());
            }
            anomalies.push(SessionAnomaly::IpChanged {
                previous: std::mem::replace(&mut session.ip_address, client.ip_address.clone()),
                current: client.ip_address.clone(),
            });
            session.anomaly_count += 1;
        }

        let rotated_token = if may_rotate && now - session.last_rotated_at >= self.rotation_interval() {
            let raw = generate_random_token(SESSION_TOKEN_LENGTH);
            session.rotate(hash_token(&raw), now);
            debug!(session_id = %session.id, "Session token rotated");
            Some(raw)
        } else {
            None
        };

        session.last_activity_at = now;
        if !self.repository.update_if_token(&session, &stored_hash).await? {
            // A concurrent request rotated or ended the session after it was read
            let current = self
                .repository
                .find_by_id(session_id)
                .await?
                .ok_or(SessionError::NotFound)?;
            if !current.is_active {
                return Err(SessionError::Terminated.into());
            }
            debug!(session_id = %session_id, "Session changed concurrently, keeping the stored token");
            return Ok(SessionValidation {
                session: current,
                rotated_token: None,
                anomalies,
            });
        }

        Ok(SessionValidation {
            session,
            rotated_token,
            anomalies,
        })
    }

    /// Terminates the session if it outlived its absolute lifetime or idle timeout
    async fn check_lifetime(&self, session: &UserSession, now: DateTime<Utc>) -> DomainResult<()> {
        let reason = if session.is_expired_at(now) {
            TerminationReason::Expired
        } else if session.is_idle_at(now, self.idle_timeout()) {
            TerminationReason::IdleTimeout
        } else {
            return Ok(());
        };

        self.terminate(session.clone(), reason, now).await?;
        Err(SessionError::Expired.into())
    }

    /// Confirms the session backing a refresh token is still usable
    pub async fn ensure_active(&self, user_id: Uuid, session_id: Uuid) -> DomainResult<UserSession> {
        let session = self
            .repository
            .find_by_id(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(SessionError::NotFound)?;

        if !session.is_active {
            return Err(SessionError::Terminated.into());
        }
        self.check_lifetime(&session, Utc::now()).await?;

        Ok(session)
    }

    /// Active sessions of a user, most recently used first
    pub async fn list_active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<UserSession>> {
        let now = Utc::now();
        let idle = self.idle_timeout();
        let sessions = self.repository.list_active_by_user(user_id).await?;

        Ok(sessions
            .into_iter()
            .filter(|s| !s.is_expired_at(now) && !s.is_idle_at(now, idle))
            .collect())
    }

    /// Terminates one of the user's sessions. Sessions of other users are reported as missing.
    pub async fn terminate_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        reason: TerminationReason,
    ) -> DomainResult<()> {
        let session = self
            .repository
            .find_by_id(session_id)
            .await?
            .filter(|s| s.user_id == user_id && s.is_active)
            .ok_or_else(|| DomainError::not_found("Session"))?;

        self.terminate(session, reason, Utc::now()).await
    }

    /// Terminates every session of the user except `keep_session_id`
    pub async fn terminate_other_sessions(
        &self,
        user_id: Uuid,
        keep_session_id: Uuid,
        reason: TerminationReason,
    ) -> DomainResult<usize> {
        self.terminate_for_user(user_id, Some(keep_session_id), reason).await
    }

    pub async fn terminate_all_sessions(&self, user_id: Uuid, reason: TerminationReason) -> DomainResult<usize> {
        self.terminate_for_user(user_id, None, reason).await
    }

    async fn terminate_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: TerminationReason,
    ) -> DomainResult<usize> {
        let affected: Vec<Uuid> = self
            .repository
            .list_active_by_user(user_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .filter(|id| Some(*id) != except)
            .collect();

        let count = self
            .repository
            .deactivate_for_user(user_id, except, reason, Utc::now())
            .await?;

        for session_id in affected {
            self.tokens.revoke_session_tokens(session_id).await?;
        }

        info!(%user_id, count, reason = %reason, "Sessions terminated");
        Ok(count)
    }

    async fn terminate(&self, mut session: UserSession, reason: TerminationReason, at: DateTime<Utc>) -> DomainResult<()> {
        session.terminate(reason, at);
        let session = self.repository.update(session).await?;
        self.tokens.revoke_session_tokens(session.id).await?;

        if reason.is_security_event() {
            warn!(user_id = %session.user_id, session_id = %session.id, reason = %reason, "Session terminated");
        } else {
            info!(user_id = %session.user_id, session_id = %session.id, reason = %reason, "Session terminated");
        }
        Ok(())
    }
}

fn hashes_match(presented: &str, stored: &str) -> bool {
    constant_time_eq(presented.as_bytes(), stored.as_bytes())
}
