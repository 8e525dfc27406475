//! Server-side session records used for concurrent-session control,
//! anomaly detection and session token rotation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a session stopped being active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Logout,
    LogoutAll,
    UserTerminated,
    ConcurrentLimit,
    Expired,
    IdleTimeout,
    IpChanged,
    DeviceChanged,
    TokenReuse,
    PasswordChanged,
}

str_enum!(TerminationReason {
    Logout => "logout",
    LogoutAll => "logout_all",
    UserTerminated => "user_terminated",
    ConcurrentLimit => "concurrent_limit",
    Expired => "expired",
    IdleTimeout => "idle_timeout",
    IpChanged => "ip_changed",
    DeviceChanged => "device_changed",
    TokenReuse => "token_reuse",
    PasswordChanged => "password_changed",
});

impl TerminationReason {
    /// Terminations triggered by a security check rather than the user
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            TerminationReason::IpChanged | TerminationReason::DeviceChanged | TerminationReason::TokenReuse
        )
    }
}

/// A user's login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 of the current session token
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    /// SHA-256 of the token replaced by the last rotation
    #[serde(skip_serializing, default)]
    pub previous_token_hash: Option<String>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub device_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub last_rotated_at: DateTime<Utc>,
    /// Absolute expiry regardless of activity
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub terminated_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<TerminationReason>,
    /// Number of non-fatal anomalies seen (e.g. IP changes)
    pub anomaly_count: u32,
}

impl UserSession {
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        ip_address: String,
        user_agent: Option<String>,
        device_fingerprint: String,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            previous_token_hash: None,
            ip_address,
            user_agent,
            device_fingerprint,
            created_at: now,
            last_activity_at: now,
            last_rotated_at: now,
            expires_at: now + lifetime,
            is_active: true,
            terminated_at: None,
            termination_reason: None,
            anomaly_count: 0,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_idle_at(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_activity_at > idle_timeout
    }

    pub fn terminate(&mut self, reason: TerminationReason, at: DateTime<Utc>) {
        self.is_active = false;
        self.terminated_at = Some(at);
        self.termination_reason = Some(reason);
    }

    /// Replace the current token, keeping the old hash for the grace window
    pub fn rotate(&mut self, new_token_hash: String, at: DateTime<Utc>) {
        let old = std::mem::replace(&mut self.token_hash, new_token_hash);
        self.previous_token_hash = Some(old);
        self.last_rotated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UserSession {
        UserSession::new(
            Uuid::new_v4(),
            "hash-1".into(),
            "10.0.0.1".into(),
            Some("curl/8".into()),
            "fp".into(),
            Duration::hours(1),
        )
    }

    #[test]
    fn test_rotate_keeps_previous_hash() {
        let mut s = session();
        let at = Utc::now();
        s.rotate("hash-2".into(), at);

        assert_eq!(s.token_hash, "hash-2");
        assert_eq!(s.previous_token_hash.as_deref(), Some("hash-1"));
        assert_eq!(s.last_rotated_at, at);
    }

    #[test]
    fn test_terminate() {
        let mut s = session();
        s.terminate(TerminationReason::Logout, Utc::now());

        assert!(!s.is_active);
        assert_eq!(s.termination_reason, Some(TerminationReason::Logout));
        assert!(s.terminated_at.is_some());
    }

    #[test]
    fn test_idle_and_expiry_checks() {
        let s = session();
        let later = s.last_activity_at + Duration::minutes(90);

        assert!(s.is_idle_at(later, Duration::minutes(60)));
        assert!(!s.is_idle_at(later, Duration::minutes(120)));
        assert!(s.is_expired_at(later));
    }

    #[test]
    fn test_token_hashes_not_serialized() {
        let json = serde_json::to_value(session()).unwrap();
        assert!(json.get("token_hash").is_none());
        assert!(json.get("previous_token_hash").is_none());
    }
}
