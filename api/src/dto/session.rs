use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use nl_core::domain::entities::session::UserSession;

/// One entry of `GET /api/v1/sessions`
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_current: bool,
}

impl SessionResponse {
    pub fn from_session(session: UserSession, current_session_id: Uuid) -> Self {
        Self {
            is_current: session.id == current_session_id,
            id: session.id,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}
