//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{TokenPair, User};

/// Returned after register, login and refresh.
///
/// `session_token` must be sent back in the `X-Session-Token` header; it is
/// only present when a new session was created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl AuthResponse {
    pub fn new(user: User, tokens: TokenPair, session_id: Uuid, session_token: Option<String>) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.access_expires_in,
            session_id,
            session_token,
        }
    }
}
