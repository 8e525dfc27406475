//! Access token claims and the persisted refresh token chain

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload of an access token; `sid` ties it to a server-side session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,

    /// Server-side session the token was issued for
    pub sid: String,

    /// Email at issue time
    pub email: String,

    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl Claims {
    pub fn new_access_token(
        user_id: Uuid,
        session_id: Uuid,
        email: &str,
        issuer: &str,
        audience: &str,
        expiry_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(expiry_seconds);

        Self {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// Refresh token row; only the hash of the value is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Session the token chain is bound to
    pub session_id: Option<Uuid>,

    /// SHA-256 of the token value
    pub token_hash: String,

    /// Identifier shared by every token produced by rotation from one login
    pub token_family: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
}

impl RefreshToken {
    pub fn new(
        user_id: Uuid,
        session_id: Option<Uuid>,
        token_hash: String,
        token_family: String,
        expiry_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_id,
            token_hash,
            token_family,
            created_at: now,
            expires_at: now + Duration::seconds(expiry_seconds),
            is_revoked: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A token is valid if it hasn't expired and hasn't been revoked
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked
    }

    pub fn revoke(&mut self) {
        self.is_revoked = true;
    }
}

/// Issued together at login and on every refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Seconds
    pub access_expires_in: i64,
    pub refresh_expires_in: i64,
}
