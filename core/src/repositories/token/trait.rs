//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for refresh tokens and the access-token blacklist
///
/// # Security Considerations
/// - Tokens are stored as SHA-256 hashes, never in plain text
/// - Expired tokens should be periodically cleaned up
/// - Revoked tokens are kept so that reuse can be detected
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Revoke one token; `false` when no active token matched
    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Revoke every token produced by rotation from the same login
    async fn revoke_token_family(&self, token_family: &str) -> Result<usize, DomainError>;

    /// Revoke every token of a user
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Revoke the tokens bound to one session
    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<usize, DomainError>;

    /// Delete tokens that expired before `before`
    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Add an access token's JWT ID to the blacklist until it expires
    async fn blacklist_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Check if a JWT ID is blacklisted
    async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, DomainError>;

    /// Drop blacklist entries whose token has expired anyway
    async fn cleanup_blacklist(&self) -> Result<usize, DomainError>;
}
