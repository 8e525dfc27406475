//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens are stored by SHA-256 hash in `refresh_tokens`; revoked
//! access-token ids live in `token_blacklist` until the token would have
//! expired anyway.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use nl_core::domain::entities::token::RefreshToken;
use nl_core::errors::DomainError;
use nl_core::repositories::TokenRepository;

use super::{get, get_optional_uuid, get_uuid};
use crate::database::map_sqlx_error;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &MySqlRow) -> Result<RefreshToken, DomainError> {
        Ok(RefreshToken {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            session_id: get_optional_uuid(row, "session_id")?,
            token_hash: get(row, "token_hash")?,
            token_family: get(row, "token_family")?,
            created_at: get(row, "created_at")?,
            expires_at: get(row, "expires_at")?,
            is_revoked: get(row, "is_revoked")?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, session_id, token_hash, token_family,
                created_at, expires_at, is_revoked
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(token.session_id.map(|id| id.to_string()))
            .bind(&token.token_hash)
            .bind(&token.token_family)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_revoked)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save refresh token", e))?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, session_id, token_hash, token_family,
                   created_at, expires_at, is_revoked
            FROM refresh_tokens
            WHERE token_hash = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find refresh token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE
            WHERE token_hash = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_token_family(&self, token_family: &str) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE WHERE token_family = ? AND is_revoked = FALSE",
        )
        .bind(token_family)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke token family", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE WHERE user_id = ? AND is_revoked = FALSE",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE WHERE session_id = ? AND is_revoked = FALSE",
        )
        .bind(session_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke session tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete expired tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn blacklist_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        // Blacklisting twice (logout racing logout-all) keeps the first row
        let query = r#"
            INSERT INTO token_blacklist (jti, expires_at, created_at)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE expires_at = GREATEST(expires_at, VALUES(expires_at))
        "#;

        sqlx::query(query)
            .bind(jti)
            .bind(expires_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("blacklist token", e))?;

        Ok(())
    }

    async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM token_blacklist WHERE jti = ?")
            .bind(jti)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("check token blacklist", e))?;

        Ok(row.0 > 0)
    }

    async fn cleanup_blacklist(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("clean up token blacklist", e))?;

        Ok(result.rows_affected() as usize)
    }
}
