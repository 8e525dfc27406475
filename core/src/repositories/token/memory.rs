//! In-memory implementation of TokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::trait_::TokenRepository;

/// In-memory token store keyed by token hash
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
    blacklist: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn revoke_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&RefreshToken) -> bool + Send,
    {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;
        for token in tokens.values_mut() {
            if !token.is_revoked && predicate(token) {
                token.revoke();
                count += 1;
            }
        }
        count
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Conflict {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_token_family(&self, token_family: &str) -> Result<usize, DomainError> {
        Ok(self.revoke_where(|t| t.token_family == token_family).await)
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        Ok(self.revoke_where(|t| t.user_id == user_id).await)
    }

    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<usize, DomainError> {
        Ok(self.revoke_where(|t| t.session_id == Some(session_id)).await)
    }

    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial = tokens.len();
        tokens.retain(|_, t| t.expires_at >= before);
        Ok(initial - tokens.len())
    }

    async fn blacklist_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.blacklist.write().await.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.blacklist.read().await.contains_key(jti))
    }

    async fn cleanup_blacklist(&self) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut blacklist = self.blacklist.write().await;
        let initial = blacklist.len();
        blacklist.retain(|_, expires_at| *expires_at > now);
        Ok(initial - blacklist.len())
    }
}
