//! Main token service implementation

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;

const REFRESH_TOKEN_LENGTH: usize = 48;

/// Hashes a token for secure storage
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Random alphanumeric string suitable for opaque tokens
pub fn generate_random_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Service for managing JWT access tokens and refresh tokens
pub struct TokenService {
    repository: Arc<dyn TokenRepository>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    pub fn new(repository: Arc<dyn TokenRepository>, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Generates a new token pair starting a new token family
    pub async fn generate_tokens(&self, user_id: Uuid, session_id: Uuid, email: &str) -> DomainResult<TokenPair> {
        let token_family = Uuid::new_v4().to_string();
        let access_token = self.generate_access_token(user_id, session_id, email)?;
        let refresh_token = self
            .generate_refresh_token(user_id, Some(session_id), token_family)
            .await?;

        Ok(self.token_pair(access_token, refresh_token))
    }

    fn generate_access_token(&self, user_id: Uuid, session_id: Uuid, email: &str) -> DomainResult<String> {
        let claims = Claims::new_access_token(
            user_id,
            session_id,
            email,
            &self.config.issuer,
            &self.config.audience,
            self.config.access_token_expiry_seconds,
        );
        self.encode_jwt(&claims)
    }

    /// Generates a refresh token and stores its hash
    async fn generate_refresh_token(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
        token_family: String,
    ) -> DomainResult<String> {
        let token_string = generate_random_token(REFRESH_TOKEN_LENGTH);
        let refresh_token = RefreshToken::new(
            user_id,
            session_id,
            hash_token(&token_string),
            token_family,
            self.config.refresh_token_expiry_seconds,
        );

        self.repository
            .save_refresh_token(refresh_token)
            .await
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok(token_string)
    }

    fn token_pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.config.access_token_expiry_seconds,
            refresh_expires_in: self.config.refresh_token_expiry_seconds,
        }
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Returns
    /// * `Err(TokenError::TokenExpired)` - `exp` is in the past
    /// * `Err(TokenError::TokenRevoked)` - the token was blacklisted by a logout
    /// * `Err(TokenError::InvalidTokenFormat)` - anything else
    pub async fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => DomainError::Token(TokenError::TokenExpired),
            ErrorKind::ImmatureSignature => DomainError::Token(TokenError::TokenNotYetValid),
            ErrorKind::InvalidSignature => DomainError::Token(TokenError::InvalidSignature),
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => DomainError::Token(TokenError::InvalidClaims),
            _ => DomainError::Token(TokenError::InvalidTokenFormat),
        })?;

        if self.repository.is_token_blacklisted(&token_data.claims.jti).await? {
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        Ok(token_data.claims)
    }

    /// Looks up a refresh token and checks it can be used.
    ///
    /// Presenting a revoked token means the chain leaked: the whole family is
    /// revoked before the error is returned.
    pub async fn validate_refresh_token(&self, token: &str) -> DomainResult<RefreshToken> {
        let stored = self
            .repository
            .find_refresh_token(&hash_token(token))
            .await?
            .ok_or(DomainError::Token(TokenError::InvalidRefreshToken))?;

        if stored.is_revoked {
            let revoked = self.repository.revoke_token_family(&stored.token_family).await?;
            warn!(
                user_id = %stored.user_id,
                family = %stored.token_family,
                revoked,
                "Revoked refresh token reused; token family revoked"
            );
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        if stored.is_expired() {
            return Err(DomainError::Token(TokenError::RefreshTokenExpired));
        }

        Ok(stored)
    }

    /// Issues a new pair in the same family as `old` and revokes `old`
    pub async fn rotate_refresh_token(&self, old: &RefreshToken, email: &str) -> DomainResult<TokenPair> {
        let session_id = old
            .session_id
            .ok_or(DomainError::Token(TokenError::InvalidRefreshToken))?;

        if !self.repository.revoke_token(&old.token_hash).await? {
            // Lost a race with another refresh using the same token
            self.repository.revoke_token_family(&old.token_family).await?;
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        let access_token = self.generate_access_token(old.user_id, session_id, email)?;
        let refresh_token = self
            .generate_refresh_token(old.user_id, Some(session_id), old.token_family.clone())
            .await?;

        Ok(self.token_pair(access_token, refresh_token))
    }

    /// Revokes all refresh tokens for a user
    pub async fn revoke_user_tokens(&self, user_id: Uuid) -> DomainResult<usize> {
        self.repository.revoke_all_user_tokens(user_id).await
    }

    /// Revokes the refresh tokens bound to a session
    pub async fn revoke_session_tokens(&self, session_id: Uuid) -> DomainResult<usize> {
        self.repository.revoke_session_tokens(session_id).await
    }

    /// Blacklists an access token by its JWT ID until its expiry
    pub async fn blacklist_access_token(&self, jti: &str, exp: i64) -> DomainResult<()> {
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| DomainError::internal("Invalid expiry timestamp"))?;

        self.repository.blacklist_token(jti, expires_at).await
    }

    /// Removes refresh tokens that expired more than `grace_period_days` ago
    pub async fn cleanup_expired_tokens(&self, grace_period_days: i64) -> DomainResult<usize> {
        self.repository
            .delete_expired_tokens(Utc::now() - Duration::days(grace_period_days))
            .await
    }

    /// Removes blacklist entries for tokens that have expired anyway
    pub async fn cleanup_blacklist(&self) -> DomainResult<usize> {
        self.repository.cleanup_blacklist().await
    }
}
