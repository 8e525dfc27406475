//! Main authentication service implementation

use std::sync::Arc;

use nl_shared::validation::{is_valid_email, normalize_email, password_strength_issues};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::session::TerminationReason;
use crate::domain::entities::user::User;
use crate::domain::value_objects::{AuthResponse, ClientInfo};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::session::SessionManagementService;
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;
use super::rate_limiter::RateLimitStore;

const MAX_NAME_LENGTH: usize = 100;

fn failures_key(email: &str) -> String {
    format!("login_failures:{}", email)
}

fn lock_key(email: &str) -> String {
    format!("login_lock:{}", email)
}

/// Authentication service for the complete email/password flow
pub struct AuthService {
    /// User repository for database operations
    users: Arc<dyn UserRepository>,
    /// Token service for JWT and refresh token management
    tokens: Arc<TokenService>,
    /// Server-side sessions created on login
    sessions: Arc<SessionManagementService>,
    /// Failed-login counters and locks
    limiter: Arc<dyn RateLimitStore>,
    config: AuthServiceConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        sessions: Arc<SessionManagementService>,
        limiter: Arc<dyn RateLimitStore>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            sessions,
            limiter,
            config,
        }
    }

    /// Creates an account and logs it in on the calling device.
    ///
    /// # Errors
    /// * `ValidationError` - bad name, email or weak password
    /// * `AuthError::EmailAlreadyRegistered` - the email is taken
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> DomainResult<AuthResponse> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::RequiredField { field: "name".into() }.into());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "name".into(),
                min: "1".into(),
                max: format!("{} characters", MAX_NAME_LENGTH),
            }
            .into());
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        self.check_password_strength(password)?;

        let email = normalize_email(email);
        if self.users.exists_by_email(&email).await? {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let password_hash = self.hash_password(password).await?;
        let user = User::new(name.to_string(), email, password_hash);
        let user = self.users.create(user).await.map_err(|e| match e {
            DomainError::Conflict { .. } => AuthError::EmailAlreadyRegistered.into(),
            other => other,
        })?;

        info!(user_id = %user.id, "User registered");
        self.start_session(user, client).await
    }

    /// Logs in with email and password.
    ///
    /// Failed attempts are counted per email; reaching the threshold locks the
    /// email for `lock_duration_seconds`.
    pub async fn login(&self, email: &str, password: &str, client: &ClientInfo) -> DomainResult<AuthResponse> {
        let email = normalize_email(email);

        if let Some(retry_after_seconds) = self.lock_remaining(&email).await {
            warn!(ip = %client.ip_address, "Login attempt on locked account");
            return Err(AuthError::AccountLocked { retry_after_seconds }.into());
        }

        let user = self.users.find_by_email(&email).await?;
        let verified = match &user {
            Some(user) => self.verify_password(password, &user.password_hash).await?,
            None => false,
        };
        let mut user = match user {
            Some(user) if verified => user,
            _ => return Err(self.record_failure(&email, client).await),
        };

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        if let Err(e) = self.limiter.reset(&failures_key(&email)).await {
            error!("Failed to reset login failure counter: {}", e);
        }

        user.update_last_login();
        let user = self.users.update(user).await?;

        info!(user_id = %user.id, ip = %client.ip_address, "User logged in");
        self.start_session(user, client).await
    }

    async fn start_session(&self, user: User, client: &ClientInfo) -> DomainResult<AuthResponse> {
        let (session, session_token) = self.sessions.create_session(user.id, client).await?;
        let tokens = self.tokens.generate_tokens(user.id, session.id, &user.email).await?;

        Ok(AuthResponse::new(user, tokens, session.id, Some(session_token)))
    }

    async fn lock_remaining(&self, email: &str) -> Option<u64> {
        match self.limiter.lock_ttl(&lock_key(email)).await {
            Ok(ttl) => ttl,
            Err(e) => {
                error!("Failed to read login lock: {}", e);
                None
            }
        }
    }

    /// Counts a failed login and returns the error to report
    async fn record_failure(&self, email: &str, client: &ClientInfo) -> DomainError {
        let threshold = self.config.failed_login_threshold;
        let window = self.config.lock_duration_seconds;

        let decision = match self.limiter.hit(&failures_key(email), threshold, window).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("Failed to count login failure: {}", e);
                return AuthError::InvalidCredentials.into();
            }
        };

        if decision.remaining > 0 {
            return AuthError::InvalidCredentials.into();
        }

        warn!(
            ip = %client.ip_address,
            attempts = threshold,
            "Too many failed logins, locking account for {} seconds",
            window
        );
        if let Err(e) = self.limiter.lock(&lock_key(email), window).await {
            error!("Failed to lock account: {}", e);
        }
        if let Err(e) = self.limiter.reset(&failures_key(email)).await {
            error!("Failed to reset login failure counter: {}", e);
        }

        AuthError::AccountLocked {
            retry_after_seconds: window,
        }
        .into()
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The token's session must still be active and the user enabled.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let stored = self.tokens.validate_refresh_token(refresh_token).await?;
        let session_id = stored
            .session_id
            .ok_or(DomainError::Token(TokenError::InvalidRefreshToken))?;

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            self.tokens.revoke_user_tokens(user.id).await?;
            return Err(AuthError::AccountDisabled.into());
        }

        self.sessions.ensure_active(user.id, session_id).await?;

        let tokens = self.tokens.rotate_refresh_token(&stored, &user.email).await?;
        Ok(AuthResponse::new(user, tokens, session_id, None))
    }

    /// Ends the current session and blacklists its access token
    pub async fn logout(&self, user_id: Uuid, session_id: Uuid, jti: &str, exp: i64) -> DomainResult<()> {
        self.tokens.blacklist_access_token(jti, exp).await?;

        match self
            .sessions
            .terminate_session(user_id, session_id, TerminationReason::Logout)
            .await
        {
            Ok(()) | Err(DomainError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        self.tokens.revoke_session_tokens(session_id).await?;

        info!(%user_id, %session_id, "User logged out");
        Ok(())
    }

    /// Ends every session of the user; returns how many were active
    pub async fn logout_all(&self, user_id: Uuid, jti: &str, exp: i64) -> DomainResult<usize> {
        self.tokens.blacklist_access_token(jti, exp).await?;
        let count = self
            .sessions
            .terminate_all_sessions(user_id, TerminationReason::LogoutAll)
            .await?;
        self.tokens.revoke_user_tokens(user_id).await?;

        info!(%user_id, count, "User logged out everywhere");
        Ok(count)
    }

    pub async fn me(&self, user_id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }

    /// Changes the password and terminates every other session.
    ///
    /// Returns the number of sessions that were terminated.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<usize> {
        let mut user = self.me(user_id).await?;

        if !self.verify_password(current_password, &user.password_hash).await? {
            return Err(AuthError::InvalidCurrentPassword.into());
        }
        self.check_password_strength(new_password)?;

        let password_hash = self.hash_password(new_password).await?;
        user.set_password_hash(password_hash);
        self.users.update(user).await?;

        let terminated = self
            .sessions
            .terminate_other_sessions(user_id, session_id, TerminationReason::PasswordChanged)
            .await?;

        info!(%user_id, terminated, "Password changed");
        Ok(terminated)
    }

    fn check_password_strength(&self, password: &str) -> DomainResult<()> {
        let issues = password_strength_issues(password, self.config.password.min_length);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::WeakPassword {
                issues: issues.join(", "),
            }
            .into())
        }
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.config.password.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|_| AuthError::PasswordHashingFailed.into())
    }

    async fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?;

        // A malformed stored hash never matches
        Ok(verified.unwrap_or(false))
    }
}
