//! Error types for authentication, tokens, sessions and input validation

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address is already registered")]
    EmailAlreadyRegistered,

    #[error("Too many failed login attempts, try again in {retry_after_seconds} seconds")]
    AccountLocked { retry_after_seconds: u64 },

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    #[error("Password hashing failed")]
    PasswordHashingFailed,
}

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Session security errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session has been terminated")]
    Terminated,

    #[error("Session expired")]
    Expired,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session token was reused after rotation")]
    TokenReused,

    #[error("Session used from a different IP address")]
    IpMismatch,

    #[error("Session used from a different device")]
    DeviceMismatch,

    #[error("Maximum of {max} concurrent sessions reached")]
    ConcurrentLimitReached { max: u32 },
}

/// Input validation errors raised by services
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field} is required")]
    RequiredField { field: String },

    #[error("{field} has an invalid format")]
    InvalidFormat { field: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password {issues}")]
    WeakPassword { issues: String },

    #[error("Invalid date: {reason}")]
    InvalidDate { reason: String },

    #[error("Not enough profile data: {missing}")]
    InsufficientProfileData { missing: String },
}

impl ValidationError {
    /// Field the error refers to, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field }
            | ValidationError::OutOfRange { field, .. } => Some(field),
            ValidationError::InvalidEmail => Some("email"),
            ValidationError::WeakPassword { .. } => Some("password"),
            _ => None,
        }
    }
}
