//! Shared error response structure and error codes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, retry hints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response with details
    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned in `ErrorResponse::error`
pub mod error_codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const HTTPS_REQUIRED: &str = "https_required";
    pub const INVALID_ORIGIN: &str = "invalid_origin";

    pub const RATE_LIMIT_EXCEEDED: &str = "rate_limit_exceeded";
    pub const ACCOUNT_LOCKED: &str = "account_locked";
    pub const ACCOUNT_DISABLED: &str = "account_disabled";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const EMAIL_TAKEN: &str = "email_taken";
    pub const INVALID_CURRENT_PASSWORD: &str = "invalid_current_password";

    pub const TOKEN_MISSING: &str = "token_missing";
    pub const TOKEN_EXPIRED: &str = "token_expired";
    pub const TOKEN_INVALID: &str = "token_invalid";
    pub const TOKEN_REVOKED: &str = "token_revoked";

    pub const SESSION_REQUIRED: &str = "session_required";
    pub const SESSION_INVALID: &str = "session_invalid";
    pub const SESSION_EXPIRED: &str = "session_expired";
    pub const SESSION_TERMINATED: &str = "session_terminated";
    pub const SESSION_ANOMALY: &str = "session_anomaly";
    pub const SESSION_LIMIT_REACHED: &str = "session_limit_reached";

    pub const INSUFFICIENT_PROFILE_DATA: &str = "insufficient_profile_data";
}
