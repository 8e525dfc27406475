//! Conversion of domain and request errors into JSON HTTP responses
//!
//! Every error leaves the API as an [`ErrorResponse`] body. Domain errors are
//! mapped to status codes here so handlers and middleware can simply use `?`.

use std::collections::HashMap;

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde_json::{json, Value};
use thiserror::Error;

use nl_core::errors::{AuthError, DomainError, SessionError, TokenError, ValidationError};
use nl_shared::errors::{error_codes, ErrorResponse};

/// Error returned by handlers and middleware
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: HashMap<String, Value>,
    retry_after: Option<u64>,
    headers: Vec<(&'static str, String)>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: HashMap::new(),
            retry_after: None,
            headers: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST, message)
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error_codes::VALIDATION_ERROR, message)
    }

    pub fn too_many_requests(code: &'static str, message: impl Into<String>, retry_after: u64) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, code, message)
            .with_detail("retry_after_seconds", retry_after)
            .with_retry_after(retry_after)
    }

    /// Generic 500; the cause is logged, never returned
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        log::error!("Internal error: {}", cause);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "An internal error occurred",
        )
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn with_header(mut self, name: &'static str, value: impl ToString) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    fn body(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.code, self.message.clone());
        if self.details.is_empty() {
            response
        } else {
            ErrorResponse::with_details(self.code, self.message.clone(), self.details.clone())
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status).json(self.body());
        let headers = response.headers_mut();

        if let Some(seconds) = self.retry_after {
            if let Ok(value) = header::HeaderValue::from_str(&seconds.to_string()) {
                headers.insert(header::RETRY_AFTER, value);
            }
        }
        for (name, value) in &self.headers {
            if let Ok(value) = header::HeaderValue::from_str(value) {
                headers.insert(header::HeaderName::from_static(name), value);
            }
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation { message } => ApiError::validation(message),
            DomainError::NotFound { resource } => ApiError::not_found(format!("{} not found", resource)),
            DomainError::Forbidden { message } => ApiError::forbidden(error_codes::FORBIDDEN, message),
            DomainError::Conflict { message } => ApiError::new(StatusCode::CONFLICT, error_codes::CONFLICT, message),
            DomainError::Unauthorized => ApiError::unauthorized(error_codes::UNAUTHORIZED, "Authentication required"),
            DomainError::Internal { message } => ApiError::internal(message),
            DomainError::Auth(e) => from_auth_error(e),
            DomainError::Token(e) => from_token_error(e),
            DomainError::Session(e) => from_session_error(e),
            DomainError::ValidationErr(e) => from_validation_error(e),
        }
    }
}

fn from_auth_error(error: AuthError) -> ApiError {
    let message = error.to_string();
    match error {
        AuthError::InvalidCredentials => ApiError::unauthorized(error_codes::INVALID_CREDENTIALS, message),
        AuthError::EmailAlreadyRegistered => {
            ApiError::new(StatusCode::CONFLICT, error_codes::EMAIL_TAKEN, message).with_detail("field", "email")
        }
        AuthError::AccountLocked { retry_after_seconds } => {
            ApiError::too_many_requests(error_codes::ACCOUNT_LOCKED, message, retry_after_seconds)
        }
        AuthError::AccountDisabled => ApiError::forbidden(error_codes::ACCOUNT_DISABLED, message),
        AuthError::UserNotFound => ApiError::not_found(message),
        AuthError::InvalidCurrentPassword => ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            error_codes::INVALID_CURRENT_PASSWORD,
            message,
        )
        .with_detail("field", "current_password"),
        AuthError::PasswordHashingFailed => ApiError::internal(message),
    }
}

fn from_token_error(error: TokenError) -> ApiError {
    let message = error.to_string();
    match error {
        TokenError::TokenExpired | TokenError::RefreshTokenExpired => {
            ApiError::unauthorized(error_codes::TOKEN_EXPIRED, message)
        }
        TokenError::TokenRevoked => ApiError::unauthorized(error_codes::TOKEN_REVOKED, message),
        TokenError::TokenGenerationFailed => ApiError::internal(message),
        TokenError::InvalidTokenFormat
        | TokenError::InvalidSignature
        | TokenError::TokenNotYetValid
        | TokenError::InvalidClaims
        | TokenError::InvalidRefreshToken => ApiError::unauthorized(error_codes::TOKEN_INVALID, message),
    }
}

fn from_session_error(error: SessionError) -> ApiError {
    let message = error.to_string();
    match error {
        SessionError::NotFound | SessionError::InvalidToken | SessionError::TokenReused => {
            ApiError::unauthorized(error_codes::SESSION_INVALID, message)
        }
        SessionError::Terminated => ApiError::unauthorized(error_codes::SESSION_TERMINATED, message),
        SessionError::Expired => ApiError::unauthorized(error_codes::SESSION_EXPIRED, message),
        SessionError::IpMismatch => {
            ApiError::forbidden(error_codes::SESSION_ANOMALY, message).with_detail("anomaly", "ip_changed")
        }
        SessionError::DeviceMismatch => {
            ApiError::forbidden(error_codes::SESSION_ANOMALY, message).with_detail("anomaly", "device_changed")
        }
        SessionError::ConcurrentLimitReached { max } => {
            ApiError::new(StatusCode::CONFLICT, error_codes::SESSION_LIMIT_REACHED, message)
                .with_detail("max_sessions", max)
        }
    }
}

fn from_validation_error(error: ValidationError) -> ApiError {
    let message = error.to_string();
    match &error {
        ValidationError::InsufficientProfileData { missing } => ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            error_codes::INSUFFICIENT_PROFILE_DATA,
            message.clone(),
        )
        .with_detail("missing", missing.clone()),
        _ => {
            let api_error = ApiError::validation(message);
            match error.field() {
                Some(field) => api_error.with_detail("field", field),
                None => api_error,
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: HashMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        log::debug!("Request validation failed: {:?}", fields);
        ApiError::validation("Request validation failed").with_detail("fields", json!(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: ApiError) -> Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(DomainError, StatusCode, &str)> = vec![
            (DomainError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            (DomainError::not_found("Food"), StatusCode::NOT_FOUND, "not_found"),
            (AuthError::EmailAlreadyRegistered.into(), StatusCode::CONFLICT, "email_taken"),
            (AuthError::AccountDisabled.into(), StatusCode::FORBIDDEN, "account_disabled"),
            (TokenError::TokenExpired.into(), StatusCode::UNAUTHORIZED, "token_expired"),
            (SessionError::Expired.into(), StatusCode::UNAUTHORIZED, "session_expired"),
            (SessionError::DeviceMismatch.into(), StatusCode::FORBIDDEN, "session_anomaly"),
            (
                SessionError::ConcurrentLimitReached { max: 3 }.into(),
                StatusCode::CONFLICT,
                "session_limit_reached",
            ),
        ];

        for (domain, status, code) in cases {
            let api: ApiError = domain.into();
            assert_eq!(api.status_code(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[actix_web::test]
    async fn test_account_locked_sets_retry_after() {
        let api: ApiError = DomainError::from(AuthError::AccountLocked { retry_after_seconds: 120 }).into();
        let response = api.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "120");
    }

    #[actix_web::test]
    async fn test_internal_message_is_hidden() {
        let api: ApiError = DomainError::internal("connection refused on 10.0.0.5").into();
        let body = body_json(api).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[actix_web::test]
    async fn test_validation_error_carries_field() {
        let api: ApiError = DomainError::from(ValidationError::InvalidEmail).into();
        let body = body_json(api).await;
        assert_eq!(body["details"]["field"], "email");
    }
}
