//! Session security middleware.
//!
//! Runs inside [`JwtAuth`](super::auth::JwtAuth): the access token names the
//! server-side session (`sid`) and the client proves possession of it with the
//! opaque `X-Session-Token` header. Each request is checked for expiry, idle
//! timeout, token reuse and IP/device anomalies; when the token is rotated the
//! replacement is returned in the `X-Session-Token` response header.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

use nl_core::services::session::{SessionAnomaly, SessionValidation};
use nl_shared::errors::error_codes;

use super::auth::AuthContext;
use super::client::client_info_from_service_request;
use crate::app::AppState;
use crate::handlers::ApiError;

pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Validated session of the current request
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user_id: Uuid,
    /// Anomalies flagged but tolerated on this request
    pub anomalies: Vec<SessionAnomaly>,
}

/// Session security middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSecurity;

impl SessionSecurity {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionSecurity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionSecurityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionSecurityMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionSecurityMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionSecurityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let validation = match validate(&req).await {
                Ok(validation) => validation,
                Err(error) => return Ok(req.error_response(error).map_into_right_body()),
            };

            req.extensions_mut().insert(SessionContext {
                session_id: validation.session.id,
                user_id: validation.session.user_id,
                anomalies: validation.anomalies,
            });

            let mut response = service.call(req).await?.map_into_left_body();

            if let Some(rotated) = validation.rotated_token {
                if let Ok(value) = HeaderValue::from_str(&rotated) {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(SESSION_TOKEN_HEADER), value);
                }
            }

            Ok(response)
        })
    }
}

/// Checks the session named by the access token against the presented session token
async fn validate(req: &ServiceRequest) -> Result<SessionValidation, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized(error_codes::UNAUTHORIZED, "Authentication required"))?;

    let raw_token = extract_session_token(req)
        .ok_or_else(|| ApiError::unauthorized(error_codes::SESSION_REQUIRED, "Missing X-Session-Token header"))?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("AppState is not registered"))?;

    let client = client_info_from_service_request(req, &state.trusted_proxies);
    let validation = state.sessions.validate_session(auth.session_id, &raw_token, &client).await?;

    if validation.session.user_id != auth.user_id {
        log::warn!(
            "Access token of user {} presented for session {} of another user",
            auth.user_id,
            validation.session.id
        );
        return Err(ApiError::unauthorized(error_codes::SESSION_INVALID, "Invalid session"));
    }

    for anomaly in &validation.anomalies {
        log::warn!(
            "Session {} of user {} flagged: {:?}",
            validation.session.id,
            auth.user_id,
            anomaly
        );
    }

    Ok(validation)
}

fn extract_session_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(SESSION_TOKEN_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(error_codes::SESSION_REQUIRED, "Session required").into());

        ready(result)
    }
}
