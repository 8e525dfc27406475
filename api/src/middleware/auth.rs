//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the access token from the Authorization header,
//! verifies it with the core [`TokenService`] (signature, issuer, audience,
//! expiry and blacklist) and injects an [`AuthContext`] into the request.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use nl_core::{
    domain::entities::token::Claims,
    errors::{DomainError, TokenError},
};
use nl_shared::errors::error_codes;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::handlers::ApiError;

/// User authentication context injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID extracted from JWT claims
    pub user_id: Uuid,
    /// Server-side session the token was issued for
    pub session_id: Uuid,
    pub email: String,
    /// JWT ID, blacklisted on logout
    pub jti: String,
    /// Expiry of the access token (unix seconds)
    pub expires_at: i64,
}

impl AuthContext {
    /// Creates a new authentication context from JWT claims
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        let session_id = claims
            .session_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;

        Ok(Self {
            user_id,
            session_id,
            email: claims.email,
            jti: claims.jti,
            expires_at: claims.exp,
        })
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
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
            match authenticate(&req).await {
                Ok(auth_context) => {
                    req.extensions_mut().insert(auth_context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(error) => Ok(req.error_response(error).map_into_right_body()),
            }
        })
    }
}

/// Verifies the bearer token of the request
async fn authenticate(req: &ServiceRequest) -> Result<AuthContext, ApiError> {
    let token = extract_bearer_token(req).ok_or_else(|| {
        ApiError::unauthorized(error_codes::TOKEN_MISSING, "Missing or invalid Authorization header")
    })?;

    let tokens = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.tokens.clone())
        .ok_or_else(|| ApiError::internal("AppState is not registered"))?;

    let claims = tokens.verify_access_token(&token).await?;
    Ok(AuthContext::from_claims(claims)?)
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|s| s.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(error_codes::UNAUTHORIZED, "Authentication required").into());

        ready(result)
    }
}
