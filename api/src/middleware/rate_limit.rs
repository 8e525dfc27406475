//! Rate limiting middleware for API endpoints
//!
//! Counts requests per client IP in fixed one-minute windows using the shared
//! [`RateLimitStore`] (Redis in production). Login and registration get their
//! own, stricter bucket. Store failures let the request through.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        Method,
    },
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use nl_core::services::auth::{RateLimitDecision, RateLimitStore};
use nl_shared::config::RateLimitConfig;
use nl_shared::errors::error_codes;

use super::client::{client_ip, TrustedProxies};
use crate::handlers::ApiError;

const WINDOW_SECONDS: u64 = 60;

const AUTH_PATHS: [&str; 2] = ["/api/v1/auth/login", "/api/v1/auth/register"];

/// Rate limiter middleware factory
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
    trusted_proxies: TrustedProxies,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig, trusted_proxies: TrustedProxies) -> Self {
        Self {
            store,
            config,
            trusted_proxies,
        }
    }
}

/// Which counter a request is charged to
fn bucket_for(path: &str, config: &RateLimitConfig) -> Option<(&'static str, u32)> {
    if AUTH_PATHS.contains(&path.trim_end_matches('/')) {
        Some(("auth", config.auth.per_ip_per_minute))
    } else if path.starts_with("/api/") {
        Some(("api", config.api.per_ip_per_minute))
    } else {
        None
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
            config: self.config.clone(),
            trusted_proxies: self.trusted_proxies.clone(),
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
    trusted_proxies: TrustedProxies,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
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
        let store = self.store.clone();
        let enabled = self.config.enabled;
        let bucket = bucket_for(req.path(), &self.config);
        let trusted_proxies = self.trusted_proxies.clone();

        Box::pin(async move {
            let (bucket, limit) = match bucket {
                Some(bucket) if enabled && req.method() != Method::OPTIONS => bucket,
                _ => return service.call(req).await.map(ServiceResponse::map_into_left_body),
            };

            let ip = client_ip(req.headers(), req.peer_addr().map(|addr| addr.ip()), &trusted_proxies);
            let key = format!("{}:{}", bucket, ip);

            let decision = match store.hit(&key, limit, WINDOW_SECONDS).await {
                Ok(decision) => decision,
                Err(e) => {
                    log::warn!("Rate limit store unavailable, allowing request: {}", e);
                    return service.call(req).await.map(ServiceResponse::map_into_left_body);
                }
            };

            if !decision.allowed {
                log::warn!(
                    "Rate limit exceeded for {} on {} {} ({} per minute)",
                    ip,
                    req.method(),
                    req.path(),
                    limit
                );
                let error = ApiError::too_many_requests(
                    error_codes::RATE_LIMIT_EXCEEDED,
                    "Too many requests, please slow down",
                    decision.reset_after_seconds,
                )
                .with_detail("limit", decision.limit)
                .with_header("x-ratelimit-limit", decision.limit)
                .with_header("x-ratelimit-remaining", decision.remaining)
                .with_header("x-ratelimit-reset", decision.reset_after_seconds);
                return Ok(req.error_response(error).map_into_right_body());
            }

            let mut response = service.call(req).await?.map_into_left_body();
            insert_rate_limit_headers(response.headers_mut(), &decision);
            Ok(response)
        })
    }
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let values = [
        ("x-ratelimit-limit", u64::from(decision.limit)),
        ("x-ratelimit-remaining", u64::from(decision.remaining)),
        ("x-ratelimit-reset", decision.reset_after_seconds),
    ];
    for (name, value) in values {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}
