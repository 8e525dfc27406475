//! Security middleware for enforcing HTTPS and adding security headers.
//!
//! - HTTPS enforcement in production (honouring `X-Forwarded-Proto` only from
//!   trusted proxies)
//! - Rejection of malformed `Origin` headers
//! - Defensive response headers on every response, HSTS in production

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        StatusCode,
    },
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use nl_shared::config::Environment;
use nl_shared::errors::error_codes;

use super::client::TrustedProxies;
use crate::handlers::ApiError;

/// Security middleware factory
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    /// Reject plain-HTTP requests
    enforce_https: bool,
    /// Send `Strict-Transport-Security`
    hsts: bool,
    /// Peers allowed to assert `X-Forwarded-Proto`
    trusted_proxies: TrustedProxies,
}

impl SecurityHeaders {
    pub fn new(environment: Environment, trusted_proxies: TrustedProxies) -> Self {
        let production = environment.is_production();
        log::info!(
            "Security middleware configured: enforce_https={}, trusted_proxies={}",
            production,
            trusted_proxies.len()
        );

        Self {
            enforce_https: production,
            hsts: production,
            trusted_proxies,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
            enforce_https: self.enforce_https,
            hsts: self.hsts,
            trusted_proxies: self.trusted_proxies.clone(),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
    enforce_https: bool,
    hsts: bool,
    trusted_proxies: TrustedProxies,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
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
        let enforce_https = self.enforce_https;
        let hsts = self.hsts;
        let trusted_proxies = self.trusted_proxies.clone();

        Box::pin(async move {
            let mut response = match check_request(&req, enforce_https, &trusted_proxies) {
                Ok(()) => service.call(req).await?.map_into_left_body(),
                Err(error) => req.error_response(error).map_into_right_body(),
            };
            add_security_response_headers(response.headers_mut(), hsts);

            Ok(response)
        })
    }
}

fn check_request(req: &ServiceRequest, enforce_https: bool, trusted_proxies: &TrustedProxies) -> Result<(), ApiError> {
    if enforce_https && !is_secure_request(req, trusted_proxies) {
        log::warn!("Insecure request blocked: {} {}", req.method(), req.path());
        return Err(ApiError::forbidden(error_codes::HTTPS_REQUIRED, "HTTPS required"));
    }

    if let Some(origin) = req.headers().get(header::ORIGIN) {
        if !is_valid_origin(origin) {
            log::warn!("Invalid origin blocked: {:?} for {} {}", origin, req.method(), req.path());
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_ORIGIN,
                "Invalid request origin",
            ));
        }
    }

    Ok(())
}

/// Checks if the request is secure (TLS, or forwarded as HTTPS by a trusted proxy)
fn is_secure_request(req: &ServiceRequest, trusted_proxies: &TrustedProxies) -> bool {
    // `connection_info()` honours X-Forwarded-Proto from anyone, so look at the socket instead
    if req.app_config().secure() {
        return true;
    }

    let peer = req.peer_addr().map(|addr| addr.ip());
    // Local health checks and sidecars
    if peer.map_or(false, |ip| ip.is_loopback()) {
        return true;
    }

    req.headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |proto| {
            proto.eq_ignore_ascii_case("https") && peer.map_or(false, |ip| trusted_proxies.contains(ip))
        })
}

/// Origins must at least look like `scheme://host`; CORS decides if they are allowed
fn is_valid_origin(origin: &HeaderValue) -> bool {
    match origin.to_str() {
        Ok("null") => true,
        Ok(origin) => match origin.split_once("://") {
            Some((scheme, host)) => {
                !scheme.is_empty()
                    && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
                    && !host.is_empty()
            }
            None => false,
        },
        Err(_) => false,
    }
}

fn add_security_response_headers(headers: &mut HeaderMap, hsts: bool) {
    if hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    let static_headers: [(HeaderName, &'static str); 6] = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_XSS_PROTECTION, "1; mode=block"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        (header::CONTENT_SECURITY_POLICY, "default-src 'none'; frame-ancestors 'none';"),
        (
            HeaderName::from_static("permissions-policy"),
            "accelerometer=(), camera=(), geolocation=(), gyroscope=(), magnetometer=(), microphone=(), payment=(), usb=()",
        ),
    ];

    for (name, value) in static_headers {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_validation() {
        assert!(is_valid_origin(&HeaderValue::from_static("https://app.nutrilog.io")));
        assert!(is_valid_origin(&HeaderValue::from_static("capacitor://localhost")));
        assert!(is_valid_origin(&HeaderValue::from_static("null")));
        assert!(!is_valid_origin(&HeaderValue::from_static("app.nutrilog.io")));
        assert!(!is_valid_origin(&HeaderValue::from_static("https://")));
    }

    #[test]
    fn test_hsts_only_when_enabled() {
        let mut headers = HeaderMap::new();
        add_security_response_headers(&mut headers, false);
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");

        add_security_response_headers(&mut headers, true);
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_some());
    }
}
