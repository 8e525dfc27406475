//! CORS middleware configuration for cross-origin requests.
//!
//! Development (or an allow-list of `*`) accepts any origin; otherwise only
//! the configured origins are allowed. The session and rate-limit headers are
//! exposed so browser clients can read a rotated session token and their
//! remaining quota.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use nl_shared::config::{CorsConfig, Environment};

use super::session_security::SESSION_TOKEN_HEADER;

/// Creates a CORS middleware instance configured for the current environment.
pub fn create_cors(config: &CorsConfig, environment: &Environment) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(SESSION_TOKEN_HEADER),
            header::HeaderName::from_static("x-device-id"),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-ratelimit-limit"),
            header::HeaderName::from_static("x-ratelimit-remaining"),
            header::HeaderName::from_static("x-ratelimit-reset"),
            header::RETRY_AFTER,
            header::HeaderName::from_static(SESSION_TOKEN_HEADER),
        ])
        .max_age(config.max_age);

    if environment.is_development() || config.allows_any_origin() {
        log::info!("Configuring CORS to allow any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in config.allowed_origins.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            log::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    // Credentials cannot be combined with a wildcard origin
    if config.allow_credentials && !config.allows_any_origin() {
        cors = cors.supports_credentials();
    }

    cors
}
