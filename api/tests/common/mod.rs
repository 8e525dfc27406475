//! Shared fixtures for the HTTP integration tests: an in-memory app and
//! helpers to register users and make authenticated requests.

#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    test, web, Error,
};
use serde_json::{json, Value};

use nl_api::{create_app, AppState, Repositories};
use nl_core::services::{InMemoryRateLimitStore, RateLimitStore};
use nl_shared::config::{AppConfig, RateLimitConfig};

pub const PASSWORD: &str = "Secret123";
pub const USER_AGENT: &str = "NutriLog-iOS/2.1 (iPhone; iOS 17.2)";
pub const CLIENT_IP: &str = "203.0.113.10";
/// Reverse proxy in front of the app; its `X-Forwarded-For` is believed
pub const PROXY_IP: &str = "10.0.0.1";

pub fn proxy_addr() -> std::net::SocketAddr {
    std::net::SocketAddr::new(PROXY_IP.parse().unwrap(), 443)
}

/// Development config with fast hashing, rate limiting off and one trusted proxy
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.trusted_proxies = vec![PROXY_IP.to_string()];
    config.auth.password.bcrypt_cost = 4;
    config.rate_limit = RateLimitConfig::disabled();
    config.logging.access_log = false;
    config
}

pub async fn init_app(
    config: AppConfig,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    init_app_with_store(config, Arc::new(InMemoryRateLimitStore::new())).await
}

pub async fn init_app_with_store(
    config: AppConfig,
    store: Arc<dyn RateLimitStore>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let state = web::Data::new(AppState::new(Repositories::in_memory(), store, &config));
    test::init_service(create_app(state, &config)).await
}

/// Credentials of a logged-in client
#[derive(Debug, Clone)]
pub struct TestSession {
    pub user_id: String,
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub session_token: String,
}

impl TestSession {
    pub fn from_auth_response(body: &Value) -> Self {
        Self {
            user_id: body["user"]["id"].as_str().unwrap().to_string(),
            session_id: body["session_id"].as_str().unwrap().to_string(),
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
            session_token: body["session_token"].as_str().unwrap().to_string(),
        }
    }

    /// Request carrying the bearer token, session token and the default client headers
    pub fn request(&self, request: test::TestRequest) -> test::TestRequest {
        request
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", self.access_token)))
            .insert_header(("X-Session-Token", self.session_token.clone()))
            .insert_header((header::USER_AGENT, USER_AGENT))
            .insert_header(("X-Forwarded-For", CLIENT_IP))
            .peer_addr(proxy_addr())
    }
}

pub fn client_request(request: test::TestRequest) -> test::TestRequest {
    request
        .insert_header((header::USER_AGENT, USER_AGENT))
        .insert_header(("X-Forwarded-For", CLIENT_IP))
        .peer_addr(proxy_addr())
}

pub async fn register<S, B>(app: &S, email: &str) -> TestSession
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = client_request(test::TestRequest::post().uri("/api/v1/auth/register"))
        .set_json(json!({
            "name": "Test User",
            "email": email,
            "password": PASSWORD,
            "password_confirmation": PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);

    let body: Value = test::read_body_json(resp).await;
    TestSession::from_auth_response(&body)
}

pub async fn login<S, B>(app: &S, email: &str) -> TestSession
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = client_request(test::TestRequest::post().uri("/api/v1/auth/login"))
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);

    let body: Value = test::read_body_json(resp).await;
    TestSession::from_auth_response(&body)
}
