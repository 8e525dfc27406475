//! Application state and factory
//!
//! This module handles the initialization of the application state
//! and provides the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Condition, Logger},
    web, App, HttpResponse,
};

use nl_core::repositories::{
    FoodLogRepository, FoodRepository, HealthMetricRepository, InMemoryFoodLogRepository, InMemoryFoodRepository,
    InMemoryHealthMetricRepository, InMemoryProfileRepository, InMemorySessionRepository, InMemoryTokenRepository,
    InMemoryUserRepository, ProfileRepository, SessionRepository, TokenRepository, UserRepository,
};
use nl_core::services::{
    AuthService, AuthServiceConfig, FoodLogService, FoodService, HealthMetricService, ProfileService,
    RateLimitStore, SessionManagementService, TokenService, TokenServiceConfig,
};
use nl_shared::config::AppConfig;
use nl_shared::errors::error_codes;

use crate::handlers::ApiError;
use crate::middleware::{create_cors, RateLimiter, SecurityHeaders, TrustedProxies};
use crate::routes;

/// Storage backends for every repository the services need
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub metrics: Arc<dyn HealthMetricRepository>,
    pub foods: Arc<dyn FoodRepository>,
    pub food_logs: Arc<dyn FoodLogRepository>,
}

impl Repositories {
    /// Process-local storage, used by tests and local experiments
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryTokenRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            profiles: Arc::new(InMemoryProfileRepository::new()),
            metrics: Arc::new(InMemoryHealthMetricRepository::new()),
            foods: Arc::new(InMemoryFoodRepository::new()),
            food_logs: Arc::new(InMemoryFoodLogRepository::new()),
        }
    }
}

/// Application state shared by all workers
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub sessions: Arc<SessionManagementService>,
    pub profiles: Arc<ProfileService>,
    pub metrics: Arc<HealthMetricService>,
    pub foods: Arc<FoodService>,
    pub food_logs: Arc<FoodLogService>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// Peers whose forwarding headers identify the client
    pub trusted_proxies: TrustedProxies,
}

impl AppState {
    /// Wire the services on top of the given storage
    pub fn new(repos: Repositories, rate_limiter: Arc<dyn RateLimitStore>, config: &AppConfig) -> Self {
        let tokens = Arc::new(TokenService::new(
            repos.tokens.clone(),
            TokenServiceConfig::from(&config.auth.jwt),
        ));
        let sessions = Arc::new(SessionManagementService::new(
            repos.sessions.clone(),
            tokens.clone(),
            config.auth.session.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            repos.users.clone(),
            tokens.clone(),
            sessions.clone(),
            rate_limiter.clone(),
            AuthServiceConfig::from_config(&config.auth, &config.rate_limit),
        ));
        let profiles = Arc::new(ProfileService::new(repos.profiles.clone(), repos.metrics.clone()));
        let metrics = Arc::new(HealthMetricService::new(repos.metrics.clone()));
        let foods = Arc::new(FoodService::new(repos.foods.clone()));
        let food_logs = Arc::new(FoodLogService::new(
            repos.food_logs.clone(),
            repos.foods.clone(),
            profiles.clone(),
        ));

        Self {
            auth,
            tokens,
            sessions,
            profiles,
            metrics,
            foods,
            food_logs,
            rate_limiter,
            trusted_proxies: TrustedProxies::parse(config.server.trusted_proxies.as_slice()),
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let rate_limiter = RateLimiter::new(
        state.rate_limiter.clone(),
        config.rate_limit.clone(),
        state.trusted_proxies.clone(),
    );
    let security = SecurityHeaders::new(config.environment, state.trusted_proxies.clone());
    let cors = create_cors(&config.cors, &config.environment);

    let json_config = web::JsonConfig::default()
        .limit(config.server.max_payload_size)
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into());
    let query_config =
        web::QueryConfig::default().error_handler(|err, _req| ApiError::bad_request(err.to_string()).into());
    let path_config =
        web::PathConfig::default().error_handler(|err, _req| ApiError::bad_request(err.to_string()).into());

    App::new()
        .app_data(state)
        .app_data(json_config)
        .app_data(query_config)
        .app_data(path_config)
        // Middleware runs bottom-up: logging, CORS, security headers, rate limiting
        .wrap(rate_limiter)
        .wrap(security)
        .wrap(cors)
        .wrap(Condition::new(config.logging.access_log, Logger::default()))
        .route("/health", web::get().to(health_check))
        .service(web::scope("/api/v1").configure(routes::configure))
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::new(
        actix_web::http::StatusCode::NOT_FOUND,
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
