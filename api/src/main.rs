use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use nl_api::{create_app, AppState, Repositories};
use nl_core::services::{
    InMemoryRateLimitStore, RateLimitStore, SessionCleanupService, TokenCleanupConfig, TokenCleanupService,
};
use nl_infra::database::{
    MySqlFoodLogRepository, MySqlFoodRepository, MySqlHealthMetricRepository, MySqlProfileRepository,
    MySqlSessionRepository, MySqlTokenRepository, MySqlUserRepository,
};
use nl_infra::{DatabasePool, RedisClient, RedisRateLimitStore};
use nl_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(config.logging.level.as_str()))
        .format_timestamp(config.logging.timestamp.then_some(env_logger::TimestampPrecision::Millis))
        .init();

    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("Invalid configuration: {}", reason))?;

    info!(
        "Starting NutriLog API Server v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let database = DatabasePool::connect_and_migrate(config.database.clone())
        .await
        .context("failed to connect to MySQL")?;
    let pool = database.get_pool().clone();

    let repos = Repositories {
        users: Arc::new(MySqlUserRepository::new(pool.clone())),
        tokens: Arc::new(MySqlTokenRepository::new(pool.clone())),
        sessions: Arc::new(MySqlSessionRepository::new(pool.clone())),
        profiles: Arc::new(MySqlProfileRepository::new(pool.clone())),
        metrics: Arc::new(MySqlHealthMetricRepository::new(pool.clone())),
        foods: Arc::new(MySqlFoodRepository::new(pool.clone())),
        food_logs: Arc::new(MySqlFoodLogRepository::new(pool)),
    };

    let rate_limiter: Arc<dyn RateLimitStore> = match RedisClient::new(config.cache.clone()).await {
        Ok(client) => Arc::new(RedisRateLimitStore::new(Arc::new(client))),
        Err(e) => {
            warn!(
                "Redis unavailable ({}); rate limits and lockouts fall back to process memory",
                e
            );
            Arc::new(InMemoryRateLimitStore::new())
        }
    };

    let state = AppState::new(repos.clone(), rate_limiter, &config);

    let session_config = config.auth.session.clone();
    Arc::new(SessionCleanupService::new(repos.sessions.clone(), session_config.clone())).start_background_task();
    Arc::new(TokenCleanupService::new(
        state.tokens.clone(),
        TokenCleanupConfig {
            interval_seconds: session_config.cleanup_interval_seconds,
            enabled: session_config.cleanup_enabled,
            ..TokenCleanupConfig::default()
        },
    ))
    .start_background_task();

    let state = web::Data::new(state);
    let bind_address = config.server.bind_address();
    let workers = match config.server.workers {
        0 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        n => n,
    };
    let keep_alive = std::time::Duration::from_secs(config.server.keep_alive);

    info!("Server will bind to: {}", bind_address);

    let app_config = config.clone();
    HttpServer::new(move || create_app(state.clone(), &app_config))
        .workers(workers)
        .keep_alive(keep_alive)
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}
