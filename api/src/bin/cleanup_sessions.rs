//! One-shot session cleanup.
//!
//! Deactivates sessions that expired or went idle and deletes inactive
//! sessions older than the retention period. Intended for cron jobs when the
//! server's background cleanup is disabled.
//!
//! Usage:
//! ```bash
//! cargo run --bin cleanup_sessions
//!
//! # Keep terminated sessions for 7 days only, and purge stale tokens too
//! cargo run --bin cleanup_sessions -- --retention-days 7 --include-tokens
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use nl_core::services::{SessionCleanupService, TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig};
use nl_infra::database::{MySqlSessionRepository, MySqlTokenRepository};
use nl_infra::DatabasePool;
use nl_shared::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "cleanup_sessions",
    about = "NutriLog session cleanup",
    long_about = "Deactivate stale sessions and purge inactive ones past the retention period"
)]
struct CleanupArgs {
    /// Override SESSION_RETENTION_DAYS
    #[arg(long)]
    retention_days: Option<i64>,

    /// Also delete expired refresh tokens and blacklist entries
    #[arg(long)]
    include_tokens: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = CleanupArgs::parse();

    let config = AppConfig::from_env();
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(config.logging.level.as_str())).init();

    if let Some(days) = args.retention_days {
        anyhow::ensure!(days >= 0, "--retention-days must not be negative");
    }

    let database = DatabasePool::connect_and_migrate(config.database.clone())
        .await
        .context("failed to connect to MySQL")?;
    let pool = database.get_pool().clone();

    let mut sessions = SessionCleanupService::new(
        Arc::new(MySqlSessionRepository::new(pool.clone())),
        config.auth.session.clone(),
    );
    if let Some(days) = args.retention_days {
        sessions = sessions.with_retention_days(days);
    }

    info!("Running session cleanup (retention {} days)", sessions.retention_days());
    let result = sessions.run_cleanup().await.context("session cleanup failed")?;
    println!("Sessions deactivated: {}", result.deactivated);
    println!("Sessions purged: {}", result.purged);

    if args.include_tokens {
        let tokens = Arc::new(TokenService::new(
            Arc::new(MySqlTokenRepository::new(pool)),
            TokenServiceConfig::from(&config.auth.jwt),
        ));
        let result = TokenCleanupService::new(tokens, TokenCleanupConfig::default())
            .run_cleanup()
            .await;
        println!("Expired refresh tokens deleted: {}", result.refresh_tokens_deleted);
        println!("Blacklist entries deleted: {}", result.blacklist_entries_deleted);
        for error in &result.errors {
            eprintln!("Token cleanup error: {}", error);
        }
    }

    Ok(())
}
