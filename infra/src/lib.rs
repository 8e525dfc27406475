//! # Infrastructure Layer
//!
//! Concrete adapters behind the repository and store traits declared in
//! `nl_core`:
//!
//! - **Database**: MySQL repositories and the connection pool (SQLx)
//! - **Cache**: Redis client with retry logic
//! - **Services**: Redis-backed rate limiting and login lockouts

pub mod cache;
pub mod database;
pub mod services;

use nl_core::errors::DomainError;

pub use cache::RedisClient;
pub use database::DatabasePool;
pub use services::RedisRateLimitStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Bad URL, unreachable server or similar setup problem
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_error_becomes_internal() {
        let err: DomainError = InfrastructureError::Config("missing REDIS_URL".to_string()).into();
        match err {
            DomainError::Internal { message } => assert!(message.contains("missing REDIS_URL")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
