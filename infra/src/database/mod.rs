//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and migrations
//! - Repository implementations for every `nl_core` repository trait

pub mod connection;
pub mod mysql;


use nl_core::errors::DomainError;

pub use connection::DatabasePool;
pub use mysql::{
    MySqlFoodLogRepository, MySqlFoodRepository, MySqlHealthMetricRepository, MySqlProfileRepository,
    MySqlSessionRepository, MySqlTokenRepository, MySqlUserRepository,
};

/// Convert a SQLx error into a domain error.
///
/// Unique-key violations become `Conflict`; everything else is `Internal`
/// with `action` as context.
pub fn map_sqlx_error(action: &str, err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return DomainError::Conflict {
                message: format!("Failed to {}: duplicate entry", action),
            };
        }
    }
    tracing::error!("Failed to {}: {}", action, err);
    DomainError::Internal {
        message: format!("Failed to {}: {}", action, err),
    }
}
