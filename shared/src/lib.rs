//! Shared utilities and common types for the NutriLog server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures and error codes
//! - Pagination for list endpoints
//! - Small input validators

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LimitStrategy, LoggingConfig, PasswordConfig, RateLimitConfig, ServerConfig, SessionConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{PaginatedResponse, Pagination};
pub use utils::validation;
