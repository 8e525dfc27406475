//! Authentication service module
//!
//! This module provides email/password authentication:
//! - Registration and login with bcrypt password hashes
//! - Failed-login counting and temporary account locks
//! - Refresh token rotation bound to server-side sessions
//! - Logout, logout everywhere and password change

mod config;
mod rate_limiter;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use rate_limiter::{InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};
pub use service::AuthService;
