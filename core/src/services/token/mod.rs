//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - JWT access token generation and verification
//! - Refresh token rotation with reuse detection
//! - Access token blacklisting on logout
//! - Background cleanup of expired tokens

mod cleanup;
mod config;
mod service;


pub use cleanup::{TokenCleanupConfig, TokenCleanupResult, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use service::{generate_random_token, hash_token, TokenService};
