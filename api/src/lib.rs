//! HTTP layer of the NutriLog backend
//!
//! Wires the core services into an actix-web application: middleware for
//! CORS, security headers, rate limiting, JWT authentication and session
//! security, request DTOs, and the `/api/v1` route handlers.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState, Repositories};
