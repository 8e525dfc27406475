//! HTTP middleware: authentication, session security, rate limiting,
//! security headers and CORS.

pub mod auth;
pub mod client;
pub mod cors;
pub mod rate_limit;
pub mod security;
pub mod session_security;

pub use auth::{AuthContext, JwtAuth};
pub use client::TrustedProxies;
pub use cors::create_cors;
pub use rate_limit::RateLimiter;
pub use security::SecurityHeaders;
pub use session_security::{SessionContext, SessionSecurity, SESSION_TOKEN_HEADER};
