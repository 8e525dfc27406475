//! HTTP routes of the `/api/v1` scope
//!
//! Everything except register, login and refresh is protected by
//! [`JwtAuth`] followed by [`SessionSecurity`].

use actix_web::web;

use crate::middleware::{JwtAuth, SessionSecurity};

pub mod auth;
pub mod food_logs;
pub mod foods;
pub mod health_metrics;
pub mod profile;
pub mod sessions;

/// Registers every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").configure(auth::configure))
        .service(
            web::scope("/sessions")
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new())
                .configure(sessions::configure),
        )
        .service(
            web::scope("/profile")
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new())
                .configure(profile::configure),
        )
        .service(
            web::scope("/health-metrics")
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new())
                .configure(health_metrics::configure),
        )
        .service(
            web::scope("/foods")
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new())
                .configure(foods::configure),
        )
        .service(
            web::scope("/food-logs")
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new())
                .configure(food_logs::configure),
        );
}
