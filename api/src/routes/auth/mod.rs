//! Authentication route handlers
//!
//! This module contains all authentication-related endpoints including:
//! - Registration and login (public, stricter rate limit)
//! - Token refresh (public)
//! - Logout of one or all sessions (protected)
//! - Current user and password change (protected)

use actix_web::web;

use crate::middleware::{JwtAuth, SessionSecurity};

pub mod account;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register::register))
        .route("/login", web::post().to(login::login))
        .route("/refresh", web::post().to(refresh::refresh))
        .service(
            web::resource("/logout")
                .route(web::post().to(logout::logout))
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new()),
        )
        .service(
            web::resource("/logout-all")
                .route(web::post().to(logout::logout_all))
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new()),
        )
        .service(
            web::resource("/me")
                .route(web::get().to(account::me))
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new()),
        )
        .service(
            web::resource("/password")
                .route(web::put().to(account::change_password))
                .wrap(SessionSecurity::new())
                .wrap(JwtAuth::new()),
        );
}
