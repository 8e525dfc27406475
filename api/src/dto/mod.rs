//! Request and response bodies of the HTTP API

pub mod auth;
pub mod food;
pub mod food_log;
pub mod health_metric;
pub mod session;
