//! Nutrition profile and daily targets

use actix_web::{web, HttpResponse};

use nl_core::services::ProfileUpdate;

use crate::app::AppState;
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_profile))
        .route("", web::put().to(upsert_profile))
        .route("", web::delete().to(delete_profile))
        .route("/targets", web::get().to(targets));
}

pub async fn get_profile(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let profile = state.profiles.get(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Handler for PUT /api/v1/profile
///
/// Creates the profile or replaces every editable field.
pub async fn upsert_profile(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.profiles.upsert(auth.user_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn delete_profile(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    state.profiles.delete(auth.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Handler for GET /api/v1/profile/targets
///
/// Explicit targets win; otherwise they are computed from the profile and the
/// latest weight. Missing inputs are reported as 422 `insufficient_profile_data`.
pub async fn targets(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let targets = state.profiles.targets(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(targets))
}
