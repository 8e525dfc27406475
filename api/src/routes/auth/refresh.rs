use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::RefreshTokenRequest;
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new token pair. The old refresh token is
/// revoked; presenting it again revokes the whole token family.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, expired or reused refresh token, or the bound
///   session is no longer active
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let response = state.auth.refresh(&request.refresh_token).await?;

    Ok(HttpResponse::Ok().json(response))
}
