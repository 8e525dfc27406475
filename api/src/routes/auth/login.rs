use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::LoginRequest;
use crate::handlers::ApiError;
use crate::middleware::client::client_info_from_request;

/// Handler for POST /api/v1/auth/login
///
/// Verifies the credentials and opens a new session for the calling device.
/// The returned `session_token` must be sent as `X-Session-Token` on every
/// protected request.
///
/// ## Errors
/// - 401 Unauthorized: Wrong email or password
/// - 403 Forbidden: Account disabled
/// - 429 Too Many Requests: Account locked after repeated failures (with `Retry-After`)
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let client = client_info_from_request(&req, &state.trusted_proxies);
    let response = state.auth.login(&request.email, &request.password, &client).await?;

    Ok(HttpResponse::Ok().json(response))
}
