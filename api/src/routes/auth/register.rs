use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::RegisterRequest;
use crate::handlers::ApiError;
use crate::middleware::client::client_info_from_request;

/// Handler for POST /api/v1/auth/register
///
/// Creates the account and logs it in on the calling device.
///
/// # Request Body
///
/// ```json
/// {
///     "name": "Ada",
///     "email": "ada@example.com",
///     "password": "Secret123",
///     "password_confirmation": "Secret123"
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "user": { "id": "…", "name": "Ada", "email": "ada@example.com" },
///     "access_token": "eyJ...",
///     "refresh_token": "…",
///     "token_type": "Bearer",
///     "expires_in": 900,
///     "session_id": "…",
///     "session_token": "…"
/// }
/// ```
///
/// ## Errors
/// - 409 Conflict: Email already registered
/// - 422 Unprocessable Entity: Invalid fields or weak password
/// - 429 Too Many Requests: Rate limit exceeded
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let client = client_info_from_request(&req, &state.trusted_proxies);
    let response = state
        .auth
        .register(&request.name, &request.email, &request.password, &client)
        .await?;

    Ok(HttpResponse::Created().json(response))
}
