use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth::{ChangePasswordRequest, SessionsTerminatedResponse};
use crate::handlers::ApiError;
use crate::middleware::{AuthContext, SessionContext};

/// Handler for GET /api/v1/auth/me
pub async fn me(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let user = state.auth.me(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Handler for PUT /api/v1/auth/password
///
/// The current session survives; every other session is terminated.
///
/// ## Errors
/// - 422 Unprocessable Entity: Wrong current password, mismatched
///   confirmation or weak new password
pub async fn change_password(
    state: web::Data<AppState>,
    auth: AuthContext,
    session: SessionContext,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let terminated = state
        .auth
        .change_password(
            auth.user_id,
            session.session_id,
            &request.current_password,
            &request.password,
        )
        .await?;

    Ok(HttpResponse::Ok().json(SessionsTerminatedResponse {
        message: "Password changed".to_string(),
        sessions_terminated: terminated,
    }))
}
