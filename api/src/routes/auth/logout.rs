use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::{MessageResponse, SessionsTerminatedResponse};
use crate::handlers::ApiError;
use crate::middleware::{AuthContext, SessionContext};

/// Handler for POST /api/v1/auth/logout
///
/// Blacklists the presented access token and ends the current session
/// together with its refresh tokens.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// X-Session-Token: {session_token}
/// ```
pub async fn logout(
    state: web::Data<AppState>,
    auth: AuthContext,
    session: SessionContext,
) -> Result<HttpResponse, ApiError> {
    state
        .auth
        .logout(auth.user_id, session.session_id, &auth.jti, auth.expires_at)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Ends every session of the user, including the current one.
pub async fn logout_all(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let terminated = state
        .auth
        .logout_all(auth.user_id, &auth.jti, auth.expires_at)
        .await?;

    Ok(HttpResponse::Ok().json(SessionsTerminatedResponse {
        message: "Logged out from all sessions".to_string(),
        sessions_terminated: terminated,
    }))
}
