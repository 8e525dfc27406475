//! Active session management for the current user

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use nl_core::domain::entities::session::TerminationReason;

use crate::app::AppState;
use crate::dto::auth::{MessageResponse, SessionsTerminatedResponse};
use crate::dto::session::SessionResponse;
use crate::handlers::ApiError;
use crate::middleware::SessionContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_sessions))
        .route("", web::delete().to(terminate_other_sessions))
        .route("/{id}", web::delete().to(terminate_session));
}

/// Handler for GET /api/v1/sessions
pub async fn list_sessions(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, ApiError> {
    let sessions: Vec<SessionResponse> = state
        .sessions
        .list_active_sessions(session.user_id)
        .await?
        .into_iter()
        .map(|s| SessionResponse::from_session(s, session.session_id))
        .collect();

    Ok(HttpResponse::Ok().json(sessions))
}

/// Handler for DELETE /api/v1/sessions/{id}
///
/// Terminating the current session is allowed and behaves like a logout
/// without blacklisting the access token.
pub async fn terminate_session(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let target = path.into_inner();
    state
        .sessions
        .terminate_session(session.user_id, target, TerminationReason::UserTerminated)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Session terminated")))
}

/// Handler for DELETE /api/v1/sessions
///
/// Ends every session except the one making the request.
pub async fn terminate_other_sessions(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, ApiError> {
    let terminated = state
        .sessions
        .terminate_other_sessions(session.user_id, session.session_id, TerminationReason::UserTerminated)
        .await?;

    Ok(HttpResponse::Ok().json(SessionsTerminatedResponse {
        message: "Other sessions terminated".to_string(),
        sessions_terminated: terminated,
    }))
}
