//! Body measurements and vitals

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::dto::health_metric::{CreateMetricRequest, MetricListQuery, MetricSummaryQuery, UpdateMetricRequest};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed segments must be registered before `/{id}`
    cfg.route("", web::get().to(list_metrics))
        .route("", web::post().to(create_metric))
        .route("/latest", web::get().to(latest_metrics))
        .route("/summary", web::get().to(metric_summary))
        .route("/{id}", web::get().to(get_metric))
        .route("/{id}", web::put().to(update_metric))
        .route("/{id}", web::delete().to(delete_metric));
}

/// Handler for GET /api/v1/health-metrics
///
/// Paginated, newest first. Filters: `metric_type`, `from`, `to`.
pub async fn list_metrics(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<MetricListQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = state
        .metrics
        .list(auth.user_id, &query.filter(), query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Handler for POST /api/v1/health-metrics
pub async fn create_metric(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<CreateMetricRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let metric = state.metrics.create(auth.user_id, request.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(metric))
}

pub async fn latest_metrics(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let metrics = state.metrics.latest(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(metrics))
}

pub async fn metric_summary(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<MetricSummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let summary = state
        .metrics
        .summary(auth.user_id, query.metric_type, query.from, query.to)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn get_metric(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let metric = state.metrics.get(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(metric))
}

pub async fn update_metric(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    request: web::Json<UpdateMetricRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let metric = state
        .metrics
        .update(auth.user_id, path.into_inner(), request.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(metric))
}

pub async fn delete_metric(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.metrics.delete(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
