//! Food diary entries and nutrition summaries

use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::dto::food_log::{
    CreateFoodLogRequest, DailySummaryQuery, FoodLogListQuery, RangeSummaryQuery, UpdateFoodLogRequest,
};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_food_logs))
        .route("", web::post().to(create_food_log))
        .route("/summary/daily", web::get().to(daily_summary))
        .route("/summary/range", web::get().to(range_summary))
        .route("/{id}", web::get().to(get_food_log))
        .route("/{id}", web::put().to(update_food_log))
        .route("/{id}", web::delete().to(delete_food_log));
}

/// Handler for GET /api/v1/food-logs
///
/// `?date=YYYY-MM-DD` or `?from=&to=`; today (UTC) when neither is given.
pub async fn list_food_logs(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<FoodLogListQuery>,
) -> Result<HttpResponse, ApiError> {
    let (from, to) = query.range()?;
    let logs = state.food_logs.list(auth.user_id, from, to).await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// Handler for POST /api/v1/food-logs
///
/// Either `{food_id, servings}` or a manual `{food_name, nutrients}` entry.
pub async fn create_food_log(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<CreateFoodLogRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let log = state.food_logs.create(auth.user_id, request.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(log))
}

pub async fn daily_summary(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<DailySummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.food_logs.daily_summary(auth.user_id, date).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn range_summary(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<RangeSummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let summary = state
        .food_logs
        .range_summary(auth.user_id, query.from, query.to)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn get_food_log(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let log = state.food_logs.get(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(log))
}

pub async fn update_food_log(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    request: web::Json<UpdateFoodLogRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let log = state
        .food_logs
        .update(auth.user_id, path.into_inner(), request.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(log))
}

pub async fn delete_food_log(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.food_logs.delete(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
