//! Food catalog: shared entries plus each user's custom foods

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::dto::food::{FoodRequest, FoodSearchQuery};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(search_foods))
        .route("", web::post().to(create_food))
        .route("/{id}", web::get().to(get_food))
        .route("/{id}", web::put().to(update_food))
        .route("/{id}", web::delete().to(delete_food));
}

/// Handler for GET /api/v1/foods?q=&page=&per_page=
pub async fn search_foods(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<FoodSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = state
        .foods
        .search(auth.user_id, query.q.as_deref(), query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn create_food(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<FoodRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let food = state.foods.create(auth.user_id, request.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(food))
}

pub async fn get_food(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let food = state.foods.get(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(food))
}

/// Only the owner may change a food; shared catalog entries are 403
pub async fn update_food(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    request: web::Json<FoodRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let food = state
        .foods
        .update(auth.user_id, path.into_inner(), request.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(food))
}

pub async fn delete_food(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.foods.delete(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
