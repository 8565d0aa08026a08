use actix_web::{http::header, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::category::CategoryRequest, errors::AppError, use_cases::extractors::AdminClaims, AppState};

pub async fn list_categories(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.category_handler.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

pub async fn get_category(
    category_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let category = state.category_handler.get_category(category_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_category(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<CategoryRequest>,
) -> Result<impl Responder, AppError> {
    let category = state.category_handler.create_category(data.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/CategoriesAPI/{}", category.category_id)))
        .json(category))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_category(
    _claims: AdminClaims,
    category_id: web::Path<i32>,
    state: web::Data<AppState>,
    data: web::Json<CategoryRequest>,
) -> Result<impl Responder, AppError> {
    state.category_handler
        .update_category(category_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
pub async fn delete_category(
    _claims: AdminClaims,
    category_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.category_handler.delete_category(category_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
