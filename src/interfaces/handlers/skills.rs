use actix_web::{http::header, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::skill::SkillRequest, errors::AppError, use_cases::extractors::AdminClaims, AppState};

pub async fn list_skills(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let skills = state.skill_handler.list_skills().await?;
    Ok(HttpResponse::Ok().json(skills))
}

pub async fn get_skill(
    skill_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let skill = state.skill_handler.get_skill(skill_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(skill))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_skill(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<SkillRequest>,
) -> Result<impl Responder, AppError> {
    let skill = state.skill_handler.create_skill(data.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/SkillsAPI/{}", skill.skill_id)))
        .json(skill))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_skill(
    _claims: AdminClaims,
    skill_id: web::Path<i32>,
    state: web::Data<AppState>,
    data: web::Json<SkillRequest>,
) -> Result<impl Responder, AppError> {
    state.skill_handler
        .update_skill(skill_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
pub async fn delete_skill(
    _claims: AdminClaims,
    skill_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.skill_handler.delete_skill(skill_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
