use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::testimonial::{NewTestimonialRequest, TestimonialQuery, UpdateTestimonialRequest},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub async fn list_testimonials(
    state: web::Data<AppState>,
    query: web::Query<TestimonialQuery>,
) -> Result<impl Responder, AppError> {
    let testimonials = state.testimonial_handler
        .list_testimonials(query.project_id)
        .await?;
    Ok(HttpResponse::Ok().json(testimonials))
}

pub async fn get_testimonial(
    testimonial_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let testimonial = state.testimonial_handler
        .get_testimonial(testimonial_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(testimonial))
}

/// Public: visitors post reviews from the museum. Limited per client IP.
#[instrument(skip_all, fields(client_ip = tracing::field::Empty))]
pub async fn create_testimonial(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<NewTestimonialRequest>,
) -> Result<impl Responder, AppError> {
    let client_ip = get_client_ip(&req, state.trust_x_forwarded_for);
    tracing::Span::current().record("client_ip", client_ip.as_str());

    let decision = state.testimonial_limiter.check(&client_ip);
    if !decision.allowed {
        tracing::warn!("Testimonial rate limit exceeded");
        return Err(AppError::RateLimited {
            retry_after: decision.retry_after.unwrap_or(60),
        });
    }

    let testimonial = state.testimonial_handler
        .create_testimonial(data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(testimonial))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_testimonial(
    _claims: AdminClaims,
    testimonial_id: web::Path<i32>,
    state: web::Data<AppState>,
    data: web::Json<UpdateTestimonialRequest>,
) -> Result<impl Responder, AppError> {
    state.testimonial_handler
        .update_testimonial(testimonial_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
pub async fn delete_testimonial(
    _claims: AdminClaims,
    testimonial_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.testimonial_handler
        .delete_testimonial(testimonial_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
