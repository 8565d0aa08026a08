use actix_multipart::form::MultipartForm;
use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::project::{NewProjectRequest, ProjectFilter, ProjectImageUpload, UpdateProjectRequest},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::image_upload::store_project_image,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.list_projects().await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// `?skillId=1&skillId=2&categoryId=3`; keys may repeat.
#[instrument(skip(req, state), fields(query = %req.query_string()))]
pub async fn filter_projects(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let filter = ProjectFilter::from_query_string(req.query_string())?;
    let projects = state.project_handler.filter_projects(&filter).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_project(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(data.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/ProjectsAPI/{}", project.project_id)))
        .json(project))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_project(
    _claims: AdminClaims,
    project_id: web::Path<i32>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    state.project_handler
        .update_project(project_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
pub async fn delete_project(
    _claims: AdminClaims,
    project_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(project_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stores the uploaded image under the web root and points `imageUrl` at it.
#[instrument(skip(_claims, state, form))]
pub async fn upload_project_image(
    _claims: AdminClaims,
    project_id: web::Path<i32>,
    state: web::Data<AppState>,
    form: MultipartForm<ProjectImageUpload>,
) -> Result<impl Responder, AppError> {
    let project_id = project_id.into_inner();
    let upload = form.into_inner();
    if !state.project_handler.project_exists(project_id).await? {
        return Err(AppError::NotFound(format!("Project {} not found", project_id)));
    }

    let stored = store_project_image(
        &state.web_root,
        upload.image.file.path(),
        state.max_image_upload_bytes,
    )
    .await?;

    match state.project_handler.set_project_image(project_id, &stored.public_url).await {
        Ok(project) => Ok(HttpResponse::Ok().json(project)),
        Err(e) => {
            if let Err(io_err) = tokio::fs::remove_file(&stored.path).await {
                tracing::warn!(path = %stored.path.display(), "Failed to remove orphaned image: {}", io_err);
            }
            Err(e)
        }
    }
}
