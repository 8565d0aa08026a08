use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::{
    entities::testimonial::{NewTestimonialRequest, Testimonial, TestimonialInsert, UpdateTestimonialRequest},
    errors::AppError,
    repositories::{project::ProjectRepository, testimonial::TestimonialRepository},
};

pub struct TestimonialHandler {
    pub testimonial_repo: Arc<dyn TestimonialRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
}

fn testimonial_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Testimonial {} not found", id))
}

impl TestimonialHandler {
    pub fn new(
        testimonial_repo: Arc<dyn TestimonialRepository>,
        project_repo: Arc<dyn ProjectRepository>,
    ) -> Self {
        TestimonialHandler { testimonial_repo, project_repo }
    }

    /// Newest first, optionally for a single project.
    pub async fn list_testimonials(&self, project_id: Option<i32>) -> Result<Vec<Testimonial>, AppError> {
        self.testimonial_repo.list_testimonials(project_id).await
    }

    pub async fn get_testimonial(&self, id: i32) -> Result<Testimonial, AppError> {
        self.testimonial_repo
            .get_testimonial(id)
            .await?
            .ok_or_else(|| testimonial_not_found(id))
    }

    #[instrument(skip(self, request), fields(project_id = request.project_id))]
    pub async fn create_testimonial(&self, request: NewTestimonialRequest) -> Result<Testimonial, AppError> {
        let insert = TestimonialInsert::from(request);
        insert.validate()?;
        self.ensure_project(insert.project_id).await?;

        let created = self.testimonial_repo.create_testimonial(&insert).await?;
        tracing::info!(testimonial_id = created.testimonial_id, "Testimonial posted");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_testimonial(&self, id: i32, request: UpdateTestimonialRequest) -> Result<(), AppError> {
        if request.testimonial_id.is_some_and(|body_id| body_id != id) {
            return Err(AppError::InvalidInput("Testimonial id in body does not match the route".into()));
        }

        let update = request.prepare();
        update.validate()?;
        self.ensure_project(update.project_id).await?;

        if self.testimonial_repo.update_testimonial(id, &update).await? {
            return Ok(());
        }

        if self.testimonial_repo.testimonial_exists(id).await? {
            Err(AppError::Conflict(format!("Testimonial {} was modified concurrently", id)))
        } else {
            Err(testimonial_not_found(id))
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_testimonial(&self, id: i32) -> Result<(), AppError> {
        if !self.testimonial_repo.delete_testimonial(id).await? {
            return Err(testimonial_not_found(id));
        }
        Ok(())
    }

    async fn ensure_project(&self, project_id: i32) -> Result<(), AppError> {
        if self.project_repo.project_exists(project_id).await? {
            Ok(())
        } else {
            Err(AppError::field("projectId", "Project does not exist"))
        }
    }
}
