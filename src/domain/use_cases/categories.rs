use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::{
    entities::category::{Category, CategoryRequest},
    errors::AppError,
    repositories::category::CategoryRepository,
};

pub struct CategoryHandler {
    pub category_repo: Arc<dyn CategoryRepository>,
}

fn category_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

impl CategoryHandler {
    pub fn new(category_repo: Arc<dyn CategoryRepository>) -> Self {
        CategoryHandler { category_repo }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list_categories().await
    }

    pub async fn get_category(&self, id: i32) -> Result<Category, AppError> {
        self.category_repo
            .get_category(id)
            .await?
            .ok_or_else(|| category_not_found(id))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_category(&self, request: CategoryRequest) -> Result<Category, AppError> {
        request.validate()?;
        self.category_repo.create_category(&request.prepare()).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_category(&self, id: i32, request: CategoryRequest) -> Result<(), AppError> {
        if request.category_id.is_some_and(|body_id| body_id != id) {
            return Err(AppError::InvalidInput("Category id in body does not match the route".into()));
        }
        request.validate()?;

        if self.category_repo.update_category(id, &request.prepare()).await? {
            return Ok(());
        }

        if self.category_repo.category_exists(id).await? {
            Err(AppError::Conflict(format!("Category {} was modified concurrently", id)))
        } else {
            Err(category_not_found(id))
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> Result<(), AppError> {
        if !self.category_repo.delete_category(id).await? {
            return Err(category_not_found(id));
        }
        Ok(())
    }
}
