use std::sync::Arc;

use crate::{
    entities::dashboard::DashboardResponse,
    errors::AppError,
    repositories::dashboard::DashboardRepository,
};

pub struct DashboardHandler {
    pub dashboard_repo: Arc<dyn DashboardRepository>,
}

impl DashboardHandler {
    pub fn new(dashboard_repo: Arc<dyn DashboardRepository>) -> Self {
        DashboardHandler { dashboard_repo }
    }

    pub async fn dashboard(&self, admin_email: &str) -> Result<DashboardResponse, AppError> {
        let counts = self.dashboard_repo.catalog_counts().await?;
        Ok(DashboardResponse {
            message: format!("Welcome back, {}", admin_email),
            counts,
        })
    }
}
