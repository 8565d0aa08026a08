use async_trait::async_trait;
use sqlx::PgPool;

use crate::{entities::dashboard::CatalogCounts, errors::AppError, repositories::sqlx_repo::SqlxDashboardRepo};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn catalog_counts(&self) -> Result<CatalogCounts, AppError>;
}

impl SqlxDashboardRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxDashboardRepo { pool }
    }
}

#[async_trait]
impl DashboardRepository for SqlxDashboardRepo {
    async fn catalog_counts(&self) -> Result<CatalogCounts, AppError> {
        let counts = sqlx::query_as::<_, CatalogCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM projects) AS projects,
                (SELECT COUNT(*) FROM testimonials) AS reviews,
                (SELECT COUNT(*) FROM skills) AS skills,
                (SELECT COUNT(*) FROM categories) AS categories
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
