use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::category::{Category, CategoryInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxCategoryRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn get_category(&self, id: i32) -> Result<Option<Category>, AppError>;
    async fn category_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError>;
    async fn update_category(&self, id: i32, category: &CategoryInsert) -> Result<bool, AppError>;
    async fn delete_category(&self, id: i32) -> Result<bool, AppError>;
}

impl SqlxCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCategoryRepo { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT category_id, name, description FROM categories ORDER BY name, category_id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT category_id, name, description FROM categories WHERE category_id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn category_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE category_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING category_id, name, description
            "#
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_category(&self, id: i32, category: &CategoryInsert) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE categories SET name = $1, description = $2 WHERE category_id = $3")
            .bind(&category.name)
            .bind(&category.description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
