use std::borrow::Cow;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::testimonial::{Testimonial, TestimonialInsert, TestimonialUpdate},
    errors::AppError,
    repositories::sqlx_repo::SqlxTestimonialRepo,
};

const TESTIMONIAL_COLUMNS: &str = "testimonial_id, author_name, content, date_posted, project_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn list_testimonials(&self, project_id: Option<i32>) -> Result<Vec<Testimonial>, AppError>;
    async fn get_testimonial(&self, id: i32) -> Result<Option<Testimonial>, AppError>;
    async fn testimonial_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn create_testimonial(&self, testimonial: &TestimonialInsert) -> Result<Testimonial, AppError>;
    async fn update_testimonial(&self, id: i32, testimonial: &TestimonialUpdate) -> Result<bool, AppError>;
    async fn delete_testimonial(&self, id: i32) -> Result<bool, AppError>;
}

impl SqlxTestimonialRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxTestimonialRepo { pool }
    }
}

/// A project deleted between the existence check and the insert surfaces as a field error.
fn map_project_fk(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23503")) => {
            AppError::field("projectId", "Project does not exist")
        }
        _ => AppError::from(e),
    }
}

#[async_trait]
impl TestimonialRepository for SqlxTestimonialRepo {
    async fn list_testimonials(&self, project_id: Option<i32>) -> Result<Vec<Testimonial>, AppError> {
        let query = format!(
            r#"
            SELECT {TESTIMONIAL_COLUMNS} FROM testimonials
            WHERE ($1::int4 IS NULL OR project_id = $1)
            ORDER BY date_posted DESC, testimonial_id DESC
            "#
        );

        let testimonials = sqlx::query_as::<_, Testimonial>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(testimonials)
    }

    async fn get_testimonial(&self, id: i32) -> Result<Option<Testimonial>, AppError> {
        let query = format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE testimonial_id = $1");
        let testimonial = sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(testimonial)
    }

    async fn testimonial_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM testimonials WHERE testimonial_id = $1)"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_testimonial(&self, testimonial: &TestimonialInsert) -> Result<Testimonial, AppError> {
        let query = format!(
            r#"
            INSERT INTO testimonials (author_name, content, date_posted, project_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {TESTIMONIAL_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Testimonial>(&query)
            .bind(&testimonial.author_name)
            .bind(&testimonial.content)
            .bind(testimonial.date_posted)
            .bind(testimonial.project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_project_fk)?;

        Ok(created)
    }

    async fn update_testimonial(&self, id: i32, testimonial: &TestimonialUpdate) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE testimonials
            SET author_name = $1, content = $2, date_posted = COALESCE($3, date_posted), project_id = $4
            WHERE testimonial_id = $5
            "#
        )
        .bind(&testimonial.author_name)
        .bind(&testimonial.content)
        .bind(testimonial.date_posted)
        .bind(testimonial.project_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_project_fk)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_testimonial(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM testimonials WHERE testimonial_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
