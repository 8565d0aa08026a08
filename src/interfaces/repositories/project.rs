use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::{
    entities::{
        project::{Project, ProjectCategoryRow, ProjectFilter, ProjectInsert, ProjectSkillRow, ProjectUpdate},
        testimonial::Testimonial,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "p.project_id, p.title, p.description, p.project_url, p.image_url, p.date_created";
const PROJECT_ORDER: &str = "ORDER BY p.date_created DESC, p.project_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn get_project(&self, id: i32) -> Result<Option<Project>, AppError>;
    async fn project_exists(&self, id: i32) -> Result<bool, AppError>;
    /// Inserts the project and links the existing ids among `skill_ids`/`category_ids`.
    async fn create_project(
        &self,
        project: &ProjectInsert,
        skill_ids: &[i32],
        category_ids: &[i32],
    ) -> Result<i32, AppError>;
    /// Returns `false` when no row matched `id`.
    async fn update_project(
        &self,
        id: i32,
        project: &ProjectUpdate,
        skill_ids: &[i32],
        category_ids: &[i32],
    ) -> Result<bool, AppError>;
    async fn set_image_url(&self, id: i32, image_url: &str) -> Result<bool, AppError>;
    async fn delete_project(&self, id: i32) -> Result<bool, AppError>;
    async fn filter_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError>;
    async fn skills_for_projects(&self, project_ids: &[i32]) -> Result<Vec<ProjectSkillRow>, AppError>;
    async fn categories_for_projects(&self, project_ids: &[i32]) -> Result<Vec<ProjectCategoryRow>, AppError>;
    async fn testimonials_for_projects(&self, project_ids: &[i32]) -> Result<Vec<Testimonial>, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

fn map_title_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("projects_title_key") {
            return AppError::Conflict("A project with this title already exists".into());
        }
    }
    AppError::from(e)
}

/// Unknown skill ids are skipped by the join against `skills`.
async fn link_skills(conn: &mut PgConnection, project_id: i32, skill_ids: &[i32]) -> Result<(), sqlx::Error> {
    if skill_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO project_skills (project_id, skill_id)
        SELECT $1, s.skill_id FROM skills s WHERE s.skill_id = ANY($2)
        ON CONFLICT DO NOTHING
        "#
    )
    .bind(project_id)
    .bind(skill_ids)
    .execute(conn)
    .await?;

    Ok(())
}

async fn link_categories(conn: &mut PgConnection, project_id: i32, category_ids: &[i32]) -> Result<(), sqlx::Error> {
    if category_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO project_categories (project_id, category_id)
        SELECT $1, c.category_id FROM categories c WHERE c.category_id = ANY($2)
        ON CONFLICT DO NOTHING
        "#
    )
    .bind(project_id)
    .bind(category_ids)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects p {PROJECT_ORDER}");
        let projects = sqlx::query_as::<_, Project>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn get_project(&self, id: i32) -> Result<Option<Project>, AppError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.project_id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn project_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE project_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_project(
        &self,
        project: &ProjectInsert,
        skill_ids: &[i32],
        category_ids: &[i32],
    ) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let project_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (title, description, project_url, image_url, date_created)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING project_id
            "#
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.project_url)
        .bind(&project.image_url)
        .bind(project.date_created)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_title_conflict)?;

        link_skills(&mut tx, project_id, skill_ids).await?;
        link_categories(&mut tx, project_id, category_ids).await?;

        tx.commit().await?;

        tracing::info!(project_id, "Project created");
        Ok(project_id)
    }

    async fn update_project(
        &self,
        id: i32,
        project: &ProjectUpdate,
        skill_ids: &[i32],
        category_ids: &[i32],
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET
                title = $1,
                description = $2,
                project_url = $3,
                image_url = $4,
                date_created = COALESCE($5, date_created)
            WHERE project_id = $6
            "#
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.project_url)
        .bind(&project.image_url)
        .bind(project.date_created)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_title_conflict)?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM project_skills WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM project_categories WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        link_skills(&mut tx, id, skill_ids).await?;
        link_categories(&mut tx, id, category_ids).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn set_image_url(&self, id: i32, image_url: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE projects SET image_url = $1 WHERE project_id = $2")
            .bind(image_url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_project(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE project_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn filter_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError> {
        let query = format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects p
            WHERE (
                cardinality($1::int4[]) = 0
                OR EXISTS (
                    SELECT 1 FROM project_skills ps
                    WHERE ps.project_id = p.project_id AND ps.skill_id = ANY($1)
                )
            )
            AND (
                cardinality($2::int4[]) = 0
                OR EXISTS (
                    SELECT 1 FROM project_categories pc
                    WHERE pc.project_id = p.project_id AND pc.category_id = ANY($2)
                )
            )
            {PROJECT_ORDER}
            "#
        );

        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(&filter.skill_ids)
            .bind(&filter.category_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn skills_for_projects(&self, project_ids: &[i32]) -> Result<Vec<ProjectSkillRow>, AppError> {
        let rows = sqlx::query_as::<_, ProjectSkillRow>(
            r#"
            SELECT ps.project_id, s.skill_id, s.name, s.description
            FROM project_skills ps
            JOIN skills s ON s.skill_id = ps.skill_id
            WHERE ps.project_id = ANY($1)
            ORDER BY s.name, s.skill_id
            "#
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn categories_for_projects(&self, project_ids: &[i32]) -> Result<Vec<ProjectCategoryRow>, AppError> {
        let rows = sqlx::query_as::<_, ProjectCategoryRow>(
            r#"
            SELECT pc.project_id, c.category_id, c.name, c.description
            FROM project_categories pc
            JOIN categories c ON c.category_id = pc.category_id
            WHERE pc.project_id = ANY($1)
            ORDER BY c.name, c.category_id
            "#
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn testimonials_for_projects(&self, project_ids: &[i32]) -> Result<Vec<Testimonial>, AppError> {
        let rows = sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT testimonial_id, author_name, content, date_posted, project_id
            FROM testimonials
            WHERE project_id = ANY($1)
            ORDER BY date_posted DESC, testimonial_id DESC
            "#
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
