use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::skill::{Skill, SkillInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxSkillRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn list_skills(&self) -> Result<Vec<Skill>, AppError>;
    async fn get_skill(&self, id: i32) -> Result<Option<Skill>, AppError>;
    async fn skill_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn create_skill(&self, skill: &SkillInsert) -> Result<Skill, AppError>;
    async fn update_skill(&self, id: i32, skill: &SkillInsert) -> Result<bool, AppError>;
    async fn delete_skill(&self, id: i32) -> Result<bool, AppError>;
}

impl SqlxSkillRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxSkillRepo { pool }
    }
}

#[async_trait]
impl SkillRepository for SqlxSkillRepo {
    async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT skill_id, name, description FROM skills ORDER BY name, skill_id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(skills)
    }

    async fn get_skill(&self, id: i32) -> Result<Option<Skill>, AppError> {
        let skill = sqlx::query_as::<_, Skill>(
            "SELECT skill_id, name, description FROM skills WHERE skill_id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(skill)
    }

    async fn skill_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM skills WHERE skill_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_skill(&self, skill: &SkillInsert) -> Result<Skill, AppError> {
        let created = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name, description)
            VALUES ($1, $2)
            RETURNING skill_id, name, description
            "#
        )
        .bind(&skill.name)
        .bind(&skill.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_skill(&self, id: i32, skill: &SkillInsert) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE skills SET name = $1, description = $2 WHERE skill_id = $3")
            .bind(&skill.name)
            .bind(&skill.description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_skill(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM skills WHERE skill_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
