use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::{
    entities::skill::{Skill, SkillRequest},
    errors::AppError,
    repositories::skill::SkillRepository,
};

pub struct SkillHandler {
    pub skill_repo: Arc<dyn SkillRepository>,
}

fn skill_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Skill {} not found", id))
}

impl SkillHandler {
    pub fn new(skill_repo: Arc<dyn SkillRepository>) -> Self {
        SkillHandler { skill_repo }
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        self.skill_repo.list_skills().await
    }

    pub async fn get_skill(&self, id: i32) -> Result<Skill, AppError> {
        self.skill_repo
            .get_skill(id)
            .await?
            .ok_or_else(|| skill_not_found(id))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_skill(&self, request: SkillRequest) -> Result<Skill, AppError> {
        request.validate()?;
        self.skill_repo.create_skill(&request.prepare()).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_skill(&self, id: i32, request: SkillRequest) -> Result<(), AppError> {
        if request.skill_id.is_some_and(|body_id| body_id != id) {
            return Err(AppError::InvalidInput("Skill id in body does not match the route".into()));
        }
        request.validate()?;

        if self.skill_repo.update_skill(id, &request.prepare()).await? {
            return Ok(());
        }

        if self.skill_repo.skill_exists(id).await? {
            Err(AppError::Conflict(format!("Skill {} was modified concurrently", id)))
        } else {
            Err(skill_not_found(id))
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_skill(&self, id: i32) -> Result<(), AppError> {
        if !self.skill_repo.delete_skill(id).await? {
            return Err(skill_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::skill::MockSkillRepository;

    fn request(body_id: Option<i32>, name: &str) -> SkillRequest {
        SkillRequest {
            skill_id: body_id,
            name: name.into(),
            description: "Systems language".into(),
        }
    }

    #[tokio::test]
    async fn create_trims_name() {
        let mut repo = MockSkillRepository::new();
        repo.expect_create_skill()
            .withf(|insert| insert.name == "Rust")
            .returning(|insert| Ok(Skill {
                skill_id: 1,
                name: insert.name.clone(),
                description: insert.description.clone(),
            }));

        let handler = SkillHandler::new(Arc::new(repo));
        let skill = handler.create_skill(request(None, "  Rust ")).await.unwrap();
        assert_eq!(skill.skill_id, 1);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let handler = SkillHandler::new(Arc::new(MockSkillRepository::new()));
        let result = handler.create_skill(request(None, "   ")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn update_id_mismatch() {
        let handler = SkillHandler::new(Arc::new(MockSkillRepository::new()));
        let result = handler.update_skill(1, request(Some(5), "Rust")).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let mut repo = MockSkillRepository::new();
        repo.expect_update_skill().returning(|_, _| Ok(false));
        repo.expect_skill_exists().returning(|_| Ok(false));

        let handler = SkillHandler::new(Arc::new(repo));
        let result = handler.update_skill(1, request(Some(1), "Rust")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let mut repo = MockSkillRepository::new();
        repo.expect_delete_skill().returning(|_| Ok(false));

        let handler = SkillHandler::new(Arc::new(repo));
        assert!(matches!(handler.delete_skill(3).await, Err(AppError::NotFound(_))));
    }
}
