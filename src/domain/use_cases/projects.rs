use std::{collections::HashMap, sync::Arc};

use tracing::instrument;
use validator::Validate;

use crate::{
    entities::{
        category::Category,
        project::{NewProjectRequest, Project, ProjectFilter, ProjectResponse, UpdateProjectRequest},
        skill::Skill,
        testimonial::Testimonial,
    },
    errors::AppError,
    repositories::project::ProjectRepository,
};

pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
}

fn project_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Project {} not found", id))
}

impl ProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepository>) -> Self {
        ProjectHandler { project_repo }
    }

    /// Every project with its skills, categories and testimonials.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<ProjectResponse>, AppError> {
        let projects = self.project_repo.list_projects().await?;
        self.with_relations(projects).await
    }

    #[instrument(skip(self))]
    pub async fn get_project(&self, id: i32) -> Result<ProjectResponse, AppError> {
        let project = self
            .project_repo
            .get_project(id)
            .await?
            .ok_or_else(|| project_not_found(id))?;

        self.with_relations(vec![project])
            .await?
            .pop()
            .ok_or_else(|| project_not_found(id))
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectResponse, AppError> {
        let request = request.normalized();
        request.validate()?;

        let insert = request.prepare_for_insert();
        let id = self
            .project_repo
            .create_project(&insert, &request.skill_ids(), &request.category_ids())
            .await?;

        self.get_project(id).await
    }

    /// Replaces the scalar fields and both association sets.
    #[instrument(skip(self, request))]
    pub async fn update_project(&self, id: i32, request: UpdateProjectRequest) -> Result<(), AppError> {
        if request.project_id.is_some_and(|body_id| body_id != id) {
            return Err(AppError::InvalidInput("Project id in body does not match the route".into()));
        }
        let request = request.normalized();
        request.validate()?;

        let update = request.prepare_for_update();
        let updated = self
            .project_repo
            .update_project(id, &update, &request.skill_ids(), &request.category_ids())
            .await?;

        if updated {
            return Ok(());
        }

        if self.project_repo.project_exists(id).await? {
            Err(AppError::Conflict(format!("Project {} was modified concurrently", id)))
        } else {
            Err(project_not_found(id))
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: i32) -> Result<(), AppError> {
        if !self.project_repo.delete_project(id).await? {
            return Err(project_not_found(id));
        }
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }

    /// Any-of within skills, any-of within categories, both groups must match.
    #[instrument(skip(self))]
    pub async fn filter_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectResponse>, AppError> {
        let projects = if filter.is_empty() {
            self.project_repo.list_projects().await?
        } else {
            self.project_repo.filter_projects(filter).await?
        };
        self.with_relations(projects).await
    }

    #[instrument(skip(self))]
    pub async fn set_project_image(&self, id: i32, image_url: &str) -> Result<ProjectResponse, AppError> {
        if !self.project_repo.set_image_url(id, image_url).await? {
            return Err(project_not_found(id));
        }
        self.get_project(id).await
    }

    pub async fn project_exists(&self, id: i32) -> Result<bool, AppError> {
        self.project_repo.project_exists(id).await
    }

    /// Loads relations for a page of projects with one query per relation.
    async fn with_relations(&self, projects: Vec<Project>) -> Result<Vec<ProjectResponse>, AppError> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = projects.iter().map(|p| p.project_id).collect();

        let mut skills: HashMap<i32, Vec<Skill>> = HashMap::new();
        for row in self.project_repo.skills_for_projects(&ids).await? {
            skills.entry(row.project_id).or_default().push(row.into());
        }

        let mut categories: HashMap<i32, Vec<Category>> = HashMap::new();
        for row in self.project_repo.categories_for_projects(&ids).await? {
            categories.entry(row.project_id).or_default().push(row.into());
        }

        let mut testimonials: HashMap<i32, Vec<Testimonial>> = HashMap::new();
        for testimonial in self.project_repo.testimonials_for_projects(&ids).await? {
            testimonials.entry(testimonial.project_id).or_default().push(testimonial);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let id = project.project_id;
                ProjectResponse::from_parts(
                    project,
                    skills.remove(&id).unwrap_or_default(),
                    categories.remove(&id).unwrap_or_default(),
                    testimonials.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::project::{ProjectCategoryRow, ProjectSkillRow};
    use crate::repositories::project::MockProjectRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn project(id: i32, title: &str) -> Project {
        Project {
            project_id: id,
            title: title.into(),
            description: "A *portfolio* piece".into(),
            project_url: "https://example.com".into(),
            image_url: None,
            date_created: Utc::now(),
        }
    }

    fn update_request(body_id: Option<i32>) -> UpdateProjectRequest {
        UpdateProjectRequest {
            project_id: body_id,
            title: "Museum".into(),
            description: String::new(),
            project_url: "https://example.com".into(),
            image_url: None,
            date_created: None,
            skill_ids: vec![1, 1, 2],
            category_ids: vec![],
        }
    }

    fn expect_no_relations(repo: &mut MockProjectRepository) {
        repo.expect_skills_for_projects().returning(|_| Ok(vec![]));
        repo.expect_categories_for_projects().returning(|_| Ok(vec![]));
        repo.expect_testimonials_for_projects().returning(|_| Ok(vec![]));
    }

    #[tokio::test]
    async fn list_groups_relations_by_project() {
        let mut repo = MockProjectRepository::new();
        repo.expect_list_projects()
            .returning(|| Ok(vec![project(1, "Museum"), project(2, "Compiler")]));
        repo.expect_skills_for_projects().returning(|_| {
            Ok(vec![ProjectSkillRow {
                project_id: 2,
                skill_id: 5,
                name: "Rust".into(),
                description: String::new(),
            }])
        });
        repo.expect_categories_for_projects().returning(|_| {
            Ok(vec![ProjectCategoryRow {
                project_id: 1,
                category_id: 9,
                name: "Web".into(),
                description: String::new(),
            }])
        });
        repo.expect_testimonials_for_projects().returning(|_| {
            Ok(vec![Testimonial {
                testimonial_id: 3,
                author_name: "Anonymous".into(),
                content: "Nice".into(),
                date_posted: Utc::now(),
                project_id: 1,
            }])
        });

        let handler = ProjectHandler::new(Arc::new(repo));
        let projects = handler.list_projects().await.unwrap();

        assert_eq!(projects.len(), 2);
        assert!(projects[0].skills.is_empty());
        assert_eq!(projects[0].categories[0].category_id, 9);
        assert_eq!(projects[0].testimonials.len(), 1);
        assert_eq!(projects[1].skills[0].name, "Rust");
    }

    #[tokio::test]
    async fn get_missing_project_is_not_found() {
        let mut repo = MockProjectRepository::new();
        repo.expect_get_project().with(eq(42)).returning(|_| Ok(None));

        let handler = ProjectHandler::new(Arc::new(repo));
        assert!(matches!(handler.get_project(42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_passes_deduplicated_ids() {
        let mut repo = MockProjectRepository::new();
        repo.expect_create_project()
            .withf(|insert, skills, categories| {
                insert.title == "Museum" && skills == [1, 2] && categories == [4]
            })
            .times(1)
            .returning(|_, _, _| Ok(7));
        repo.expect_get_project()
            .with(eq(7))
            .returning(|id| Ok(Some(project(id, "Museum"))));
        expect_no_relations(&mut repo);

        let handler = ProjectHandler::new(Arc::new(repo));
        let created = handler
            .create_project(NewProjectRequest {
                title: " Museum ".into(),
                description: String::new(),
                project_url: "https://example.com".into(),
                image_url: None,
                skill_ids: vec![2, 1, 2],
                category_ids: vec![4, 4],
            })
            .await
            .unwrap();

        assert_eq!(created.project_id, 7);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_without_touching_repo() {
        let repo = MockProjectRepository::new();
        let handler = ProjectHandler::new(Arc::new(repo));

        let result = handler
            .create_project(NewProjectRequest {
                title: String::new(),
                description: String::new(),
                project_url: "not-a-url".into(),
                image_url: None,
                skill_ids: vec![],
                category_ids: vec![],
            })
            .await;

        match result {
            Err(AppError::ValidationError(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"title"));
                assert!(fields.contains(&"project_url"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_with_mismatched_id_is_bad_request() {
        let repo = MockProjectRepository::new();
        let handler = ProjectHandler::new(Arc::new(repo));

        let result = handler.update_project(1, update_request(Some(2))).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn update_of_deleted_row_is_not_found() {
        let mut repo = MockProjectRepository::new();
        repo.expect_update_project().returning(|_, _, _, _| Ok(false));
        repo.expect_project_exists().with(eq(3)).returning(|_| Ok(false));

        let handler = ProjectHandler::new(Arc::new(repo));
        let result = handler.update_project(3, update_request(Some(3))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_with_no_rows_but_existing_project_is_conflict() {
        let mut repo = MockProjectRepository::new();
        repo.expect_update_project().returning(|_, _, _, _| Ok(false));
        repo.expect_project_exists().returning(|_| Ok(true));

        let handler = ProjectHandler::new(Arc::new(repo));
        let result = handler.update_project(3, update_request(None)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_associations() {
        let mut repo = MockProjectRepository::new();
        repo.expect_update_project()
            .withf(|id, update, skills, categories| {
                *id == 3 && update.date_created.is_none() && skills == [1, 2] && categories.is_empty()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let handler = ProjectHandler::new(Arc::new(repo));
        assert!(handler.update_project(3, update_request(None)).await.is_ok());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let mut repo = MockProjectRepository::new();
        repo.expect_delete_project().returning(|_| Ok(false));

        let handler = ProjectHandler::new(Arc::new(repo));
        assert!(matches!(handler.delete_project(9).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_filter_lists_everything() {
        let mut repo = MockProjectRepository::new();
        repo.expect_list_projects().times(1).returning(|| Ok(vec![project(1, "Museum")]));
        repo.expect_filter_projects().never();
        expect_no_relations(&mut repo);

        let handler = ProjectHandler::new(Arc::new(repo));
        let projects = handler.filter_projects(&ProjectFilter::default()).await.unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[tokio::test]
    async fn filter_delegates_to_repository() {
        let mut repo = MockProjectRepository::new();
        repo.expect_filter_projects()
            .withf(|filter| filter.skill_ids == [1] && filter.category_ids == [2])
            .returning(|_| Ok(vec![]));

        let handler = ProjectHandler::new(Arc::new(repo));
        let filter = ProjectFilter { skill_ids: vec![1], category_ids: vec![2] };
        assert!(handler.filter_projects(&filter).await.unwrap().is_empty());
    }
}
