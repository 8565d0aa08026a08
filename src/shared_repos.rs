use std::sync::Arc;

use crate::repositories::{
    category::CategoryRepository,
    dashboard::DashboardRepository,
    project::ProjectRepository,
    skill::SkillRepository,
    sqlx_repo::{SqlxCategoryRepo, SqlxDashboardRepo, SqlxProjectRepo, SqlxSkillRepo, SqlxTestimonialRepo, SqlxUserRepo},
    testimonial::TestimonialRepository,
    user::UserRepository,
};

#[derive(Clone)]
pub struct SharedRepositories {
    pub user_repo: Arc<dyn UserRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub skill_repo: Arc<dyn SkillRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub testimonial_repo: Arc<dyn TestimonialRepository>,
    pub dashboard_repo: Arc<dyn DashboardRepository>,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            user_repo: Arc::new(SqlxUserRepo::new(pool.clone())),
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            skill_repo: Arc::new(SqlxSkillRepo::new(pool.clone())),
            category_repo: Arc::new(SqlxCategoryRepo::new(pool.clone())),
            testimonial_repo: Arc::new(SqlxTestimonialRepo::new(pool.clone())),
            dashboard_repo: Arc::new(SqlxDashboardRepo::new(pool)),
        }
    }
}
