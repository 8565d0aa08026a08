//! Shared fixtures for HTTP handler tests: an `AppState` backed by mock repositories.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    entities::user::User,
    repositories::{
        category::MockCategoryRepository,
        dashboard::MockDashboardRepository,
        project::MockProjectRepository,
        skill::MockSkillRepository,
        testimonial::MockTestimonialRepository,
        token::TokenServiceRepository,
        user::MockUserRepository,
    },
    settings::{test_config, AppConfig},
    shared_repos::SharedRepositories,
    AppState,
};

#[derive(Default)]
pub(crate) struct MockRepos {
    pub users: MockUserRepository,
    pub projects: MockProjectRepository,
    pub skills: MockSkillRepository,
    pub categories: MockCategoryRepository,
    pub testimonials: MockTestimonialRepository,
    pub dashboard: MockDashboardRepository,
}

impl MockRepos {
    pub fn into_state(self) -> web::Data<AppState> {
        self.into_state_with(&test_config())
    }

    pub fn into_state_with(self, config: &AppConfig) -> web::Data<AppState> {
        let repos = SharedRepositories {
            user_repo: Arc::new(self.users),
            project_repo: Arc::new(self.projects),
            skill_repo: Arc::new(self.skills),
            category_repo: Arc::new(self.categories),
            testimonial_repo: Arc::new(self.testimonials),
            dashboard_repo: Arc::new(self.dashboard),
        };
        web::Data::new(AppState::new(config, repos, None))
    }
}

/// `Authorization` header value for a fresh access token.
pub(crate) fn bearer(admin: bool) -> String {
    let user = User {
        id: Uuid::new_v4(),
        email: if admin { "admin@example.com".into() } else { "visitor@example.com".into() },
        display_name: None,
        password_hash: String::new(),
        is_admin: admin,
        is_verified: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
        deleted_by: None,
    };

    let token = JwtService::new(&test_config())
        .create_jwt(&user)
        .expect("token");
    format!("Bearer {token}")
}

/// Builds the full middleware stack and routing table around `state`.
macro_rules! test_app {
    ($state:expr) => {{
        let state: actix_web::web::Data<$crate::AppState> = $state;
        let web_root = state.web_root.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(state)
                .wrap($crate::middlewares::auth::AuthMiddleware)
                .wrap($crate::middlewares::api_path::ApiPathCase)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure($crate::routes::configure_routes)
                .service($crate::handlers::static_files::asset_service(&web_root)),
        )
        .await
    }};
}

pub(crate) use test_app;
