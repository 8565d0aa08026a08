use actix_web::{get, web, HttpResponse, Responder};

use crate::{
    entities::dashboard::AccessibilityView,
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

/// Skills, categories and projects for the list page that stands in for the 3D scene.
pub async fn accessibility(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let (skills, categories, projects) = tokio::try_join!(
        state.skill_handler.list_skills(),
        state.category_handler.list_categories(),
        state.project_handler.list_projects(),
    )?;

    Ok(HttpResponse::Ok().json(AccessibilityView { skills, categories, projects }))
}

#[get("/dashboard")]
pub async fn admin_dashboard(
    admin: AdminClaims,
    state: web::Data<AppState>
) -> Result<impl Responder, AppError> {
    let dashboard = state.dashboard_handler.dashboard(&admin.0.email).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{header, StatusCode}, test};

    use crate::{
        entities::{dashboard::CatalogCounts, skill::Skill},
        test_support::{bearer, test_app, MockRepos},
    };

    #[actix_rt::test]
    async fn accessibility_view_is_public() {
        let mut repos = MockRepos::default();
        repos.skills.expect_list_skills().returning(|| {
            Ok(vec![Skill { skill_id: 1, name: "Rust".into(), description: String::new() }])
        });
        repos.categories.expect_list_categories().returning(|| Ok(vec![]));
        repos.projects.expect_list_projects().returning(|| Ok(vec![]));
        let app = test_app!(repos.into_state());

        let req = test::TestRequest::get().uri("/api/Accessibility").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["skills"][0]["name"], "Rust");
        assert!(body["projects"].as_array().is_some());
    }

    #[actix_rt::test]
    async fn dashboard_needs_a_token() {
        let mut repos = MockRepos::default();
        repos.dashboard.expect_catalog_counts().never();
        let app = test_app!(repos.into_state());

        let req = test::TestRequest::get().uri("/api/v1/admin/dashboard").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn dashboard_rejects_non_admins() {
        let mut repos = MockRepos::default();
        repos.dashboard.expect_catalog_counts().never();
        let app = test_app!(repos.into_state());

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header((header::AUTHORIZATION, bearer(false)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn dashboard_reports_counts_for_admins() {
        let mut repos = MockRepos::default();
        repos.dashboard.expect_catalog_counts().returning(|| {
            Ok(CatalogCounts { projects: 4, reviews: 9, skills: 6, categories: 2 })
        });
        let app = test_app!(repos.into_state());

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header((header::AUTHORIZATION, bearer(true)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["reviews"], 9);
        assert_eq!(body["message"], "Welcome back, admin@example.com");
    }
}
