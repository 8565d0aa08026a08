use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use project_portfolio::{
    db::postgres::{create_pool, run_migrations},
    entities::token::AuthResponse,
    handlers::static_files::asset_service,
    middlewares::{api_path::ApiPathCase, auth::AuthMiddleware},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    shared_repos::SharedRepositories,
    AppState,
};
use reqwest::Client;
use serde_json::Value;
use sqlx::PgPool;
use std::{net::TcpListener, time::Duration};
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "AdminPassword123!";

pub struct TestApp {
    pub address: String,
    #[allow(dead_code)]
    pub db_pool: PgPool,
    pub client: Client,
    pub admin_email: String,
}

impl TestApp {
    /// Boots the full server against `APP_TEST_DATABASE_URL` on a random port.
    pub async fn spawn() -> Self {
        let config = test_config();

        let db_pool = create_pool(&config.database_url)
            .await
            .expect("Failed to create test DB pool");

        run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let state = web::Data::new(AppState::new(
            &config,
            SharedRepositories::new(db_pool.clone()),
            None,
        ));

        let admin_email = format!("admin-{}@example.com", Uuid::new_v4());
        state.auth_handler
            .seed_admin(&admin_email, ADMIN_PASSWORD)
            .await
            .expect("Failed to seed admin");

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let web_root = state.web_root.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(AuthMiddleware)
                .wrap(ApiPathCase)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
                .service(asset_service(&web_root))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self { address, db_pool, client, admin_email }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    #[allow(dead_code)]
    pub async fn admin_token(&self) -> String {
        let response = self.client
            .post(self.url("/api/v1/auth/login"))
            .json(&serde_json::json!({"email": self.admin_email, "password": ADMIN_PASSWORD}))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let auth: Value = response.json().await.unwrap();
        auth["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a skill or category and returns its id.
    #[allow(dead_code)]
    pub async fn create_tag(&self, token: &str, resource: &str, id_field: &str, name: &str) -> i64 {
        let response = self.client
            .post(self.url(&format!("/api/{resource}")))
            .bearer_auth(token)
            .json(&serde_json::json!({"name": name, "description": ""}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.unwrap();
        body[id_field].as_i64().unwrap()
    }

    #[allow(dead_code)]
    pub async fn create_project(&self, token: &str, skill_ids: &[i64], category_ids: &[i64]) -> i64 {
        let response = self.client
            .post(self.url("/api/ProjectsAPI"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "title": format!("Exhibit {}", Uuid::new_v4()),
                "description": "A **pedestal** in the museum",
                "projectUrl": "https://example.com/exhibit",
                "skillIds": skill_ids,
                "categoryIds": category_ids
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.unwrap();
        body["projectId"].as_i64().unwrap()
    }
}

#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[allow(dead_code)]
pub fn into_auth(value: Value) -> AuthResponse {
    AuthResponse::new(
        value["access_token"].as_str().unwrap_or_default().to_string(),
        value["refresh_token"].as_str().unwrap_or_default().to_string(),
    )
}

fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Project Portfolio Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: std::env::var("APP_TEST_DATABASE_URL")
            .expect("APP_TEST_DATABASE_URL must point at a disposable database"),
        redis_url: None,
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        jwt_expiration_minutes: 5,
        refresh_token_secret: "test_refresh_secret_that_is_long_enough_1234567890".into(),
        refresh_token_exp_days: 1,
        web_root: std::env::temp_dir().to_string_lossy().into_owned(),
        max_image_upload_bytes: 1024 * 1024,
        admin_email: None,
        admin_password: None,
        testimonial_rate_limit_per_minute: 100,
        verbose_errors: Some(true),
        trust_x_forwarded_for: false,
    }
}
