use std::path::PathBuf;

use deadpool_redis::Pool as RedisPool;
use redis::AsyncCommands;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod telemetry;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, limiter, utils};

use auth::jwt::JwtService;
use errors::AuthError;
use limiter::rate_limiter::{RateLimitPolicy, RateLimiterStore};
use settings::AppConfig;
use shared_repos::SharedRepositories;
use use_cases::{
    auth::AuthHandler,
    categories::CategoryHandler,
    dashboard::DashboardHandler,
    projects::ProjectHandler,
    skills::SkillHandler,
    testimonials::TestimonialHandler,
};

pub struct AppState {
    pub auth_handler: AuthHandler,
    pub project_handler: ProjectHandler,
    pub skill_handler: SkillHandler,
    pub category_handler: CategoryHandler,
    pub testimonial_handler: TestimonialHandler,
    pub dashboard_handler: DashboardHandler,
    pub testimonial_limiter: RateLimiterStore,
    pub redis_pool: Option<RedisPool>,
    pub web_root: PathBuf,
    pub max_image_upload_bytes: usize,
    pub trust_x_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, repos: SharedRepositories, redis_pool: Option<RedisPool>) -> Self {
        let token_service = std::sync::Arc::new(JwtService::new(config));

        AppState {
            auth_handler: AuthHandler::new(repos.user_repo.clone(), token_service),
            project_handler: ProjectHandler::new(repos.project_repo.clone()),
            skill_handler: SkillHandler::new(repos.skill_repo.clone()),
            category_handler: CategoryHandler::new(repos.category_repo.clone()),
            testimonial_handler: TestimonialHandler::new(repos.testimonial_repo.clone(), repos.project_repo.clone()),
            dashboard_handler: DashboardHandler::new(repos.dashboard_repo.clone()),
            testimonial_limiter: RateLimiterStore::new(RateLimitPolicy::per_minute(
                config.testimonial_rate_limit_per_minute,
            )),
            redis_pool,
            web_root: PathBuf::from(&config.web_root),
            max_image_upload_bytes: config.max_image_upload_bytes,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        }
    }

    /// Puts a token on the deny-list until it would have expired anyway.
    /// Without Redis this is a no-op.
    pub async fn revoke_token(&self, prefix: &str, token: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let Some(pool) = &self.redis_pool else {
            tracing::debug!("Redis not configured, token revocation skipped");
            return Ok(());
        };

        let mut conn = pool
            .get()
            .await
            .map_err(|e| AuthError::RedisConnection(e.to_string()))?;

        conn.set_ex::<_, _, ()>(format!("{prefix}:{token}"), 1, ttl_seconds.max(1))
            .await
            .map_err(|e| AuthError::RedisOperation(e.to_string()))
    }

    pub async fn is_token_revoked(&self, prefix: &str, token: &str) -> Result<bool, AuthError> {
        let Some(pool) = &self.redis_pool else {
            return Ok(false);
        };

        let mut conn = pool
            .get()
            .await
            .map_err(|e| AuthError::RedisConnection(e.to_string()))?;

        conn.exists::<_, bool>(format!("{prefix}:{token}"))
            .await
            .map_err(|e| AuthError::RedisOperation(e.to_string()))
    }
}
