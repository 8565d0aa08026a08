use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use project_portfolio::{
    background_task::start_purge_task,
    db::{postgres::{create_pool, run_migrations}, redis_pool::create_redis_pool},
    errors::set_verbose_errors,
    graceful_shutdown::shutdown_signal,
    handlers::static_files::asset_service,
    middlewares::{api_path::ApiPathCase, auth::AuthMiddleware},
    routes::configure_routes,
    settings::AppConfig,
    shared_repos::SharedRepositories,
    telemetry::init_telemetry,
    AppState,
};

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::LOCATION, header::RETRY_AFTER])
        .max_age(3600);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_telemetry(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_telemetry(config.is_production());
    set_verbose_errors(config.verbose_errors());
    tracing::info!("Loaded configuration: {:?}", config);

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        std::process::exit(1);
    }

    let redis_pool = create_redis_pool(config.redis_url.as_deref());
    if redis_pool.is_none() {
        tracing::warn!("Redis not configured; logout will not revoke tokens");
    }

    let repos = SharedRepositories::new(pool.clone());
    let app_state = web::Data::new(AppState::new(&config, repos.clone(), redis_pool));

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if let Err(e) = app_state.auth_handler.seed_admin(email, password).await {
            tracing::error!("Failed to seed admin account: {}", e);
        }
    }

    app_state.testimonial_limiter.spawn_eviction();
    tokio::spawn(start_purge_task(repos.user_repo.clone()));

    let server_addr = format!("{}:{}", config.host, config.port);
    let cors_origins = config.cors_origins();
    let web_root = app_state.web_root.clone();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(AuthMiddleware)
            .wrap(ApiPathCase)
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&cors_origins))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
            .service(asset_service(&web_root))
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
