use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use std::{
    time::Duration,
    sync::{atomic::{AtomicI64, Ordering}, RwLock},
};
use sysinfo::System;
use serde::Serialize;

use crate::{constants::START_TIME, use_cases::extractors::AdminClaims, AppState};

const CACHE_SECONDS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    database: String,
    redis_status: String,
    version: String,
    memory_usage: String,
    rate_limited_clients: usize,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn redis_status(state: &AppState) -> &'static str {
    let Some(pool) = &state.redis_pool else {
        return "Not configured";
    };

    match pool.get().await {
        Ok(mut conn) => {
            match redis::cmd("PING").query_async::<String>(&mut conn).await {
                Ok(pong) if pong == "PONG" => "OK",
                _ => "Unavailable",
            }
        }
        Err(_) => "Unavailable",
    }
}

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_seconds = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;
    let human_uptime = format_duration(Duration::from_secs(uptime_seconds));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let database = match state.auth_handler.user_repo.check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "Unavailable"
        }
    };

    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0));

    let status = if database == "OK" { "healthy" } else { "degraded" };

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
        database: database.to_string(),
        redis_status: redis_status(state).await.to_string(),
        rate_limited_clients: state.testimonial_limiter.tracked_keys(),
        system: system_info,
    }
}

/// Admin-only service health. Results are cached for five seconds.
#[get("/health")]
pub async fn admin_health_check(_admin: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_SECONDS {
        let response = build_health_response(&state).await;

        if let Ok(mut cache) = CACHED_STATUS.write() {
            *cache = response.clone();
            LAST_CHECK.store(now, Ordering::Relaxed);
        }

        return HttpResponse::Ok().json(response);
    }

    let cached = CACHED_STATUS.read()
        .map(|response| response.clone())
        .map_err(|e| e.to_string());
    match cached {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            tracing::warn!("HealthCheck cache lock poisoned: {}", e);
            let response = build_health_response(&state).await;
            HttpResponse::Ok().json(response)
        }
    }
}
