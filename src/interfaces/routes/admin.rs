use actix_web::web;

use crate::handlers::{catalog, system::admin_health_check};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_health_check)
            .service(catalog::admin_dashboard)
    );
}
