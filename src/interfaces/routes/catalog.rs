use actix_web::web;

use crate::handlers::catalog;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/accessibility")
            .route(web::get().to(catalog::accessibility))
    );
}
