use actix_web::web;

use crate::handlers::{home::home, static_files::not_found};

mod account;
mod admin;
mod catalog;
mod categories;
mod json_error;
mod projects;
mod skills;
mod testimonials;

/// Registers every route. Paths under `/api` are lowercase; the `ApiPathCase`
/// middleware folds incoming paths to match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(json_error::config_routes);

    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(account::config_routes)
            .configure(admin::config_routes)
            .default_service(web::to(not_found))
    );

    cfg.service(
        web::scope("/api")
            .configure(projects::config_routes)
            .configure(skills::config_routes)
            .configure(categories::config_routes)
            .configure(testimonials::config_routes)
            .configure(catalog::config_routes)
            .default_service(web::to(not_found))
    );
}
