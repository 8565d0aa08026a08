use actix_web::web;

use crate::handlers::projects;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projectsapi")
            .service(
                web::resource("")
                    .route(web::get().to(projects::list_projects))
                    .route(web::post().to(projects::create_project))
            )
            // before `/{project_id}` so "filter" is not parsed as an id
            .service(
                web::resource("/filter")
                    .route(web::get().to(projects::filter_projects))
            )
            .service(
                web::resource("/{project_id}")
                    .route(web::get().to(projects::get_project))
                    .route(web::put().to(projects::update_project))
                    .route(web::delete().to(projects::delete_project))
            )
            .service(
                web::resource("/{project_id}/image")
                    .route(web::post().to(projects::upload_project_image))
            )
    );
}
