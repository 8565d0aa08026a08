use actix_web::web;

use crate::handlers::{auth, users};

/// `/auth/*` is public apart from logout; `/users/*` always needs a bearer token.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::refresh_token)
            .service(auth::logout),
    )
    .service(
        web::scope("/users")
            .route("/me", web::get().to(users::me))
            .service(
                web::resource("/{user_id}")
                    .route(web::get().to(users::get_user))
                    .route(web::delete().to(users::delete_user)),
            ),
    );
}
