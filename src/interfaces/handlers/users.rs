use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;
use uuid::Uuid;

use crate::{errors::AppError, use_cases::extractors::AuthClaims, AppState};

pub async fn me(
    state: web::Data<AppState>,
    claims: AuthClaims,
) -> Result<impl Responder, AppError> {
    let user = state.auth_handler.me(&claims.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    claims: AuthClaims,
) -> Result<impl Responder, AppError> {
    let user = state.auth_handler.get_user(user_id.into_inner(), &claims.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(state, claims))]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    claims: AuthClaims,
) -> Result<impl Responder, AppError> {
    state.auth_handler.delete_user(user_id.into_inner(), &claims.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{header, StatusCode}, test};
    use uuid::Uuid;

    use crate::test_support::{bearer, test_app, MockRepos};

    #[actix_rt::test]
    async fn profile_routes_need_a_token() {
        let app = test_app!(MockRepos::default().into_state());

        let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn users_cannot_delete_each_other() {
        let mut repos = MockRepos::default();
        repos.users.expect_delete_user().never();
        let app = test_app!(repos.into_state());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", Uuid::new_v4()))
            .insert_header((header::AUTHORIZATION, bearer(false)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
