use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    constants::{ACCESS_DENY_PREFIX, ADMIN_PREFIX, AUTH_PREFIX, TESTIMONIALS_PATH, USERS_PREFIX},
    entities::token::Claims,
    errors::AuthError,
    AppState,
};

/// Validates bearer tokens for every non-public request and stores the
/// decoded [`Claims`] in the request extensions.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method()) {
                return service.call(req).await;
            }

            match authorize(&req).await {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                }
                Err(e) => {
                    tracing::warn!(path = %req.path(), method = %req.method(), error = %e, "Request rejected");
                    let response = e.error_response();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

async fn authorize(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState missing in middleware");
            AuthError::MissingAppState
        })?;

    let token = req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::MissingCredentials)?;

    let revoked = state.is_token_revoked(ACCESS_DENY_PREFIX, token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Deny-list lookup failed, allowing token: {}", e);
            false
        });
    if revoked {
        return Err(AuthError::TokenRevoked);
    }

    let claims = state.auth_handler.token_service.decode_jwt(token)?.claims;

    if is_under(req.path(), ADMIN_PREFIX) && !claims.admin {
        return Err(AuthError::Forbidden("Admin access required".into()));
    }

    Ok(claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

fn is_public_route(path: &str, method: &Method) -> bool {
    if method == Method::OPTIONS {
        return true;
    }

    if method == Method::GET || method == Method::HEAD {
        return !is_under(path, ADMIN_PREFIX) && !is_under(path, USERS_PREFIX);
    }

    if method == Method::POST {
        if path == TESTIMONIALS_PATH {
            return true;
        }
        if let Some(endpoint) = path.strip_prefix(AUTH_PREFIX) {
            return matches!(endpoint, "/register" | "/login" | "/refresh-token");
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_reads_are_public() {
        assert!(is_public_route("/api/projectsapi", &Method::GET));
        assert!(is_public_route("/api/projectsapi/filter", &Method::GET));
        assert!(is_public_route("/models/pedestal.glb", &Method::GET));
        assert!(is_public_route("/", &Method::GET));
    }

    #[test]
    fn admin_and_user_reads_need_a_token() {
        assert!(!is_public_route("/api/v1/admin/health", &Method::GET));
        assert!(!is_public_route("/api/v1/users/me", &Method::GET));
        assert!(is_public_route("/api/v1/administrator", &Method::GET));
    }

    #[test]
    fn only_selected_posts_are_public() {
        assert!(is_public_route("/api/testimonialsapi", &Method::POST));
        assert!(is_public_route("/api/v1/auth/login", &Method::POST));
        assert!(is_public_route("/api/v1/auth/refresh-token", &Method::POST));
        assert!(!is_public_route("/api/v1/auth/logout", &Method::POST));
        assert!(!is_public_route("/api/projectsapi", &Method::POST));
        assert!(!is_public_route("/api/testimonialsapi/3", &Method::PUT));
        assert!(is_public_route("/api/projectsapi", &Method::OPTIONS));
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
    }
}
