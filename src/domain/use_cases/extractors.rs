use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use crate::{entities::token::Claims, errors::AuthError};

fn request_claims(req: &HttpRequest) -> Result<Claims, AuthError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(AuthError::MissingCredentials)
}

/// Claims placed on the request by the auth middleware. 401 when absent.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(request_claims(req).map(AuthClaims).map_err(Into::into))
    }
}

/// Like [`AuthClaims`], but 403 unless the admin claim is set.
#[derive(Debug)]
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = request_claims(req).and_then(|claims| {
            if claims.admin {
                Ok(AdminClaims(claims))
            } else {
                Err(AuthError::Forbidden("Admin access required".into()))
            }
        });
        ready(result.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::token::TokenType;
    use actix_web::{http::StatusCode, test::TestRequest};

    fn claims(admin: bool) -> Claims {
        Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "visitor@example.com".into(),
            admin,
            verified: true,
            token_type: TokenType::Access,
            exp: usize::MAX,
            iat: 0,
        }
    }

    #[actix_rt::test]
    async fn admin_extractor_rejects_regular_users() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(false));

        let err = AdminClaims::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn missing_claims_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = AuthClaims::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn admin_extractor_accepts_admins() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(true));
        assert!(AdminClaims::extract(&req).await.is_ok());
    }
}
