use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    auth::jwt::remaining_ttl,
    constants::{ACCESS_DENY_PREFIX, REFRESH_DENY_PREFIX},
    entities::{
        token::RefreshTokenRequest,
        user::{LoginUser, NewUser},
    },
    errors::{AppError, AuthError},
    middlewares::auth::bearer_token,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[post("/register")]
#[instrument(skip_all)]
pub async fn register(
    state: web::Data<AppState>,
    user: web::Json<NewUser>
) -> Result<impl Responder, AppError> {
    let response = state.auth_handler.register(user.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/login")]
#[instrument(skip_all)]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>
) -> Result<impl Responder, AuthError> {
    let auth_response = state.auth_handler.login(user.into_inner()).await?;
    Ok(HttpResponse::Ok().json(auth_response))
}

/// Exchanges a refresh token for a new pair. The presented token is revoked,
/// so each refresh token works once.
#[post("/refresh-token")]
#[instrument(skip_all)]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, AuthError> {
    let token = request.refresh_token.as_str();

    let revoked = state.is_token_revoked(REFRESH_DENY_PREFIX, token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Deny-list lookup failed: {}", e);
            false
        });
    if revoked {
        return Err(AuthError::TokenRevoked);
    }

    let previous = state.auth_handler.token_service.decode_refresh_jwt(token)?.claims;
    let auth_response = state.auth_handler.refresh_token(token).await?;

    if let Some(ttl) = remaining_ttl(previous.exp) {
        if let Err(e) = state.revoke_token(REFRESH_DENY_PREFIX, token, ttl).await {
            tracing::warn!("Failed to revoke rotated refresh token: {}", e);
        }
    }

    Ok(HttpResponse::Ok().json(auth_response))
}

/// Revokes the caller's access token and the supplied refresh token.
#[post("/logout")]
#[instrument(skip_all, fields(user_id = %claims.0.sub))]
pub async fn logout(
    request: HttpRequest,
    claims: AuthClaims,
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>
) -> Result<impl Responder, AuthError> {
    let access_token = request.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::MissingCredentials)?;

    let refresh_claims = state.auth_handler.token_service
        .decode_refresh_jwt(&body.refresh_token)?
        .claims;
    if !refresh_claims.belongs_to(&claims.0) {
        return Err(AuthError::InvalidToken);
    }

    if let Some(ttl) = remaining_ttl(claims.0.exp) {
        state.revoke_token(ACCESS_DENY_PREFIX, access_token, ttl).await?;
    }
    if let Some(ttl) = remaining_ttl(refresh_claims.exp) {
        state.revoke_token(REFRESH_DENY_PREFIX, &body.refresh_token, ttl).await?;
    }

    tracing::info!("User logged out");
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"})))
}
