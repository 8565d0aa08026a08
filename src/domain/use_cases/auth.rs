use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::entities::token::{AuthResponse, Claims};
use crate::entities::user::{LoginUser, NewUser, NewUserResponse, PublicUser, User, UserInsert};
use crate::errors::{AppError, AuthError};
use crate::interfaces::repositories::user::UserRepository;
use crate::auth::password::{hash_password, verify_password};
use crate::repositories::token::TokenServiceRepository;

pub struct AuthHandler {
    pub user_repo: Arc<dyn UserRepository>,
    pub token_service: Arc<dyn TokenServiceRepository>,
}

impl AuthHandler {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<dyn TokenServiceRepository>) -> Self {
        AuthHandler {
            user_repo,
            token_service
        }
    }

    /// Registers a new user after validation and password hashing
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: NewUser) -> Result<NewUserResponse, AppError> {
        request.validate()?;

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let id = self.user_repo.create_user(&user_insert).await?;
        tracing::info!(user_id = %id, "User registered");

        Ok(NewUserResponse {
            id,
            message: "User created successfully".to_string(),
        })
    }

    /// Logs in a user by validating credentials and generating JWTs
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = self.user_repo.get_user_by_email(&request.email)
            .await
            .map_err(|_| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, "User logged in successfully");
        Ok(response)
    }

    pub fn create_auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        let refresh_token = self.token_service.create_refresh_jwt(&user.id)
            .map_err(|e| {
                tracing::warn!("Failed to create refresh JWT: {}", e);
                AuthError::TokenCreation
            })?;
        Ok(AuthResponse::new(access_token, refresh_token))
    }

    /// Issues a new token pair for a valid refresh token. Deny-list checks happen in the caller.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let decoded = self.token_service.decode_refresh_jwt(token)?;
        let user_id = decoded.claims.user_id().ok_or(AuthError::InvalidUserId)?;

        let user = self.user_repo.get_user_by_id(&user_id)
            .await
            .map_err(|_| AuthError::WrongCredentials)?
            .filter(|user| user.deleted_at.is_none())
            .ok_or(AuthError::WrongCredentials)?;

        self.create_auth_response(&user)
    }

    /// The caller's own profile.
    pub async fn me(&self, claims: &Claims) -> Result<PublicUser, AppError> {
        let user_id = requester_id(claims)?;
        self.active_user(&user_id).await.map(PublicUser::from)
    }

    /// Admins may read any account; everyone else only their own.
    pub async fn get_user(&self, user_id: Uuid, claims: &Claims) -> Result<PublicUser, AppError> {
        ensure_self_or_admin(&user_id, claims)?;
        self.active_user(&user_id).await.map(PublicUser::from)
    }

    /// Soft delete; the purge task removes the row a week later.
    #[instrument(skip(self, claims), fields(requested_by = %claims.sub))]
    pub async fn delete_user(&self, user_id: Uuid, claims: &Claims) -> Result<(), AppError> {
        let requester = ensure_self_or_admin(&user_id, claims)?;
        self.user_repo.delete_user(&user_id, &requester).await?;
        tracing::info!(user_id = %user_id, "User soft-deleted");
        Ok(())
    }

    /// Creates a verified admin account unless the email is already taken.
    ///
    /// Returns `true` when an account was created.
    #[instrument(skip(self, password))]
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.get_user_by_email(email).await?.is_some() {
            tracing::debug!("Admin account already present");
            return Ok(false);
        }

        let now = Utc::now();
        let insert = UserInsert {
            email: email.trim().to_lowercase(),
            display_name: Some("Administrator".to_string()),
            password_hash: hash_password(password)?,
            is_admin: true,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        match self.user_repo.create_user(&insert).await {
            Ok(id) => {
                tracing::info!(user_id = %id, "Seeded admin account");
                Ok(true)
            }
            // Another instance seeded it first.
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn active_user(&self, user_id: &Uuid) -> Result<User, AppError> {
        self.user_repo
            .get_user_by_id(user_id)
            .await?
            .filter(|user| user.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

fn requester_id(claims: &Claims) -> Result<Uuid, AppError> {
    claims.user_id().ok_or(AppError::UnauthorizedAccess)
}

fn ensure_self_or_admin(target: &Uuid, claims: &Claims) -> Result<Uuid, AppError> {
    let requester = requester_id(claims)?;
    if claims.admin || requester == *target {
        Ok(requester)
    } else {
        Err(AppError::ForbiddenAccess)
    }
}
