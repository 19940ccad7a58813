use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::Admins,
    error::{AppError, AppResult},
    models::AdminProfile,
    state::AppState,
};

/// Principal of a valid bearer token. Says nothing about admin rights.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Allow-list check that must precede every admin mutation.
pub async fn ensure_admin(state: &AppState, user: &AuthUser) -> AppResult<AdminProfile> {
    let admin = Admins::find_by_id(user.user_id).one(state.db()).await?;
    let Some(admin) = admin else {
        tracing::info!(user_id = %user.user_id, "admin access denied");
        return Err(AppError::Forbidden);
    };
    Ok(AdminProfile {
        id: admin.id,
        email: user.email.clone(),
        full_name: admin.full_name,
    })
}

/// Whether `user_id` is on the allow-list, without failing.
pub async fn is_admin(state: &AppState, user_id: Uuid) -> AppResult<bool> {
    Ok(Admins::find_by_id(user_id).one(state.db()).await?.is_some())
}

pub fn decode_token(secret: &str, token: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        };

        decode_token(&state.config.jwt_secret, token.trim())
    }
}
