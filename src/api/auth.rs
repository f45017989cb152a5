use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::state::AppState;
use crate::db::{NewUser, UserRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Validate username shape. Usernames are stored exactly as given.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(AppError::BadRequest("Username must be 3-32 characters".to_string()));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError::BadRequest(
            "Username must be alphanumeric, underscore, or hyphen".to_string(),
        ));
    }

    Ok(())
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;

    if req.password.chars().count() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }

    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::BadRequest("First and last name are required".to_string()));
    }

    Ok(())
}

/// POST /api/auth/register
///
/// Registering also logs the new user in.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    validate_registration(&req)?;

    let user = UserRepository::register(
        &state.db,
        &state.hasher,
        NewUser {
            username: req.username,
            password: req.password,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone: req.phone.trim().to_string(),
        },
    )
    .await?;

    UserRepository::touch_login(&state.db, &user.username).await?;
    let token = state.tokens.issue(&user.username)?;

    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if !UserRepository::authenticate(&state.db, &state.hasher, &req.username, &req.password).await? {
        tracing::warn!("🔒 Failed login for {:?}", req.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    UserRepository::touch_login(&state.db, &req.username).await?;
    let token = state.tokens.issue(&req.username)?;

    tracing::debug!("🔓 {} logged in", req.username);
    Ok(Json(TokenResponse { token }))
}
