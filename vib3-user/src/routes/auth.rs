use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use vib3_shared::clients::checkout;
use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::auth::AccessToken;
use vib3_shared::types::ApiResponse;

use crate::models::{LoginRequest, RegisterRequest, UserProfile};
use crate::services::{auth_service, profile_service};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: UserProfile,
}

// --- POST /auth/register ---

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    auth_service::validate_password(&req.password)?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = checkout(&state.db)?;

    let user = profile_service::create_user(&mut conn, &req, &password_hash)?;
    let token = auth_service::issue_access_token(user.id, state.config.jwt_access_ttl)?;

    tracing::info!(user_id = %user.id, "user registered");
    metrics::counter!("users_registered_total").increment(1);

    Ok(ApiResponse::created(AuthResponse {
        token,
        user: UserProfile::new(user, Vec::new()),
    }))
}

// --- POST /auth/login ---

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || AppError::new(ErrorCode::InvalidCredentials, "invalid email or password");

    let mut conn = checkout(&state.db)?;
    let user = profile_service::find_by_email(&mut conn, &req.email)?.ok_or_else(invalid)?;

    if !auth_service::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    profile_service::touch_last_active(&mut conn, user.id)?;
    let token = auth_service::issue_access_token(user.id, state.config.jwt_access_ttl)?;
    let profile = profile_service::load_profile(&mut conn, user.id)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(AuthResponse { token, user: profile })))
}
