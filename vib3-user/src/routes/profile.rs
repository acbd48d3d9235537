use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use vib3_shared::clients::checkout;
use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::auth::AuthUser;
use vib3_shared::types::profile::GateDescriptor;
use vib3_shared::types::ApiResponse;

use crate::models::{UpdateProfileRequest, UserProfile};
use crate::services::profile_service;
use crate::AppState;

// --- GET /user/me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let mut conn = checkout(&state.db)?;
    let profile = profile_service::load_profile(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PUT /user/me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::InvalidProfile, e.to_string()))?;

    let mut conn = checkout(&state.db)?;
    let profile = profile_service::update_profile(&mut conn, user.id, req)?;

    tracing::info!(user_id = %user.id, profile_complete = profile.profile_complete, "profile updated");

    Ok(Json(ApiResponse::ok_with_message(profile, "profile updated successfully")))
}

// --- DELETE /user/me ---

pub async fn delete_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<()>>> {
    let storage_keys = {
        let mut conn = checkout(&state.db)?;
        profile_service::delete_account(&mut conn, user.id)?
    };

    // Media cleanup happens after commit and never fails the request.
    for key in &storage_keys {
        if let Err(e) = state.media.delete(key).await {
            tracing::warn!(user_id = %user.id, key = %key, error = %e, "orphaned photo object");
        }
    }

    Ok(Json(ApiResponse::ok_with_message((), "your account has been permanently deleted")))
}

// --- GET /user/me/completeness ---

pub async fn completeness(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<GateDescriptor>>> {
    let mut conn = checkout(&state.db)?;
    let record = profile_service::find_user(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(record.missing_fields().descriptor())))
}
