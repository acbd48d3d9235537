use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use vib3_shared::clients::checkout;
use vib3_shared::errors::AppResult;
use vib3_shared::types::api::ApiResponse;
use vib3_shared::types::auth::AuthUser;

use crate::models::{MatchCheck, MatchSummary, SwipeRequest, SwipeResult};
use crate::services::swipe_service;
use crate::AppState;

// ---------------------------------------------------------------------------
// POST /match/swipe
// ---------------------------------------------------------------------------

pub async fn swipe(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResult>>> {
    let mut conn = checkout(&state.db)?;
    let result = swipe_service::record_swipe(&mut conn, auth_user.id, payload.target_user_id, payload.liked)?;
    Ok(Json(ApiResponse::ok(result)))
}

// ---------------------------------------------------------------------------
// GET /match/check-match/:user_id
// ---------------------------------------------------------------------------

pub async fn check_match(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MatchCheck>>> {
    let mut conn = checkout(&state.db)?;
    let check = swipe_service::check_match(&mut conn, auth_user.id, user_id)?;
    Ok(Json(ApiResponse::ok(check)))
}

// ---------------------------------------------------------------------------
// GET /match/history
// ---------------------------------------------------------------------------

pub async fn match_history(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchSummary>>>> {
    let mut conn = checkout(&state.db)?;
    let matches = swipe_service::list_matches(&mut conn, auth_user.id)?;
    Ok(Json(ApiResponse::ok(matches)))
}
