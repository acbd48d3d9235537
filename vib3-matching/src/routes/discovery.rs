use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use vib3_shared::clients::checkout;
use vib3_shared::errors::AppResult;
use vib3_shared::types::api::ApiResponse;
use vib3_shared::types::auth::AuthUser;

use crate::models::Candidate;
use crate::services::discovery_service;
use crate::AppState;

// GET /match
pub async fn candidates(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Candidate>>>> {
    let mut conn = checkout(&state.db)?;
    let found = discovery_service::find_candidates(&mut conn, auth_user.id, state.config.candidate_scan_limit)?;
    Ok(Json(ApiResponse::ok(found)))
}
