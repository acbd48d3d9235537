use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use vib3_shared::clients::checkout;
use vib3_shared::errors::AppResult;
use vib3_shared::types::api::ApiResponse;
use vib3_shared::types::auth::AuthUser;

use crate::models::{HistoryParams, MatchMessageRequest, MessageView};
use crate::services::match_thread_service;
use crate::AppState;

// --- POST /chat ---

pub async fn send(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<MatchMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MessageView>>)> {
    let match_id = req.match_id;
    let (outgoing, client_id) = req.message.into_outgoing()?;

    let mut conn = checkout(&state.db)?;
    let mut message = match_thread_service::send_match_message(&mut conn, auth_user.id, match_id, &outgoing)?;
    message.client_id = client_id;

    Ok(ApiResponse::created(message))
}

// --- GET /chat/:match_id ---

pub async fn history(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<ApiResponse<Vec<MessageView>>>> {
    let mut conn = checkout(&state.db)?;
    let messages = match_thread_service::get_match_messages(&mut conn, auth_user.id, match_id, &params)?;
    Ok(Json(ApiResponse::ok(messages)))
}
