use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use vib3_shared::clients::checkout;
use vib3_shared::errors::AppResult;
use vib3_shared::types::api::ApiResponse;
use vib3_shared::types::auth::AuthUser;

use crate::models::{HistoryParams, MessageDeleted, MessageView, ReactionRequest, Reaction, SendMessageRequest};
use crate::services::message_service;
use crate::AppState;

// ---------------------------------------------------------------------------
// GET /chats/:id/messages
// ---------------------------------------------------------------------------

pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<ApiResponse<Vec<MessageView>>>> {
    let mut conn = checkout(&state.db)?;
    let messages = message_service::get_chat_messages(&mut conn, auth_user.id, chat_id, &params)?;
    Ok(Json(ApiResponse::ok(messages)))
}

// ---------------------------------------------------------------------------
// POST /chats/:id/messages
// ---------------------------------------------------------------------------

pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MessageView>>)> {
    let (outgoing, client_id) = req.into_outgoing()?;

    let mut conn = checkout(&state.db)?;
    let mut message = message_service::send_message(&mut conn, auth_user.id, chat_id, &outgoing)?;
    message.client_id = client_id;

    Ok(ApiResponse::created(message))
}

// ---------------------------------------------------------------------------
// POST /chats/:id/read
// ---------------------------------------------------------------------------

pub async fn mark_as_read(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = checkout(&state.db)?;
    let marked = message_service::mark_chat_read(&mut conn, auth_user.id, chat_id)?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "chat_id": chat_id, "marked": marked }))))
}

// ---------------------------------------------------------------------------
// DELETE /messages/:id
// ---------------------------------------------------------------------------

pub async fn delete_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MessageDeleted>>> {
    let mut conn = checkout(&state.db)?;
    let deleted = message_service::delete_message(&mut conn, auth_user.id, message_id)?;
    Ok(Json(ApiResponse::ok(deleted)))
}

// ---------------------------------------------------------------------------
// POST /messages/:id/reactions
// ---------------------------------------------------------------------------

pub async fn react(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
    Json(req): Json<ReactionRequest>,
) -> AppResult<Json<ApiResponse<Vec<Reaction>>>> {
    crate::chat::reactions::validate_emoji(&req.emoji)?;

    let mut conn = checkout(&state.db)?;
    let reactions = message_service::add_reaction(&mut conn, auth_user.id, message_id, &req.emoji)?;
    Ok(Json(ApiResponse::ok(reactions)))
}
