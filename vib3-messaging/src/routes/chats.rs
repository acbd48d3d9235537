use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use vib3_shared::clients::checkout;
use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::api::ApiResponse;
use vib3_shared::types::auth::AuthUser;
use vib3_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{
    AddParticipantRequest, ChatDetail, ChatSummary, CreateChatRequest, CreatedChat, UpdateRoleRequest,
};
use crate::services::chat_service;
use crate::AppState;

// --- POST /chats ---

pub async fn create_chat(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateChatRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedChat>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    let others = chat_service::other_participants(auth_user.id, &req.participant_ids);
    chat_service::check_participant_count(req.chat_type, &others)?;

    let mut conn = checkout(&state.db)?;
    let result = chat_service::create_chat(&mut conn, auth_user.id, req)?;

    if result.created {
        Ok(ApiResponse::created(result))
    } else {
        Ok((StatusCode::OK, Json(ApiResponse::ok(result))))
    }
}

// --- GET /chats ---

pub async fn list_chats(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<ChatSummary>>>> {
    let mut conn = checkout(&state.db)?;
    let page = chat_service::list_chats(&mut conn, auth_user.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- GET /chats/:id ---

pub async fn get_chat(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ChatDetail>>> {
    let mut conn = checkout(&state.db)?;
    let chat = chat_service::get_chat(&mut conn, auth_user.id, chat_id)?;
    Ok(Json(ApiResponse::ok(chat)))
}

// --- DELETE /chats/:id ---

pub async fn delete_chat(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = checkout(&state.db)?;
    chat_service::delete_chat(&mut conn, auth_user.id, chat_id)?;
    Ok(Json(ApiResponse::ok_with_message(
        serde_json::json!({ "chat_id": chat_id }),
        "chat deleted",
    )))
}

// --- POST /chats/:id/participants ---

pub async fn add_participant(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<AddParticipantRequest>,
) -> AppResult<Json<ApiResponse<ChatDetail>>> {
    let mut conn = checkout(&state.db)?;
    let chat = chat_service::add_participant(&mut conn, auth_user.id, chat_id, req.user_id, req.role)?;
    Ok(Json(ApiResponse::ok(chat)))
}

// --- DELETE /chats/:id/participants/:user_id ---

pub async fn remove_participant(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((chat_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = checkout(&state.db)?;
    chat_service::remove_participant(&mut conn, auth_user.id, chat_id, user_id)?;
    Ok(Json(ApiResponse::ok_with_message(
        serde_json::json!({ "chat_id": chat_id, "user_id": user_id }),
        "participant removed",
    )))
}

// --- PATCH /chats/:id/participants/:user_id ---

pub async fn update_participant_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((chat_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<ChatDetail>>> {
    let mut conn = checkout(&state.db)?;
    let chat = chat_service::update_participant_role(&mut conn, auth_user.id, chat_id, user_id, req.role)?;
    Ok(Json(ApiResponse::ok(chat)))
}
