use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use vib3_shared::clients::checkout;
use vib3_shared::errors::{AppError, AppResult};
use vib3_shared::types::auth::AuthUser;
use vib3_shared::types::ApiResponse;

use crate::models::UserProfile;
use crate::services::{photo_service, profile_service};
use crate::AppState;

/// Content type and bytes of the `file` part; other parts are skipped.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read file data: {e}")))?;
        return Ok((content_type, data));
    }
    Err(AppError::Validation("no file provided".into()))
}

// --- POST /user/me/photos ---

pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let (content_type, data) = read_file_field(&mut multipart).await?;
    let ext = photo_service::image_extension(&content_type)?;
    photo_service::check_size(data.len(), state.config.max_photo_bytes)?;

    let max_photos = state.config.max_photos;
    {
        let mut conn = checkout(&state.db)?;
        profile_service::find_user(&mut conn, user.id)?;
        photo_service::ensure_capacity(&mut conn, user.id, max_photos)?;
    }

    let key = photo_service::storage_key(user.id, ext);
    let stored = state.media.upload(&key, data.to_vec(), &content_type).await?;

    let attached = {
        let mut conn = checkout(&state.db)?;
        photo_service::attach_photo(&mut conn, user.id, &stored.url, &stored.key, max_photos)
            .and_then(|_| profile_service::load_profile(&mut conn, user.id))
    };

    match attached {
        Ok(profile) => {
            tracing::info!(user_id = %user.id, key = %stored.key, "photo uploaded");
            Ok(ApiResponse::created(profile))
        }
        Err(e) => {
            if let Err(cleanup) = state.media.delete(&stored.key).await {
                tracing::warn!(key = %stored.key, error = %cleanup, "orphaned photo object");
            }
            Err(e)
        }
    }
}

// --- DELETE /user/me/photos/:photo_id ---

pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let (removed, profile) = {
        let mut conn = checkout(&state.db)?;
        let removed = photo_service::detach_photo(&mut conn, user.id, photo_id)?;
        (removed, profile_service::load_profile(&mut conn, user.id)?)
    };

    if let Err(e) = state.media.delete(&removed.storage_key).await {
        tracing::warn!(key = %removed.storage_key, error = %e, "orphaned photo object");
    }

    tracing::info!(user_id = %user.id, photo_id = %photo_id, "photo removed");
    Ok(Json(ApiResponse::ok(profile)))
}
