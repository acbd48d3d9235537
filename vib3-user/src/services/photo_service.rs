use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewUserPhoto, UserPhoto};
use crate::schema::user_photos;
use crate::services::profile_service;

/// File extension for an accepted image content type.
pub fn image_extension(content_type: &str) -> AppResult<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/webp" => Ok("webp"),
        "image/gif" => Ok("gif"),
        _ => Err(AppError::Validation(
            "unsupported image format, accepted: jpeg, png, webp, gif".into(),
        )),
    }
}

pub fn check_size(len: usize, max_bytes: usize) -> AppResult<()> {
    if len == 0 {
        return Err(AppError::Validation("uploaded file is empty".into()));
    }
    if len > max_bytes {
        return Err(AppError::new(
            ErrorCode::PayloadTooLarge,
            format!("photo exceeds the {} MB limit", max_bytes / (1024 * 1024)),
        ));
    }
    Ok(())
}

pub fn storage_key(user_id: Uuid, ext: &str) -> String {
    format!("users/{}/{}.{}", user_id, Uuid::now_v7(), ext)
}

pub fn ensure_capacity(conn: &mut PgConnection, user_id: Uuid, max_photos: i64) -> AppResult<()> {
    let count: i64 = user_photos::table
        .filter(user_photos::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    if count >= max_photos {
        return Err(AppError::new(
            ErrorCode::TooManyPhotos,
            format!("a profile can hold at most {max_photos} photos"),
        ));
    }
    Ok(())
}

/// Appends the photo at the end of the sequence and refreshes completeness.
pub fn attach_photo(
    conn: &mut PgConnection,
    user_id: Uuid,
    url: &str,
    key: &str,
    max_photos: i64,
) -> AppResult<UserPhoto> {
    conn.transaction::<_, AppError, _>(|conn| {
        // Serialises concurrent uploads for the same user.
        profile_service::lock_user(conn, user_id)?;
        ensure_capacity(conn, user_id, max_photos)?;

        let next_position: Option<i32> = user_photos::table
            .filter(user_photos::user_id.eq(user_id))
            .select(diesel::dsl::max(user_photos::position))
            .first(conn)?;

        let photo = diesel::insert_into(user_photos::table)
            .values(&NewUserPhoto {
                id: Uuid::now_v7(),
                user_id,
                url,
                storage_key: key,
                position: next_position.map_or(0, |p| p + 1),
            })
            .returning(UserPhoto::as_returning())
            .get_result(conn)?;

        profile_service::refresh_completeness(conn, user_id)?;
        Ok(photo)
    })
}

/// Removes the photo, closes the gap in positions and refreshes completeness.
/// Returns the removed record so the caller can delete the stored object.
pub fn detach_photo(conn: &mut PgConnection, user_id: Uuid, photo_id: Uuid) -> AppResult<UserPhoto> {
    conn.transaction::<_, AppError, _>(|conn| {
        profile_service::lock_user(conn, user_id)?;

        let photo: UserPhoto = user_photos::table
            .filter(user_photos::id.eq(photo_id))
            .filter(user_photos::user_id.eq(user_id))
            .select(UserPhoto::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

        diesel::delete(user_photos::table.find(photo.id)).execute(conn)?;

        diesel::update(
            user_photos::table
                .filter(user_photos::user_id.eq(user_id))
                .filter(user_photos::position.gt(photo.position)),
        )
        .set(user_photos::position.eq(user_photos::position - 1))
        .execute(conn)?;

        profile_service::refresh_completeness(conn, user_id)?;
        Ok(photo)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpg");
        assert_eq!(image_extension("image/webp").unwrap(), "webp");
        let err = image_extension("application/pdf").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
    }

    #[test]
    fn size_limit_is_enforced() {
        let max = 5 * 1024 * 1024;
        assert!(check_size(1024, max).is_ok());
        assert_eq!(check_size(max + 1, max).unwrap_err().error_code(), ErrorCode::PayloadTooLarge);
        assert_eq!(check_size(0, max).unwrap_err().error_code(), ErrorCode::ValidationError);
    }

    #[test]
    fn storage_keys_are_scoped_per_user() {
        let user_id = Uuid::new_v4();
        let key = storage_key(user_id, "png");
        assert!(key.starts_with(&format!("users/{user_id}/")));
        assert!(key.ends_with(".png"));
        assert_ne!(key, storage_key(user_id, "png"));
    }
}
