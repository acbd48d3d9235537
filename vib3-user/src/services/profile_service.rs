use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::profile::{is_profile_complete, Gender};

use crate::models::{NewUser, RegisterRequest, UpdateProfileRequest, User, UserChangeset, UserPhoto, UserProfile};
use crate::schema::{chat_participants, chats, user_photos, users};

pub fn find_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

/// Row-locks the user for the rest of the transaction.
pub fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn load_photos(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<UserPhoto>> {
    Ok(user_photos::table
        .filter(user_photos::user_id.eq(user_id))
        .order((user_photos::position.asc(), user_photos::created_at.asc()))
        .select(UserPhoto::as_select())
        .load(conn)?)
}

pub fn load_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<UserProfile> {
    let user = find_user(conn, user_id)?;
    let photos = load_photos(conn, user_id)?;
    Ok(UserProfile::new(user, photos))
}

pub fn create_user(
    conn: &mut PgConnection,
    req: &RegisterRequest,
    password_hash: &str,
) -> AppResult<User> {
    let email = req.email.trim().to_lowercase();
    let new_user = NewUser {
        id: Uuid::now_v7(),
        email: &email,
        password_hash,
        name: req.name.trim(),
        age: req.age,
        gender: req.gender.map(|g| g.as_str()),
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AppError::new(ErrorCode::EmailAlreadyExists, "email already registered")
            }
            other => other.into(),
        })
}

pub fn find_by_email(conn: &mut PgConnection, email: &str) -> AppResult<Option<User>> {
    Ok(users::table
        .filter(users::email.eq(email.trim().to_lowercase()))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

pub fn touch_last_active(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    diesel::update(users::table.find(user_id))
        .set(users::last_active_at.eq(Utc::now()))
        .execute(conn)?;
    Ok(())
}

/// Trims, drops blanks and removes duplicates while keeping first-seen order.
pub fn normalize_interests(interests: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(interests.len());
    for interest in interests {
        let trimmed = interest.trim();
        if !trimmed.is_empty() && !out.iter().any(|seen| seen == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn normalize_genders(genders: Vec<Gender>) -> Vec<String> {
    let mut out: Vec<Gender> = Vec::with_capacity(genders.len());
    for gender in genders {
        if !out.contains(&gender) {
            out.push(gender);
        }
    }
    out.into_iter().map(|g| g.as_str().to_string()).collect()
}

/// Turns a validated request into a column changeset, checking the age range
/// against the values that will be stored after the write.
pub fn build_changeset(req: UpdateProfileRequest, current: &User) -> AppResult<UserChangeset> {
    let mut changes = UserChangeset {
        name: req.name.map(|n| n.trim().to_string()),
        age: req.age,
        gender: req.gender.map(|g| g.as_str().to_string()),
        bio: req.bio.map(|b| b.trim().to_string()),
        interests: req.interests.map(normalize_interests),
        ..UserChangeset::default()
    };

    if changes.name.as_deref() == Some("") {
        return Err(AppError::new(ErrorCode::InvalidProfile, "name cannot be blank"));
    }

    if let Some(location) = req.location {
        changes.longitude = Some(location.longitude);
        changes.latitude = Some(location.latitude);
        changes.city = location.city;
        changes.country = location.country;
    }

    if let Some(prefs) = req.preferences {
        let age_min = prefs.age_min.unwrap_or(current.age_min);
        let age_max = prefs.age_max.unwrap_or(current.age_max);
        if age_min > age_max {
            return Err(AppError::new(
                ErrorCode::InvalidProfile,
                "age_min cannot be greater than age_max",
            ));
        }
        changes.preferred_genders = prefs.genders.map(normalize_genders);
        changes.age_min = prefs.age_min;
        changes.age_max = prefs.age_max;
        changes.max_distance_km = prefs.max_distance_km;
    }

    Ok(changes)
}

/// Recomputes `profile_complete` from the stored state and persists it when it changed.
pub fn refresh_completeness(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    let user = find_user(conn, user_id)?;
    let photo_count: i64 = user_photos::table
        .filter(user_photos::user_id.eq(user_id))
        .count()
        .get_result(conn)?;

    let complete = is_profile_complete(
        &user.name,
        user.age,
        user.gender.as_deref(),
        &user.bio,
        photo_count as usize,
    );

    if complete == user.profile_complete {
        return Ok(user);
    }

    let updated = diesel::update(users::table.find(user_id))
        .set(users::profile_complete.eq(complete))
        .returning(User::as_returning())
        .get_result(conn)?;

    tracing::info!(user_id = %user_id, profile_complete = complete, "profile completeness changed");
    Ok(updated)
}

pub fn update_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<UserProfile> {
    conn.transaction::<_, AppError, _>(|conn| {
        let current = lock_user(conn, user_id)?;
        let changes = build_changeset(req, &current)?;
        diesel::update(users::table.find(user_id))
            .set((&changes, users::updated_at.eq(Utc::now())))
            .execute(conn)?;

        let user = refresh_completeness(conn, user_id)?;
        let photos = load_photos(conn, user_id)?;
        Ok(UserProfile::new(user, photos))
    })
}

/// Hard-deletes the account. Rows keyed on the user go with it through
/// `ON DELETE CASCADE`; direct chats are soft-deleted first because they can
/// no longer hold two participants. Returns the storage keys of the removed
/// photos so the caller can clean up media after commit.
pub fn delete_account(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<String>> {
    conn.transaction::<_, AppError, _>(|conn| {
        find_user(conn, user_id)?;

        let storage_keys: Vec<String> = user_photos::table
            .filter(user_photos::user_id.eq(user_id))
            .select(user_photos::storage_key)
            .load(conn)?;

        let direct_chat_ids = chat_participants::table
            .filter(chat_participants::user_id.eq(user_id))
            .select(chat_participants::chat_id);

        let closed = diesel::update(
            chats::table
                .filter(chats::chat_type.eq("direct"))
                .filter(chats::is_deleted.eq(false))
                .filter(chats::id.eq_any(direct_chat_ids)),
        )
        .set((
            chats::is_deleted.eq(true),
            chats::direct_key.eq(None::<String>),
            chats::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

        diesel::delete(users::table.find(user_id)).execute(conn)?;

        tracing::info!(user_id = %user_id, direct_chats_closed = closed, "account deleted");
        Ok(storage_keys)
    })
}
