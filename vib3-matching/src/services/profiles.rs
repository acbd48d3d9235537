use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{ProfileRow, SeekerRow};
use crate::schema::{user_photos, users};

pub fn load_seeker(conn: &mut PgConnection, user_id: Uuid) -> AppResult<SeekerRow> {
    users::table
        .find(user_id)
        .select(SeekerRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

/// Fails with the profile-setup descriptor unless the user may swipe and discover.
pub fn require_complete_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<SeekerRow> {
    let seeker = load_seeker(conn, user_id)?;
    seeker.missing_fields().check()?;
    Ok(seeker)
}

pub fn user_exists(conn: &mut PgConnection, user_id: Uuid) -> AppResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(users::table.find(user_id))).get_result(conn)?)
}

pub fn load_profiles(conn: &mut PgConnection, ids: &[Uuid]) -> AppResult<HashMap<Uuid, ProfileRow>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<ProfileRow> = users::table
        .filter(users::id.eq_any(ids))
        .select(ProfileRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(|r| (r.id, r)).collect())
}

/// Photo URLs per user, primary photo first.
pub fn load_photo_urls(conn: &mut PgConnection, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String)> = user_photos::table
        .filter(user_photos::user_id.eq_any(ids))
        .order((user_photos::user_id, user_photos::position.asc()))
        .select((user_photos::user_id, user_photos::url))
        .load(conn)?;

    let mut urls: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (user_id, url) in rows {
        urls.entry(user_id).or_default().push(url);
    }
    Ok(urls)
}
