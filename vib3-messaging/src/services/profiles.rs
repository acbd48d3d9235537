use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::schema::{user_photos, users};

/// Name and primary photo, enough to label a participant.
#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub name: String,
    pub photo: Option<String>,
}

pub fn load_cards(conn: &mut PgConnection, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, ProfileCard>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let names: Vec<(Uuid, String)> = users::table
        .filter(users::id.eq_any(user_ids))
        .select((users::id, users::name))
        .load(conn)?;

    let photos: Vec<(Uuid, String)> = user_photos::table
        .filter(user_photos::user_id.eq_any(user_ids))
        .order((user_photos::user_id, user_photos::position.asc()))
        .select((user_photos::user_id, user_photos::url))
        .load(conn)?;

    let mut primary: HashMap<Uuid, String> = HashMap::new();
    for (user_id, url) in photos {
        primary.entry(user_id).or_insert(url);
    }

    Ok(names
        .into_iter()
        .map(|(id, name)| {
            let photo = primary.remove(&id);
            (id, ProfileCard { name, photo })
        })
        .collect())
}

/// Fails with `UserNotFound` unless every id names an existing user.
pub fn require_users(conn: &mut PgConnection, user_ids: &[Uuid]) -> AppResult<()> {
    let found: i64 = users::table
        .filter(users::id.eq_any(user_ids))
        .count()
        .get_result(conn)?;
    if found as usize != user_ids.len() {
        return Err(AppError::new(ErrorCode::UserNotFound, "one or more participants do not exist"));
    }
    Ok(())
}
