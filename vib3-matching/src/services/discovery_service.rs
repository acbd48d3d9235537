use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::AppResult;

use crate::matching::candidates::{self, BoundingBox, MAX_CANDIDATES};
use crate::models::{Candidate, ProfileRow};
use crate::schema::{swipes, users};
use crate::services::profiles;

/// Profiles the user has not swiped yet, filtered by both sides' preferences
/// and ordered nearest first.
pub fn find_candidates(conn: &mut PgConnection, user_id: Uuid, scan_limit: i64) -> AppResult<Vec<Candidate>> {
    let seeker = profiles::require_complete_profile(conn, user_id)?.into_seeker();
    let (age_min, age_max) = seeker.age_range();

    let already_swiped = swipes::table
        .filter(swipes::user_id.eq(user_id))
        .select(swipes::target_id);

    let mut query = users::table
        .filter(users::id.ne(user_id))
        .filter(users::profile_complete.eq(true))
        .filter(users::is_active.eq(true))
        .filter(diesel::dsl::not(users::id.eq_any(already_swiped)))
        .filter(users::age.between(age_min, age_max))
        .select(ProfileRow::as_select())
        .order(users::last_active_at.desc())
        .limit(scan_limit)
        .into_boxed();

    if !seeker.preferred_genders.is_empty() {
        query = query.filter(users::gender.eq_any(seeker.preferred_genders.clone()));
    }
    // Narrow to the distance window before the scan cap applies.
    if let Some(center) = seeker.location {
        let bbox = BoundingBox::around(center, seeker.max_distance());
        let (min_lat, max_lat) = bbox.latitude;
        query = query
            .filter(users::longitude.is_not_null())
            .filter(users::latitude.between(min_lat, max_lat));
        if let Some((min_lng, max_lng)) = bbox.longitude {
            query = query.filter(users::longitude.between(min_lng, max_lng));
        }
    }

    let rows: Vec<ProfileRow> = query.load(conn)?;
    let prospects = rows.iter().map(ProfileRow::prospect).collect();
    let ranked = candidates::rank(&seeker, prospects, MAX_CANDIDATES);

    let ids: Vec<Uuid> = ranked.iter().map(|r| r.id).collect();
    let mut photos = profiles::load_photo_urls(conn, &ids)?;
    let mut rows_by_id: std::collections::HashMap<Uuid, ProfileRow> =
        rows.into_iter().map(|r| (r.id, r)).collect();

    let result: Vec<Candidate> = ranked
        .into_iter()
        .filter_map(|r| {
            let row = rows_by_id.remove(&r.id)?;
            Some(Candidate {
                id: row.id,
                name: row.name,
                age: row.age,
                gender: row.gender,
                bio: row.bio,
                interests: row.interests,
                photos: photos.remove(&row.id).unwrap_or_default(),
                city: row.city,
                country: row.country,
                distance_km: r.distance_km.map(|d| (d * 10.0).round() / 10.0),
            })
        })
        .collect();

    tracing::debug!(user_id = %user_id, count = result.len(), "candidates ranked");
    Ok(result)
}
