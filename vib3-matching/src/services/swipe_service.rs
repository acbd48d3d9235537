use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::UserPair;

use crate::matching::swipe::{self, Promotion, SwipeEntry};
use crate::models::{Match, MatchCheck, MatchSummary, NewMatch, NewSwipe, PublicProfile, SwipeResult};
use crate::schema::{matches, swipes};
use crate::services::profiles;

/// Appends the swipe to the pair's log and promotes the pair when both sides
/// have liked. The pair row is locked so reciprocal swipes serialise.
pub fn record_swipe(
    conn: &mut PgConnection,
    actor: Uuid,
    target: Uuid,
    liked: bool,
) -> AppResult<SwipeResult> {
    let pair = UserPair::new(actor, target)
        .ok_or_else(|| AppError::new(ErrorCode::CannotSwipeSelf, "you cannot swipe on yourself"))?;

    profiles::require_complete_profile(conn, actor)?;
    if !profiles::user_exists(conn, target)? {
        return Err(AppError::new(ErrorCode::SwipeTargetNotFound, "target user not found"));
    }

    let (record, promotion) = conn.transaction::<_, AppError, _>(|conn| {
        diesel::insert_into(matches::table)
            .values(&NewMatch {
                id: Uuid::now_v7(),
                user_low: pair.low(),
                user_high: pair.high(),
            })
            .on_conflict((matches::user_low, matches::user_high))
            .do_nothing()
            .execute(conn)?;

        let record: Match = matches::table
            .filter(matches::user_low.eq(pair.low()))
            .filter(matches::user_high.eq(pair.high()))
            .select(Match::as_select())
            .for_update()
            .first(conn)?;

        diesel::insert_into(swipes::table)
            .values(&NewSwipe {
                id: Uuid::now_v7(),
                match_id: record.id,
                user_id: actor,
                target_id: target,
                liked,
                created_at: Utc::now(),
            })
            .execute(conn)?;

        let log: Vec<SwipeEntry> = swipes::table
            .filter(swipes::match_id.eq(record.id))
            .select((swipes::user_id, swipes::liked))
            .load::<(Uuid, bool)>(conn)?
            .into_iter()
            .map(|(user_id, liked)| SwipeEntry { user_id, liked })
            .collect();

        let promotion = swipe::evaluate(&pair, &log, record.matched);
        if promotion == Promotion::Promoted {
            let now = Utc::now();
            diesel::update(matches::table.find(record.id))
                .set((
                    matches::matched.eq(true),
                    matches::matched_at.eq(now),
                    matches::updated_at.eq(now),
                ))
                .execute(conn)?;
        }
        Ok((record, promotion))
    })?;

    metrics::counter!("swipes_total", "liked" => liked.to_string()).increment(1);
    if promotion == Promotion::Promoted {
        metrics::counter!("matches_promoted_total").increment(1);
        tracing::info!(match_id = %record.id, user_id = %actor, target_id = %target, "mutual match");
    } else {
        tracing::debug!(match_id = %record.id, user_id = %actor, liked, "swipe recorded");
    }

    Ok(SwipeResult {
        matched: promotion.is_matched(),
        match_id: record.id,
    })
}

/// Reads the persisted, terminal `matched` flag for the pair.
pub fn check_match(conn: &mut PgConnection, actor: Uuid, other: Uuid) -> AppResult<MatchCheck> {
    let Some(pair) = UserPair::new(actor, other) else {
        return Ok(MatchCheck { is_match: false, match_id: None });
    };

    let matched_id: Option<Uuid> = matches::table
        .filter(matches::user_low.eq(pair.low()))
        .filter(matches::user_high.eq(pair.high()))
        .filter(matches::matched.eq(true))
        .select(matches::id)
        .first(conn)
        .optional()?;

    Ok(MatchCheck {
        is_match: matched_id.is_some(),
        match_id: matched_id,
    })
}

pub fn list_matches(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<MatchSummary>> {
    let records: Vec<Match> = matches::table
        .filter(matches::matched.eq(true))
        .filter(matches::user_low.eq(user_id).or(matches::user_high.eq(user_id)))
        .order(matches::updated_at.desc())
        .select(Match::as_select())
        .load(conn)?;

    let counterpart_ids: Vec<Uuid> = records.iter().map(|m| m.counterpart(user_id)).collect();
    let mut profiles_by_id = profiles::load_profiles(conn, &counterpart_ids)?;
    let mut photos_by_id = profiles::load_photo_urls(conn, &counterpart_ids)?;

    Ok(records
        .into_iter()
        .filter_map(|m| {
            let other = m.counterpart(user_id);
            let profile = profiles_by_id.remove(&other)?;
            Some(MatchSummary {
                match_id: m.id,
                matched_at: m.matched_at,
                last_message_id: m.last_message_id,
                user: PublicProfile {
                    id: profile.id,
                    name: profile.name,
                    age: profile.age,
                    gender: profile.gender,
                    bio: profile.bio,
                    photos: photos_by_id.remove(&other).unwrap_or_default(),
                },
            })
        })
        .collect())
}
