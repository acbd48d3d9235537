use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vib3_shared::types::profile::MissingFields;

use crate::matching::candidates::{GeoPoint, Prospect, Seeker};
use crate::schema::{matches, swipes, users};

// --- Match ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub matched: bool,
    pub matched_at: Option<DateTime<Utc>>,
    pub last_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.user_low == user_id { self.user_high } else { self.user_low }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
}

// --- Swipe ---

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

// --- Users (read side) ---

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = users)]
pub struct SeekerRow {
    pub id: Uuid,
    pub gender: Option<String>,
    pub preferred_genders: Vec<String>,
    pub age_min: i32,
    pub age_max: i32,
    pub max_distance_km: i32,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub profile_complete: bool,
}

impl SeekerRow {
    pub fn missing_fields(&self) -> MissingFields {
        MissingFields::evaluate(
            self.profile_complete,
            self.preferred_genders.len(),
            self.longitude.is_some() && self.latitude.is_some(),
        )
    }

    pub fn into_seeker(self) -> Seeker {
        Seeker {
            id: self.id,
            location: GeoPoint::from_columns(self.longitude, self.latitude),
            gender: self.gender,
            preferred_genders: self.preferred_genders,
            age_min: self.age_min,
            age_max: self.age_max,
            max_distance_km: self.max_distance_km,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = users)]
pub struct ProfileRow {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: String,
    pub interests: Vec<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub preferred_genders: Vec<String>,
}

impl ProfileRow {
    pub fn prospect(&self) -> Prospect {
        Prospect {
            id: self.id,
            age: self.age,
            gender: self.gender.clone(),
            preferred_genders: self.preferred_genders.clone(),
            location: GeoPoint::from_columns(self.longitude, self.latitude),
        }
    }
}

// --- Requests / responses ---

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub target_user_id: Uuid,
    pub liked: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SwipeResult {
    pub matched: bool,
    pub match_id: Uuid,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MatchCheck {
    pub is_match: bool,
    pub match_id: Option<Uuid>,
}

/// Public view of another user. No email, no preferences, no exact location.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: String,
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub matched_at: Option<DateTime<Utc>>,
    pub last_message_id: Option<Uuid>,
    pub user: PublicProfile,
}

#[derive(Debug, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: String,
    pub interests: Vec<String>,
    pub photos: Vec<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub distance_km: Option<f64>,
}
