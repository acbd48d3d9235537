use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use vib3_shared::types::profile::{Gender, MissingFields};

use crate::schema::{user_photos, users};

// --- User ---

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
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
    pub age_min: i32,
    pub age_max: i32,
    pub max_distance_km: i32,
    pub profile_complete: bool,
    pub is_active: bool,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_location(&self) -> bool {
        self.longitude.is_some() && self.latitude.is_some()
    }

    pub fn missing_fields(&self) -> MissingFields {
        MissingFields::evaluate(self.profile_complete, self.preferred_genders.len(), self.has_location())
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
}

/// Partial profile write; `None` leaves the column untouched.
#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub preferred_genders: Option<Vec<String>>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub max_distance_km: Option<i32>,
}

// --- Photo ---

#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Clone, Serialize)]
#[diesel(table_name = user_photos)]
#[diesel(belongs_to(User))]
pub struct UserPhoto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_photos)]
pub struct NewUserPhoto<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: &'a str,
    pub storage_key: &'a str,
    pub position: i32,
}

// --- Requests ---

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 18, max = 120, message = "age must be between 18 and 120"))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: f64,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreferencesInput {
    pub genders: Option<Vec<Gender>>,
    #[validate(range(min = 18, max = 120, message = "age_min must be between 18 and 120"))]
    pub age_min: Option<i32>,
    #[validate(range(min = 18, max = 120, message = "age_max must be between 18 and 120"))]
    pub age_max: Option<i32>,
    #[validate(range(min = 1, max = 100, message = "max_distance_km must be between 1 and 100"))]
    pub max_distance_km: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 18, max = 120, message = "age must be between 18 and 120"))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    #[validate(length(max = 500, message = "bio cannot be longer than 500 characters"))]
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    #[validate]
    pub location: Option<LocationInput>,
    #[validate]
    pub preferences: Option<PreferencesInput>,
}

// --- Responses ---

#[derive(Debug, Serialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Preferences {
    pub genders: Vec<String>,
    pub age_min: i32,
    pub age_max: i32,
    pub max_distance_km: i32,
}

/// The caller's own profile. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: String,
    pub interests: Vec<String>,
    pub photos: Vec<UserPhoto>,
    pub location: Option<Location>,
    pub preferences: Preferences,
    pub profile_complete: bool,
    pub is_active: bool,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: User, photos: Vec<UserPhoto>) -> Self {
        let location = match (user.longitude, user.latitude) {
            (Some(longitude), Some(latitude)) => Some(Location {
                longitude,
                latitude,
                city: user.city.clone(),
                country: user.country.clone(),
            }),
            _ => None,
        };

        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            age: user.age,
            gender: user.gender,
            bio: user.bio,
            interests: user.interests,
            photos,
            location,
            preferences: Preferences {
                genders: user.preferred_genders,
                age_min: user.age_min,
                age_max: user.age_max,
                max_distance_km: user.max_distance_km,
            },
            profile_complete: user.profile_complete,
            is_active: user.is_active,
            last_active_at: user.last_active_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
