use serde::Serialize;
use uuid::Uuid;

use vib3_shared::types::profile::{DEFAULT_MAX_DISTANCE_KM, MAX_AGE, MIN_AGE};

pub const MAX_CANDIDATES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn from_columns(longitude: Option<f64>, latitude: Option<f64>) -> Option<Self> {
        Some(Self { longitude: longitude?, latitude: latitude? })
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = EARTH_RADIUS_KM;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * R * a.sqrt().asin()
}

/// Latitude/longitude window holding every point within a radius of a
/// center, so the store can drop far rows before any scan cap applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub latitude: (f64, f64),
    /// `None` when the window touches a pole or wraps the antimeridian.
    pub longitude: Option<(f64, f64)>,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let d_lat = angular.to_degrees();
        let min_lat = center.latitude - d_lat;
        let max_lat = center.latitude + d_lat;

        let spread = angular.sin() / center.latitude.to_radians().cos();
        let longitude = if min_lat <= -90.0 || max_lat >= 90.0 || !(0.0..1.0).contains(&spread) {
            None
        } else {
            let d_lng = spread.asin().to_degrees();
            let (min_lng, max_lng) = (center.longitude - d_lng, center.longitude + d_lng);
            (min_lng >= -180.0 && max_lng <= 180.0).then_some((min_lng, max_lng))
        };

        Self {
            latitude: (min_lat.max(-90.0), max_lat.min(90.0)),
            longitude,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        let (min_lat, max_lat) = self.latitude;
        let lat_ok = (min_lat..=max_lat).contains(&point.latitude);
        let lng_ok = self
            .longitude
            .map_or(true, |(min, max)| (min..=max).contains(&point.longitude));
        lat_ok && lng_ok
    }
}

/// What the acting user is looking for.
#[derive(Debug, Clone)]
pub struct Seeker {
    pub id: Uuid,
    pub gender: Option<String>,
    pub preferred_genders: Vec<String>,
    pub age_min: i32,
    pub age_max: i32,
    pub max_distance_km: i32,
    pub location: Option<GeoPoint>,
}

impl Seeker {
    pub fn age_range(&self) -> (i32, i32) {
        let min = self.age_min.clamp(MIN_AGE, MAX_AGE);
        let max = self.age_max.clamp(MIN_AGE, MAX_AGE);
        if min <= max { (min, max) } else { (MIN_AGE, MAX_AGE) }
    }

    pub fn max_distance(&self) -> f64 {
        if self.max_distance_km > 0 {
            self.max_distance_km as f64
        } else {
            DEFAULT_MAX_DISTANCE_KM as f64
        }
    }

    fn wants(&self, gender: Option<&str>) -> bool {
        if self.preferred_genders.is_empty() {
            return true;
        }
        gender.is_some_and(|g| self.preferred_genders.iter().any(|p| p == g))
    }
}

/// A profile that passed the indexable filters in SQL.
#[derive(Debug, Clone)]
pub struct Prospect {
    pub id: Uuid,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub preferred_genders: Vec<String>,
    pub location: Option<GeoPoint>,
}

impl Prospect {
    /// An empty preference list is open to everyone.
    fn accepts(&self, gender: Option<&str>) -> bool {
        if self.preferred_genders.is_empty() {
            return true;
        }
        gender.is_some_and(|g| self.preferred_genders.iter().any(|p| p == g))
    }
}

#[derive(Debug, Clone)]
pub struct Ranked {
    pub id: Uuid,
    pub distance_km: Option<f64>,
}

/// Applies the filters SQL cannot express (reciprocity, distance) and orders
/// the survivors nearest first. Without a seeker location there is no geo
/// filter and input order is kept.
pub fn rank(seeker: &Seeker, prospects: Vec<Prospect>, limit: usize) -> Vec<Ranked> {
    let (age_min, age_max) = seeker.age_range();
    let max_distance = seeker.max_distance();

    let mut ranked: Vec<Ranked> = prospects
        .into_iter()
        .filter(|p| p.id != seeker.id)
        .filter(|p| seeker.wants(p.gender.as_deref()))
        .filter(|p| p.accepts(seeker.gender.as_deref()))
        .filter(|p| p.age.is_some_and(|age| (age_min..=age_max).contains(&age)))
        .filter_map(|p| match seeker.location {
            Some(origin) => {
                let distance = origin.distance_km(&p.location?);
                (distance <= max_distance).then_some(Ranked { id: p.id, distance_km: Some(distance) })
            }
            None => Some(Ranked { id: p.id, distance_km: None }),
        })
        .collect();

    if seeker.location.is_some() {
        ranked.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
        });
    }
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeker_a() -> Seeker {
        Seeker {
            id: Uuid::new_v4(),
            gender: Some("female".into()),
            preferred_genders: vec!["male".into()],
            age_min: 20,
            age_max: 35,
            max_distance_km: 50,
            location: Some(GeoPoint { longitude: 0.0, latitude: 0.0 }),
        }
    }

    fn prospect(age: i32, gender: &str, prefs: &[&str], at: Option<(f64, f64)>) -> Prospect {
        Prospect {
            id: Uuid::new_v4(),
            age: Some(age),
            gender: Some(gender.into()),
            preferred_genders: prefs.iter().map(|p| p.to_string()).collect(),
            location: at.map(|(longitude, latitude)| GeoPoint { longitude, latitude }),
        }
    }

    #[test]
    fn haversine_tenth_of_a_degree_is_about_eleven_km() {
        let km = haversine_km(0.0, 0.0, 0.1, 0.0);
        assert!((km - 11.12).abs() < 0.05, "got {km}");
        assert_eq!(haversine_km(48.85, 2.35, 48.85, 2.35), 0.0);
    }

    #[test]
    fn bounding_box_holds_the_whole_radius() {
        let center = GeoPoint { longitude: 0.0, latitude: 0.0 };
        let bbox = BoundingBox::around(center, 50.0);
        assert!(bbox.contains(&GeoPoint { longitude: 0.0, latitude: 0.1 }));
        assert!(!bbox.contains(&GeoPoint { longitude: 90.0, latitude: 10.0 }));

        // points on the circle itself, pulled a hair toward the center
        let delta = 50.0 / EARTH_RADIUS_KM;
        for step in 0..36 {
            let bearing = (step as f64 * 10.0).to_radians();
            let lat = (delta.sin() * bearing.cos()).asin();
            let lng = (bearing.sin() * delta.sin()).atan2(delta.cos());
            let edge = GeoPoint {
                longitude: lng.to_degrees() * 0.999_999,
                latitude: lat.to_degrees() * 0.999_999,
            };
            assert!(bbox.contains(&edge), "bearing {} outside {bbox:?}", step * 10);
        }
    }

    #[test]
    fn bounding_box_widens_longitude_away_from_the_equator() {
        let equator = BoundingBox::around(GeoPoint { longitude: 10.0, latitude: 0.0 }, 50.0);
        let north = BoundingBox::around(GeoPoint { longitude: 10.0, latitude: 60.0 }, 50.0);
        let width = |b: BoundingBox| b.longitude.map(|(min, max)| max - min).unwrap();
        assert!(width(north) > width(equator) * 1.9);
    }

    #[test]
    fn bounding_box_drops_longitude_near_poles_and_antimeridian() {
        let polar = BoundingBox::around(GeoPoint { longitude: 0.0, latitude: 89.9 }, 50.0);
        assert_eq!(polar.longitude, None);
        assert_eq!(polar.latitude.1, 90.0);

        let dateline = BoundingBox::around(GeoPoint { longitude: 179.9, latitude: 0.0 }, 50.0);
        assert_eq!(dateline.longitude, None);
        assert!(dateline.contains(&GeoPoint { longitude: -179.9, latitude: 0.0 }));
    }

    #[test]
    fn nearby_match_in_range_appears_and_older_one_does_not() {
        let a = seeker_a();
        let b = prospect(30, "male", &["female"], Some((0.0, 0.1)));
        let c = prospect(40, "male", &["female"], Some((0.0, 0.1)));
        let (b_id, c_id) = (b.id, c.id);

        let ranked = rank(&a, vec![b, c], MAX_CANDIDATES);
        let ids: Vec<Uuid> = ranked.iter().map(|r| r.id).collect();
        assert!(ids.contains(&b_id));
        assert!(!ids.contains(&c_id));
        assert!(ranked[0].distance_km.unwrap() < 12.0);
    }

    #[test]
    fn reciprocity_is_required() {
        let a = seeker_a();
        let not_interested = prospect(30, "male", &["male"], Some((0.0, 0.0)));
        let open_to_all = prospect(30, "male", &[], Some((0.0, 0.0)));
        let open_id = open_to_all.id;

        let ranked = rank(&a, vec![not_interested, open_to_all], MAX_CANDIDATES);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, open_id);
    }

    #[test]
    fn far_or_unlocated_prospects_are_dropped() {
        let a = seeker_a();
        let far = prospect(30, "male", &["female"], Some((0.0, 1.0))); // ~111 km
        let unlocated = prospect(30, "male", &["female"], None);
        assert!(rank(&a, vec![far, unlocated], MAX_CANDIDATES).is_empty());
    }

    #[test]
    fn nearest_first_and_capped() {
        let a = seeker_a();
        let prospects: Vec<Prospect> = (1..=30)
            .rev()
            .map(|i| prospect(30, "male", &["female"], Some((0.0, i as f64 * 0.01))))
            .collect();

        let ranked = rank(&a, prospects, MAX_CANDIDATES);
        assert_eq!(ranked.len(), MAX_CANDIDATES);
        let distances: Vec<f64> = ranked.iter().map(|r| r.distance_km.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn without_location_no_geo_filter_applies() {
        let mut a = seeker_a();
        a.location = None;
        let far = prospect(30, "male", &["female"], Some((120.0, 45.0)));
        let unlocated = prospect(30, "male", &["female"], None);
        assert_eq!(rank(&a, vec![far, unlocated], MAX_CANDIDATES).len(), 2);
    }

    #[test]
    fn wrong_gender_is_filtered() {
        let a = seeker_a();
        let woman = prospect(30, "female", &["female"], Some((0.0, 0.0)));
        assert!(rank(&a, vec![woman], MAX_CANDIDATES).is_empty());
    }
}
