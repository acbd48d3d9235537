//! Profile rules shared by the identity store and the match engine.

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ErrorCode};

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 120;
pub const DEFAULT_MAX_DISTANCE_KM: i32 = 50;
pub const MAX_BIO_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
    #[serde(rename = "non-binary")]
    NonBinary,
    #[serde(rename = "prefer not to say")]
    Undisclosed,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non-binary",
            Gender::Undisclosed => "prefer not to say",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "non-binary" => Ok(Gender::NonBinary),
            "prefer not to say" => Ok(Gender::Undisclosed),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

/// A profile is complete once name, age, gender, bio and at least one photo are set.
pub fn is_profile_complete(
    name: &str,
    age: Option<i32>,
    gender: Option<&str>,
    bio: &str,
    photo_count: usize,
) -> bool {
    !name.trim().is_empty()
        && age.is_some()
        && gender.is_some_and(|g| !g.is_empty())
        && !bio.trim().is_empty()
        && photo_count > 0
}

/// Which parts of a profile block discovery and swiping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFields {
    pub profile_complete: bool,
    pub preferences: bool,
    pub location: bool,
}

impl MissingFields {
    pub fn evaluate(profile_complete: bool, preferred_gender_count: usize, has_location: bool) -> Self {
        Self {
            profile_complete: !profile_complete,
            preferences: preferred_gender_count == 0,
            location: !has_location,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        !(self.profile_complete || self.preferences || self.location)
    }

    pub fn descriptor(&self) -> GateDescriptor {
        GateDescriptor {
            requires_profile_setup: !self.is_satisfied(),
            missing_fields: *self,
        }
    }

    /// `Ok(())` when nothing is missing, otherwise the precondition error
    /// carrying the machine-readable descriptor.
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_satisfied() {
            return Ok(());
        }
        let details = serde_json::to_value(self.descriptor())
            .map_err(|e| AppError::internal(e.to_string()))?;
        Err(AppError::with_details(
            ErrorCode::ProfileIncomplete,
            "please complete your profile to access this feature",
            details,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDescriptor {
    pub requires_profile_setup: bool,
    pub missing_fields: MissingFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_round_trips_through_its_label() {
        for gender in [Gender::Male, Gender::Female, Gender::NonBinary, Gender::Undisclosed] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!("robot".parse::<Gender>().is_err());
        assert_eq!(
            serde_json::to_value(Gender::Undisclosed).unwrap(),
            serde_json::json!("prefer not to say")
        );
    }

    #[test]
    fn completeness_requires_every_field() {
        assert!(is_profile_complete("Ana", Some(25), Some("female"), "hi", 1));
        assert!(!is_profile_complete("Ana", Some(25), Some("female"), "hi", 0));
        assert!(!is_profile_complete("Ana", None, Some("female"), "hi", 1));
        assert!(!is_profile_complete("Ana", Some(25), None, "hi", 1));
        assert!(!is_profile_complete("Ana", Some(25), Some("female"), "  ", 1));
        assert!(!is_profile_complete(" ", Some(25), Some("female"), "hi", 1));
    }

    #[test]
    fn gate_reports_each_missing_part() {
        let missing = MissingFields::evaluate(true, 0, false);
        assert!(!missing.profile_complete);
        assert!(missing.preferences);
        assert!(missing.location);

        let err = missing.check().unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ProfileIncomplete);
        match err {
            AppError::Known { details: Some(details), .. } => {
                assert_eq!(details["requires_profile_setup"], true);
                assert_eq!(details["missing_fields"]["location"], true);
                assert_eq!(details["missing_fields"]["profile_complete"], false);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn satisfied_gate_passes() {
        let missing = MissingFields::evaluate(true, 2, true);
        assert!(missing.is_satisfied());
        assert!(missing.check().is_ok());
        assert!(!missing.descriptor().requires_profile_setup);
    }
}
