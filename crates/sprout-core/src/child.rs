//! Child profile domain model.
//!
//! Children are owned by the embedding dashboard shell; this crate treats
//! them as a read-only roster used to scope advisor conversations.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Age band a child's curriculum is pitched at.
///
/// The backend stores this as the literal integers 6, 8 and 10, so the
/// serde representation round-trips through a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeLevel {
    Six,
    Eight,
    Ten,
}

impl AgeLevel {
    /// Returns the age as the backend's integer encoding.
    pub fn as_years(self) -> u8 {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
            Self::Ten => 10,
        }
    }

    /// Parses the backend's integer encoding.
    pub fn from_years(years: u8) -> Option<Self> {
        match years {
            6 => Some(Self::Six),
            8 => Some(Self::Eight),
            10 => Some(Self::Ten),
            _ => None,
        }
    }
}

impl Serialize for AgeLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_years())
    }
}

impl<'de> Deserialize<'de> for AgeLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let years = u8::deserialize(deserializer)?;
        Self::from_years(years)
            .ok_or_else(|| D::Error::custom(format!("unsupported age level: {}", years)))
    }
}

impl std::fmt::Display for AgeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_years())
    }
}

/// A child profile as served by the parent portal backend.
///
/// Read-only to the advisor subsystem; the roster is supplied by the
/// embedding shell (or fetched once by the CLI front end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    /// Unique child identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Age band the child's sessions are pitched at
    pub age_level: AgeLevel,
    /// Code the child uses to start a learning session
    pub learning_code: String,
    /// Currently pinned topic, if any
    #[serde(default)]
    pub target_topic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_level_round_trips_backend_integers() {
        for years in [6u8, 8, 10] {
            let level = AgeLevel::from_years(years).unwrap();
            assert_eq!(level.as_years(), years);
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, years.to_string());
        }
    }

    #[test]
    fn age_level_rejects_unknown_values() {
        assert!(AgeLevel::from_years(7).is_none());
        assert!(serde_json::from_str::<AgeLevel>("7").is_err());
    }

    #[test]
    fn child_profile_deserializes_without_target_topic() {
        let child: ChildProfile = serde_json::from_str(
            r#"{
                "id": "0b53a21e-9a3a-4f41-a34a-14c9b6b6e001",
                "name": "Mina",
                "age_level": 8,
                "learning_code": "MINA-1234"
            }"#,
        )
        .unwrap();
        assert_eq!(child.name, "Mina");
        assert_eq!(child.age_level, AgeLevel::Eight);
        assert!(child.target_topic.is_none());
    }
}
