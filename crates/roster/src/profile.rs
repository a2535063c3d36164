//! Record types for tracked platform users.
//!
//! A [`Profile`] is the unit of storage: every update replaces the whole
//! value under its id. The serialized form is camelCase JSON, one object
//! per user keyed by id in the roster file.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One tracked platform user's known state.
///
/// `status` and `score` stay opaque text to preserve the platform's exact
/// representation (leading zeros, locale formatting); numeric treatment
/// happens by parsing at the point of comparison, never in storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique, stable id assigned by the platform; primary key of the store.
    pub id: String,
    pub display_name: String,
    pub status: String,
    pub score: String,
    pub rank: u32,
    /// Challenges the user has attempted or is known for, in platform order.
    pub challenges: Vec<ChallengeRef>,
    pub solutions: Vec<SolutionRef>,
    /// Challenges the user has been credited for. Treated as a set keyed by
    /// `challenge_id`: a credited challenge must not be reported again.
    pub validations: Vec<Validation>,
}

impl Profile {
    /// Whether the user has already been credited for `challenge_id`.
    pub fn has_validated(&self, challenge_id: &str) -> bool {
        self.validations
            .iter()
            .any(|validation| validation.challenge_id == challenge_id)
    }
}

/// Reference to a challenge on the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRef {
    pub challenge_id: String,
    pub url: String,
}

/// Reference to a solution write-up on the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRef {
    pub solution_id: String,
    pub url: String,
}

/// A validation event: the user has been credited for a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub challenge_id: String,
    #[serde(with = "platform_datetime")]
    pub date: NaiveDateTime,
}

/// Serde adapter for the platform's `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod platform_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
