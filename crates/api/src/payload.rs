//! Wire payloads of the platform API.
//!
//! Field names follow the platform's JSON exactly (via serde renames); the
//! `into_*` conversions produce the domain types the rest of the system
//! works with.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use roster::{ChallengeRef, Profile, SolutionRef, Validation};
use serde::Deserialize;

/// Wire shape of `auteurs/{id}` responses.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(rename = "id_auteur")]
    pub id: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "statut")]
    pub status: String,
    pub score: String,
    #[serde(rename = "position")]
    pub rank: u32,
    pub challenges: Vec<ChallengePayload>,
    pub solutions: Vec<SolutionPayload>,
    pub validations: Vec<ValidationPayload>,
}

impl UserPayload {
    pub fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            display_name: self.name,
            status: self.status,
            score: self.score,
            rank: self.rank,
            challenges: self
                .challenges
                .into_iter()
                .map(|challenge| ChallengeRef {
                    challenge_id: challenge.id,
                    url: challenge.url,
                })
                .collect(),
            solutions: self
                .solutions
                .into_iter()
                .map(|solution| SolutionRef {
                    solution_id: solution.id,
                    url: solution.url,
                })
                .collect(),
            validations: self
                .validations
                .into_iter()
                .map(|validation| Validation {
                    challenge_id: validation.challenge_id,
                    date: validation.date,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChallengePayload {
    #[serde(rename = "id_challenge")]
    pub id: String,
    #[serde(rename = "url_challenge")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SolutionPayload {
    #[serde(rename = "id_solution")]
    pub id: String,
    #[serde(rename = "url_solution")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidationPayload {
    #[serde(rename = "id_challenge")]
    pub challenge_id: String,
    #[serde(with = "roster::profile::platform_datetime")]
    pub date: NaiveDateTime,
}

/// One match of a user search, enough to register the user by id.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    #[serde(rename = "id_auteur")]
    pub id: String,
    #[serde(rename = "nom")]
    pub name: String,
}

/// First element of an `auteurs?nom=` response: result index to summary.
/// Later array elements carry pagination hints and are ignored.
pub(crate) type SearchPage = BTreeMap<String, UserSummary>;

/// Details of one challenge, as served by `challenges/{id}`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChallengeDetail {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "rubrique")]
    pub category: String,
    #[serde(rename = "soustitre")]
    pub subtitle: String,
    pub score: String,
    #[serde(rename = "difficulte")]
    pub difficulty: String,
}
