use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of matches the matching service allows per user
pub const MATCH_CAPACITY: usize = 4;

/// Candidate profile as served by the matching service
///
/// Profiles are owned by the remote service; the session only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age: u8,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education: String,
    #[serde(rename = "lookingFor", default)]
    pub looking_for: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

/// Mutual like recorded by the matching service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "profileId", alias = "profile")]
    pub profile: Profile,
    #[serde(rename = "superLiked", default)]
    pub super_liked: bool,
}

/// Outgoing like, reciprocated or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRecord {
    #[serde(rename = "profileId", alias = "profile")]
    pub profile: Profile,
    #[serde(rename = "superLiked", default)]
    pub super_liked: bool,
}

/// Decision applied to the presented candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pass,
    Like,
    #[serde(alias = "super_like", alias = "super-like")]
    SuperLike,
}

impl Decision {
    /// Pass failures are swallowed; everything else is surfaced and blocks advancement
    pub fn is_critical(self) -> bool {
        !matches!(self, Decision::Pass)
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Decision::Pass => "Failed to pass profile.",
            Decision::Like => "Failed to like profile. Please try again.",
            Decision::SuperLike => "Failed to super like profile. Please try again.",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decision::Pass => "pass",
            Decision::Like => "like",
            Decision::SuperLike => "superlike",
        };
        f.write_str(name)
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(Decision::Pass),
            "like" => Ok(Decision::Like),
            "superlike" | "super_like" | "super-like" => Ok(Decision::SuperLike),
            other => Err(format!(
                "unknown decision '{}', expected one of: pass, like, superlike",
                other
            )),
        }
    }
}

/// Result of a like or super-like call
///
/// A successful response without an `isMatch` flag means no match was formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    #[serde(rename = "isMatch", default, skip_serializing_if = "Option::is_none")]
    pub is_match: Option<bool>,
}

impl LikeOutcome {
    pub fn matched() -> Self {
        Self { is_match: Some(true) }
    }

    pub fn unmatched() -> Self {
        Self { is_match: Some(false) }
    }

    pub fn is_match(&self) -> bool {
        self.is_match.unwrap_or(false)
    }
}

/// What a single decision did to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Queue was empty; nothing was sent
    NoCandidate,
    /// Decision went through (or was a best-effort pass)
    Applied {
        #[serde(rename = "profileId")]
        profile_id: String,
        #[serde(rename = "isMatch")]
        is_match: bool,
        /// False when another decision already moved past this candidate
        advanced: bool,
    },
    /// Critical decision rejected; the candidate stays presented
    Failed {
        #[serde(rename = "profileId")]
        profile_id: String,
    },
}

impl DecisionOutcome {
    pub fn profile_id(&self) -> Option<&str> {
        match self {
            DecisionOutcome::NoCandidate => None,
            DecisionOutcome::Applied { profile_id, .. }
            | DecisionOutcome::Failed { profile_id } => Some(profile_id),
        }
    }
}
