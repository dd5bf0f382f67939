use serde::{Deserialize, Serialize};
use crate::models::domain::{DecisionOutcome, LikeRecord, MatchRecord, Profile};

/// Read model of the session handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub candidate: Option<Profile>,
    pub cursor: usize,
    pub queue_length: usize,
    pub matches: Vec<MatchRecord>,
    pub liked: Vec<LikeRecord>,
    pub match_count: usize,
    pub match_capacity: usize,
    /// Saturation notice; never used to clamp the match list
    pub at_capacity: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Session as exposed by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(flatten)]
    pub session: SessionSnapshot,
}

/// Response for a decision endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub outcome: DecisionOutcome,
    pub session: SessionResponse,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
