use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to start a session with an already-issued credential
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
}

/// Body sent with a plain like
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeRequest {
    #[serde(rename = "superLiked")]
    pub super_liked: bool,
}
