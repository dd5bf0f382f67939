// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Decision, DecisionOutcome, LikeOutcome, LikeRecord, MatchRecord, Profile, MATCH_CAPACITY,
};
pub use requests::{LikeRequest, LoginRequest};
pub use responses::{
    DecisionResponse, ErrorResponse, HealthResponse, SessionResponse, SessionSnapshot,
};
