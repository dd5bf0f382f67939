//! Lume Swipe - swipe-and-match session client for Lume dating app
//!
//! This library holds the session state machine behind the swipe screen:
//! the candidate queue and cursor, decision handling, and reconciliation of
//! matches and likes against the matching service.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Session, SessionStore};
pub use models::{
    Decision, DecisionOutcome, LikeOutcome, LikeRecord, MatchRecord, Profile, SessionSnapshot,
    MATCH_CAPACITY,
};
pub use services::{HttpMatchingService, MatchingService, RemoteError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let store = SessionStore::default();
        assert_eq!(store.snapshot().match_capacity, MATCH_CAPACITY);
    }
}
