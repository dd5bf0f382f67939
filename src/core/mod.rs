// Session core exports
pub mod engine;
pub mod refresher;
pub mod session;
pub mod store;

#[cfg(test)]
mod proptests;

pub use engine::DecisionEngine;
pub use refresher::Refresher;
pub use session::Session;
pub use store::{Presented, RefreshTicket, SessionStore, SnapshotKind};

use crate::services::RemoteError;

pub(crate) const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub(crate) const MATCHES_REFRESH_FAILED: &str = "Failed to refresh matches. Please try again.";
pub(crate) const LIKED_REFRESH_FAILED: &str = "Failed to refresh liked profiles. Please try again.";

/// Message for the error slot; authorization failures get their own wording
pub(crate) fn user_message(err: &RemoteError, fallback: &str) -> String {
    if err.is_unauthorized() {
        SESSION_EXPIRED.to_string()
    } else {
        fallback.to_string()
    }
}
