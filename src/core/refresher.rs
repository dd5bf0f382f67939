use crate::core::store::{SessionStore, SnapshotKind};
use crate::services::{MatchingService, RemoteError};
use tokio::sync::Mutex;

/// Re-fetches match and like snapshots and swaps them in wholesale
///
/// There is no merge step: a successful fetch replaces the local list, a
/// failed one leaves the previous snapshot untouched. A refresher is bound to
/// the session epoch it was created for and does nothing once that session
/// has been torn down.
pub struct Refresher<'a> {
    store: &'a Mutex<SessionStore>,
    service: &'a dyn MatchingService,
    epoch: u64,
}

impl<'a> Refresher<'a> {
    pub fn new(
        store: &'a Mutex<SessionStore>,
        service: &'a dyn MatchingService,
        epoch: u64,
    ) -> Self {
        Self { store, service, epoch }
    }

    /// Returns the number of matches the service reported
    pub async fn refresh_matches(&self) -> Result<usize, RemoteError> {
        let ticket = self.store.lock().await.begin_refresh(self.epoch, SnapshotKind::Matches);
        let Some(ticket) = ticket else {
            tracing::debug!("Session ended, skipping match refresh");
            return Ok(0);
        };

        let matches = self.service.list_matches().await?;
        let count = matches.len();

        let mut store = self.store.lock().await;
        if !store.apply_matches(ticket, matches) {
            tracing::debug!("Discarded stale match snapshot ({} entries)", count);
            return Ok(count);
        }
        if count > store.match_capacity() {
            tracing::warn!(
                "Match list exceeds capacity ({} of {} matches)",
                count,
                store.match_capacity()
            );
        } else if store.at_capacity() {
            tracing::info!("Match list at capacity ({} matches)", count);
        }

        tracing::debug!("Match snapshot replaced ({} entries)", count);
        Ok(count)
    }

    /// Returns the number of liked profiles the service reported
    pub async fn refresh_liked(&self) -> Result<usize, RemoteError> {
        let ticket = self.store.lock().await.begin_refresh(self.epoch, SnapshotKind::Liked);
        let Some(ticket) = ticket else {
            tracing::debug!("Session ended, skipping liked refresh");
            return Ok(0);
        };

        let liked = self.service.list_liked().await?;
        let count = liked.len();

        if self.store.lock().await.apply_liked(ticket, liked) {
            tracing::debug!("Liked snapshot replaced ({} entries)", count);
        } else {
            tracing::debug!("Discarded stale liked snapshot ({} entries)", count);
        }
        Ok(count)
    }

    /// Refresh both lists concurrently; each applies independently
    pub async fn refresh_both(&self) -> Result<(), RemoteError> {
        let (matches, liked) = tokio::join!(self.refresh_matches(), self.refresh_liked());
        matches?;
        liked?;
        Ok(())
    }
}
