use crate::core::engine::DecisionEngine;
use crate::core::refresher::Refresher;
use crate::core::store::SessionStore;
use crate::core::{user_message, LIKED_REFRESH_FAILED, MATCHES_REFRESH_FAILED, SESSION_EXPIRED};
use crate::models::{Decision, DecisionOutcome, SessionSnapshot, MATCH_CAPACITY};
use crate::services::{MatchingService, RemoteError};
use std::sync::Arc;
use tokio::sync::Mutex;

const LOAD_FAILED: &str = "Failed to load data. Please try again.";
const REMOVE_FAILED: &str = "Failed to remove match. Please try again.";

/// One authenticated user's swipe session
///
/// Owns the session state and the handle to the matching service. Every
/// operation reports failure through the error slot in the snapshot; nothing
/// here returns an error to the caller.
pub struct Session {
    store: Mutex<SessionStore>,
    service: Arc<dyn MatchingService>,
}

impl Session {
    pub fn new(service: Arc<dyn MatchingService>) -> Self {
        Self::with_capacity(service, MATCH_CAPACITY)
    }

    /// `match_capacity` only drives the saturation notice
    pub fn with_capacity(service: Arc<dyn MatchingService>, match_capacity: usize) -> Self {
        Self {
            store: Mutex::new(SessionStore::new(match_capacity)),
            service,
        }
    }

    fn engine(&self) -> DecisionEngine<'_> {
        DecisionEngine::new(&self.store, self.service.as_ref())
    }

    fn refresher(&self, epoch: u64) -> Refresher<'_> {
        Refresher::new(&self.store, self.service.as_ref(), epoch)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.store.lock().await.snapshot()
    }

    /// Load catalog, matches and likes concurrently
    ///
    /// Each result is applied as soon as it arrives. An empty catalog is
    /// seeded once and fetched again. Any failure leaves one error message;
    /// whatever did load stays applied.
    pub async fn bootstrap(&self) {
        let epoch = {
            let mut store = self.store.lock().await;
            let epoch = store.epoch();
            store.set_loading(epoch, true);
            epoch
        };

        tracing::info!("Loading session data");

        let refresher = self.refresher(epoch);
        let (catalog, matches, liked) = tokio::join!(
            self.load_catalog(epoch),
            refresher.refresh_matches(),
            refresher.refresh_liked(),
        );

        let mut failures = Vec::new();

        match catalog {
            Ok(0) => {
                if let Err(e) = self.seed_catalog(epoch).await {
                    failures.push(e);
                }
            }
            Ok(count) => tracing::debug!("Catalog loaded with {} profiles", count),
            Err(e) => failures.push(e),
        }
        if let Err(e) = matches {
            failures.push(e);
        }
        if let Err(e) = liked {
            failures.push(e);
        }

        let mut store = self.store.lock().await;
        if let Some(first) = failures.first() {
            for e in &failures {
                tracing::error!("Error loading session data: {}", e);
            }
            store.report(epoch, user_message(first, LOAD_FAILED));
        } else {
            tracing::info!(
                "Session loaded: {} candidates, {} matches, {} liked",
                store.queue().len(),
                store.matches().len(),
                store.liked().len()
            );
        }
        store.set_loading(epoch, false);
    }

    async fn load_catalog(&self, epoch: u64) -> Result<usize, RemoteError> {
        let profiles = self.service.list_profiles().await?;
        let count = profiles.len();
        self.store.lock().await.replace_queue_in(epoch, profiles);
        Ok(count)
    }

    async fn seed_catalog(&self, epoch: u64) -> Result<(), RemoteError> {
        tracing::info!("Catalog is empty, seeding default profiles");
        self.service.seed_profiles().await?;
        let count = self.load_catalog(epoch).await?;
        tracing::info!("Seeded catalog has {} profiles", count);
        Ok(())
    }

    /// Drop all session state; purely local
    pub async fn logout(&self) {
        self.store.lock().await.reset();
        tracing::info!("Session state cleared");
    }

    /// Drop all session state after the credential was revoked
    ///
    /// Unlike [`Session::logout`] the error slot tells the user why.
    pub async fn expire(&self) {
        self.store.lock().await.expire(SESSION_EXPIRED);
        tracing::info!("Session expired, state cleared");
    }

    pub async fn decide(&self, decision: Decision) -> DecisionOutcome {
        self.engine().decide(decision).await
    }

    pub async fn like(&self) -> DecisionOutcome {
        self.decide(Decision::Like).await
    }

    pub async fn super_like(&self) -> DecisionOutcome {
        self.decide(Decision::SuperLike).await
    }

    pub async fn pass(&self) -> DecisionOutcome {
        self.decide(Decision::Pass).await
    }

    /// Remove a match, then refresh matches and likes
    ///
    /// Local lists are never touched before the service confirms. Returns
    /// whether the service accepted the removal.
    pub async fn remove_match(&self, profile_id: &str) -> bool {
        let epoch = self.store.lock().await.epoch();

        if let Err(e) = self.service.remove_match(profile_id).await {
            tracing::error!("Removing match {} failed: {}", profile_id, e);
            self.store.lock().await.report(epoch, user_message(&e, REMOVE_FAILED));
            return false;
        }

        tracing::info!("Removed match {}", profile_id);
        if let Err(e) = self.refresher(epoch).refresh_both().await {
            tracing::error!("Refresh after removing {} failed: {}", profile_id, e);
            self.store.lock().await.report(epoch, user_message(&e, MATCHES_REFRESH_FAILED));
        }
        true
    }

    /// Returns whether the refresh succeeded
    pub async fn refresh_matches(&self) -> bool {
        let epoch = self.store.lock().await.epoch();
        let result = self.refresher(epoch).refresh_matches().await.map(|_| ());
        self.settle_refresh(epoch, result, MATCHES_REFRESH_FAILED).await
    }

    pub async fn refresh_liked(&self) -> bool {
        let epoch = self.store.lock().await.epoch();
        let result = self.refresher(epoch).refresh_liked().await.map(|_| ());
        self.settle_refresh(epoch, result, LIKED_REFRESH_FAILED).await
    }

    pub async fn refresh_both(&self) -> bool {
        let epoch = self.store.lock().await.epoch();
        let result = self.refresher(epoch).refresh_both().await;
        self.settle_refresh(epoch, result, MATCHES_REFRESH_FAILED).await
    }

    async fn settle_refresh(
        &self,
        epoch: u64,
        result: Result<(), RemoteError>,
        failure: &str,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(transient = e.is_transient(), "Refresh failed: {}", e);
                self.store.lock().await.report(epoch, user_message(&e, failure));
                false
            }
        }
    }

    pub async fn dismiss_error(&self) {
        self.store.lock().await.clear_error();
    }
}
