use crate::core::refresher::Refresher;
use crate::core::store::{Presented, SessionStore};
use crate::core::{user_message, LIKED_REFRESH_FAILED, MATCHES_REFRESH_FAILED};
use crate::models::{Decision, DecisionOutcome};
use crate::services::MatchingService;
use tokio::sync::Mutex;

/// Applies one decision to the presented candidate
///
/// # State machine
/// 1. Capture the presented candidate; empty queue means no-op
/// 2. Dispatch pass / like / super-like for the captured id
/// 3. Like and super-like: refresh matches if a match formed, then always
///    refresh likes, then advance
/// 4. Pass: advance whether or not the call succeeded
///
/// The store lock is never held across a remote call, so a second decision
/// can start while the first is in flight. Both act on the id they captured
/// and only the first to finish moves the cursor.
pub struct DecisionEngine<'a> {
    store: &'a Mutex<SessionStore>,
    service: &'a dyn MatchingService,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(store: &'a Mutex<SessionStore>, service: &'a dyn MatchingService) -> Self {
        Self { store, service }
    }

    pub async fn decide(&self, decision: Decision) -> DecisionOutcome {
        let Some(presented) = self.store.lock().await.presented() else {
            tracing::debug!("No candidate presented, ignoring {}", decision);
            return DecisionOutcome::NoCandidate;
        };

        tracing::debug!(
            "Applying {} to {} (position {})",
            decision,
            presented.profile_id,
            presented.index
        );

        if decision.is_critical() {
            self.like(decision, presented).await
        } else {
            self.pass(presented).await
        }
    }

    async fn pass(&self, presented: Presented) -> DecisionOutcome {
        if let Err(e) = self.service.pass(&presented.profile_id).await {
            // Best effort: moving on is all a pass needs locally
            tracing::warn!("Pass on {} failed, advancing anyway: {}", presented.profile_id, e);
        }

        let advanced = self.store.lock().await.advance_from(&presented);
        DecisionOutcome::Applied {
            profile_id: presented.profile_id,
            is_match: false,
            advanced,
        }
    }

    async fn like(&self, decision: Decision, presented: Presented) -> DecisionOutcome {
        let result = match decision {
            Decision::SuperLike => self.service.super_like(&presented.profile_id).await,
            _ => self.service.like(&presented.profile_id).await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    transient = e.is_transient(),
                    "{} on {} failed: {}",
                    decision,
                    presented.profile_id,
                    e
                );
                self.store
                    .lock()
                    .await
                    .report(presented.epoch, user_message(&e, decision.failure_message()));
                return DecisionOutcome::Failed {
                    profile_id: presented.profile_id,
                };
            }
        };

        let is_match = outcome.is_match();
        let refresher = Refresher::new(self.store, self.service, presented.epoch);

        // Refreshes finish before the cursor moves; a failed refresh is
        // surfaced but does not undo the decision the service already stored.
        if is_match {
            tracing::info!("Matched with {}", presented.profile_id);
            if let Err(e) = refresher.refresh_matches().await {
                tracing::error!("Match refresh after {} failed: {}", decision, e);
                self.store
                    .lock()
                    .await
                    .report(presented.epoch, user_message(&e, MATCHES_REFRESH_FAILED));
            }
        }

        if let Err(e) = refresher.refresh_liked().await {
            tracing::error!("Liked refresh after {} failed: {}", decision, e);
            self.store
                .lock()
                .await
                .report(presented.epoch, user_message(&e, LIKED_REFRESH_FAILED));
        }

        let advanced = self.store.lock().await.advance_from(&presented);
        DecisionOutcome::Applied {
            profile_id: presented.profile_id,
            is_match,
            advanced,
        }
    }
}
