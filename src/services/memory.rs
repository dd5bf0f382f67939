//! In-process matching service
//!
//! Keeps the catalog, likes and matches in memory so sessions can be driven
//! without a backend. Used by the integration tests and benchmarks.

use crate::models::{LikeOutcome, LikeRecord, MatchRecord, Profile, MATCH_CAPACITY};
use crate::services::remote::{MatchingService, RemoteError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// What the service does when a reciprocated like arrives at full capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Like fails with an API error and nothing is recorded
    Reject,
    /// Like is recorded but no match is formed
    Ignore,
    /// Match is formed anyway
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProfiles,
    SeedProfiles,
    Like,
    SuperLike,
    Pass,
    ListMatches,
    ListLiked,
    RemoveMatch,
}

/// Injected failure for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Unavailable,
    Unauthorized,
    Rejected(String),
}

impl Fault {
    fn into_error(self, op: Operation) -> RemoteError {
        match self {
            Fault::Unavailable => RemoteError::Unavailable(format!("{:?} timed out", op)),
            Fault::Unauthorized => RemoteError::Unauthorized,
            Fault::Rejected(reason) => RemoteError::ApiError(reason),
        }
    }
}

/// Every call received, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    ListProfiles,
    SeedProfiles,
    Like(String),
    SuperLike(String),
    Pass(String),
    ListMatches,
    ListLiked,
    RemoveMatch(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<Profile>,
    seed_catalog: Vec<Profile>,
    admirers: HashSet<String>,
    liked: Vec<LikeRecord>,
    matches: Vec<MatchRecord>,
    passed: Vec<String>,
    faults: HashMap<Operation, Fault>,
    omit_match_flag: bool,
    calls: Vec<RemoteCall>,
}

pub struct MemoryMatchingService {
    state: Mutex<MemoryState>,
    capacity: usize,
    policy: CapacityPolicy,
}

impl MemoryMatchingService {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                profiles,
                ..MemoryState::default()
            }),
            capacity: MATCH_CAPACITY,
            policy: CapacityPolicy::Reject,
        }
    }

    /// Catalog installed by `seed_profiles` when the catalog is empty
    pub fn with_seed_catalog(mut self, seed: Vec<Profile>) -> Self {
        self.state.get_mut().seed_catalog = seed;
        self
    }

    /// Profiles that like the session user back
    pub fn with_admirers<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .get_mut()
            .admirers
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_capacity(mut self, capacity: usize, policy: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self.policy = policy;
        self
    }

    /// Pre-existing matches, as if formed in an earlier session
    pub fn with_matches(mut self, matches: Vec<MatchRecord>) -> Self {
        let state = self.state.get_mut();
        for record in &matches {
            upsert_like(&mut state.liked, &record.profile, record.super_liked);
        }
        state.matches = matches;
        self
    }

    pub async fn fail(&self, op: Operation, fault: Fault) {
        self.state.lock().await.faults.insert(op, fault);
    }

    pub async fn recover(&self, op: Operation) {
        self.state.lock().await.faults.remove(&op);
    }

    /// Answer likes without an `isMatch` flag
    pub async fn omit_match_flag(&self, omit: bool) {
        self.state.lock().await.omit_match_flag = omit;
    }

    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    pub async fn count(&self, call: &RemoteCall) -> usize {
        self.state.lock().await.calls.iter().filter(|c| *c == call).count()
    }

    pub async fn passed(&self) -> Vec<String> {
        self.state.lock().await.passed.clone()
    }

    /// Log the call, yield once, then apply any injected fault
    async fn enter(&self, op: Operation, call: RemoteCall) -> Result<(), RemoteError> {
        self.state.lock().await.calls.push(call);
        tokio::task::yield_now().await;

        match self.state.lock().await.faults.get(&op).cloned() {
            Some(fault) => Err(fault.into_error(op)),
            None => Ok(()),
        }
    }

    async fn record_like(
        &self,
        profile_id: &str,
        super_liked: bool,
    ) -> Result<LikeOutcome, RemoteError> {
        let mut state = self.state.lock().await;

        let profile = state
            .profiles
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("Profile {}", profile_id)))?;

        let reciprocated = state.admirers.contains(profile_id);
        let already_matched = state.matches.iter().any(|m| m.profile.id == profile_id);
        let full = state.matches.len() >= self.capacity;

        let mut is_match = false;
        if reciprocated && !already_matched {
            match (full, self.policy) {
                (true, CapacityPolicy::Reject) => {
                    return Err(RemoteError::ApiError(format!(
                        "Match limit of {} reached",
                        self.capacity
                    )));
                }
                (true, CapacityPolicy::Ignore) => {}
                _ => {
                    state.matches.push(MatchRecord {
                        profile: profile.clone(),
                        super_liked,
                    });
                    is_match = true;
                }
            }
        }

        upsert_like(&mut state.liked, &profile, super_liked);

        Ok(if state.omit_match_flag {
            LikeOutcome::default()
        } else if is_match {
            LikeOutcome::matched()
        } else {
            LikeOutcome::unmatched()
        })
    }
}

fn upsert_like(liked: &mut Vec<LikeRecord>, profile: &Profile, super_liked: bool) {
    match liked.iter_mut().find(|l| l.profile.id == profile.id) {
        Some(existing) => existing.super_liked |= super_liked,
        None => liked.push(LikeRecord {
            profile: profile.clone(),
            super_liked,
        }),
    }
}

#[async_trait]
impl MatchingService for MemoryMatchingService {
    async fn list_profiles(&self) -> Result<Vec<Profile>, RemoteError> {
        self.enter(Operation::ListProfiles, RemoteCall::ListProfiles).await?;
        Ok(self.state.lock().await.profiles.clone())
    }

    async fn seed_profiles(&self) -> Result<(), RemoteError> {
        self.enter(Operation::SeedProfiles, RemoteCall::SeedProfiles).await?;
        let mut state = self.state.lock().await;
        if state.profiles.is_empty() {
            state.profiles = state.seed_catalog.clone();
        }
        Ok(())
    }

    async fn like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        self.enter(Operation::Like, RemoteCall::Like(profile_id.to_string())).await?;
        self.record_like(profile_id, false).await
    }

    async fn super_like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        self.enter(Operation::SuperLike, RemoteCall::SuperLike(profile_id.to_string())).await?;
        self.record_like(profile_id, true).await
    }

    async fn pass(&self, profile_id: &str) -> Result<(), RemoteError> {
        self.enter(Operation::Pass, RemoteCall::Pass(profile_id.to_string())).await?;
        self.state.lock().await.passed.push(profile_id.to_string());
        Ok(())
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, RemoteError> {
        self.enter(Operation::ListMatches, RemoteCall::ListMatches).await?;
        Ok(self.state.lock().await.matches.clone())
    }

    async fn list_liked(&self) -> Result<Vec<LikeRecord>, RemoteError> {
        self.enter(Operation::ListLiked, RemoteCall::ListLiked).await?;
        Ok(self.state.lock().await.liked.clone())
    }

    async fn remove_match(&self, profile_id: &str) -> Result<(), RemoteError> {
        self.enter(Operation::RemoveMatch, RemoteCall::RemoveMatch(profile_id.to_string())).await?;

        let mut state = self.state.lock().await;
        let before = state.matches.len();
        state.matches.retain(|m| m.profile.id != profile_id);
        if state.matches.len() == before {
            return Err(RemoteError::NotFound(format!("Match {}", profile_id)));
        }
        state.liked.retain(|l| l.profile.id != profile_id);
        Ok(())
    }
}
