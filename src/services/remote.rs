use crate::models::{LikeOutcome, LikeRecord, MatchRecord, Profile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when talking to the matching service
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Unauthorized: missing or expired credential")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Network-level failure that is safe to retry as-is
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::RequestError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RemoteError::Unavailable(_) => true,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Unauthorized)
    }
}

/// Operations the session consumes from the matching service
///
/// The service owns profiles, likes and matches; the session never writes
/// them locally. Credentials are attached by the implementation.
#[async_trait]
pub trait MatchingService: Send + Sync {
    /// Full browsing catalog
    async fn list_profiles(&self) -> Result<Vec<Profile>, RemoteError>;

    /// Populate the default catalog; only called when the catalog is empty
    async fn seed_profiles(&self) -> Result<(), RemoteError>;

    async fn like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError>;

    async fn super_like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError>;

    async fn pass(&self, profile_id: &str) -> Result<(), RemoteError>;

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, RemoteError>;

    async fn list_liked(&self) -> Result<Vec<LikeRecord>, RemoteError>;

    async fn remove_match(&self, profile_id: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: MatchingService + ?Sized> MatchingService for Arc<T> {
    async fn list_profiles(&self) -> Result<Vec<Profile>, RemoteError> {
        (**self).list_profiles().await
    }

    async fn seed_profiles(&self) -> Result<(), RemoteError> {
        (**self).seed_profiles().await
    }

    async fn like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        (**self).like(profile_id).await
    }

    async fn super_like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        (**self).super_like(profile_id).await
    }

    async fn pass(&self, profile_id: &str) -> Result<(), RemoteError> {
        (**self).pass(profile_id).await
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, RemoteError> {
        (**self).list_matches().await
    }

    async fn list_liked(&self) -> Result<Vec<LikeRecord>, RemoteError> {
        (**self).list_liked().await
    }

    async fn remove_match(&self, profile_id: &str) -> Result<(), RemoteError> {
        (**self).remove_match(profile_id).await
    }
}
