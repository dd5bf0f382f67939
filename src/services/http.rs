use crate::models::{LikeOutcome, LikeRecord, LikeRequest, MatchRecord, Profile};
use crate::services::credentials::CredentialStore;
use crate::services::remote::{MatchingService, RemoteError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Matching service API client
///
/// Handles all communication with the matching backend:
/// - Listing and seeding the profile catalog
/// - Sending like / super-like / pass decisions
/// - Listing and removing matches and likes
///
/// The bearer credential is read from the shared [`CredentialStore`] on every
/// call. A 401 clears it, which ends the session.
pub struct HttpMatchingService {
    base_url: String,
    client: Client,
    credentials: CredentialStore,
}

impl HttpMatchingService {
    /// Create a new matching service client
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: CredentialStore,
    ) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    fn profile_path(prefix: &str, profile_id: &str) -> String {
        format!("{}/{}", prefix, urlencoding::encode(profile_id))
    }

    /// Attach credential and request id, send, and map the status
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, RemoteError> {
        let token = self.credentials.token().await.ok_or(RemoteError::Unauthorized)?;
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(request_id = %request_id, "{}", what);

        let response = builder
            .bearer_auth(token)
            .header("X-Request-Id", request_id.as_str())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!(
                    request_id = %request_id,
                    "{} rejected credential, ending session",
                    what
                );
                self.credentials.clear().await;
                Err(RemoteError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(what.to_string())),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!(request_id = %request_id, "{} failed: {} - {}", what, status, body);
                Err(RemoteError::ApiError(format!("{}: {}", what, status)))
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, RemoteError> {
        let response = self.send(self.request(Method::GET, path), what).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    /// Decode a like response leniently
    ///
    /// The status already confirmed the like, so an empty or unreadable body
    /// or a missing boolean flag all mean no match.
    async fn like_outcome(response: Response) -> Result<LikeOutcome, RemoteError> {
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(LikeOutcome::default());
        }

        let json: Value = match serde_json::from_str(&body) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("Like response is not JSON ({}), assuming no match", e);
                return Ok(LikeOutcome::default());
            }
        };

        let is_match = json.get("isMatch").and_then(Value::as_bool);
        if is_match.is_none() {
            tracing::debug!("Like response carried no isMatch flag, assuming no match");
        }

        Ok(LikeOutcome { is_match })
    }
}

#[async_trait]
impl MatchingService for HttpMatchingService {
    async fn list_profiles(&self) -> Result<Vec<Profile>, RemoteError> {
        let profiles: Vec<Profile> = self.fetch("/profiles", "list profiles").await?;
        tracing::debug!("Fetched {} profiles", profiles.len());
        Ok(profiles)
    }

    async fn seed_profiles(&self) -> Result<(), RemoteError> {
        self.send(self.request(Method::POST, "/profiles/seed"), "seed profiles")
            .await?;
        Ok(())
    }

    async fn like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        let path = Self::profile_path("/matches/like", profile_id);
        let builder = self
            .request(Method::POST, &path)
            .json(&LikeRequest { super_liked: false });

        let response = self.send(builder, "like profile").await?;
        Self::like_outcome(response).await
    }

    async fn super_like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
        let path = Self::profile_path("/matches/superlike", profile_id);
        let response = self
            .send(self.request(Method::POST, &path), "super like profile")
            .await?;
        Self::like_outcome(response).await
    }

    async fn pass(&self, profile_id: &str) -> Result<(), RemoteError> {
        let path = Self::profile_path("/matches/pass", profile_id);
        self.send(self.request(Method::POST, &path), "pass profile")
            .await?;
        Ok(())
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, RemoteError> {
        self.fetch("/matches", "list matches").await
    }

    async fn list_liked(&self) -> Result<Vec<LikeRecord>, RemoteError> {
        self.fetch("/matches/liked", "list liked profiles").await
    }

    async fn remove_match(&self, profile_id: &str) -> Result<(), RemoteError> {
        let path = Self::profile_path("/matches", profile_id);
        self.send(self.request(Method::DELETE, &path), "remove match")
            .await?;
        Ok(())
    }
}
