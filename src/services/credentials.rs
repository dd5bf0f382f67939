use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential is empty")]
    Empty,

    #[error("credential has expired")]
    Expired,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Bearer credential issued by the matching service
#[derive(Clone)]
pub struct Credential {
    token: String,
    subject: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Accept a bearer token, reading its JWT claims when it has any
    ///
    /// The signature is not checked here; the matching service verifies it on
    /// every call. Opaque tokens are accepted without identity.
    pub fn parse(token: &str) -> Result<Self, CredentialError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => {
                let claims = data.claims;
                Ok(Self {
                    token: token.to_string(),
                    subject: claims.sub.or(claims.user_id).or(claims.id),
                    expires_at: claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single()),
                })
            }
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(CredentialError::Expired)
            }
            Err(e) => {
                tracing::debug!("Credential is not a readable JWT ({}), treating as opaque", e);
                Ok(Self {
                    token: token.to_string(),
                    subject: None,
                    expires_at: None,
                })
            }
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("subject", &self.subject)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Holds the credential of the running session
///
/// Cloning shares the same slot, so the HTTP client and the gateway see the
/// same credential; a 401 from the service clears it for both.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, credential: Credential) {
        *self.inner.write().await = Some(credential);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|c| c.token.clone())
    }

    pub async fn subject(&self) -> Option<String> {
        self.inner.read().await.as_ref().and_then(|c| c.subject.clone())
    }

    pub async fn is_present(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
