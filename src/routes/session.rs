use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::Session;
use crate::models::{
    Decision, DecisionResponse, ErrorResponse, HealthResponse, LoginRequest, SessionResponse,
};
use crate::services::{Credential, CredentialStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub credentials: CredentialStore,
}

impl AppState {
    pub fn new(session: Arc<Session>, credentials: CredentialStore) -> Self {
        Self { session, credentials }
    }

    /// Tear the session down if the credential was revoked mid-call
    async fn settle(&self) {
        if !self.credentials.is_present().await {
            self.session.expire().await;
        }
    }

    async fn response(&self) -> SessionResponse {
        SessionResponse {
            authenticated: self.credentials.is_present().await,
            subject: self.credentials.subject().await,
            session: self.session.snapshot().await,
        }
    }
}

/// Configure all session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/session", web::get().to(get_session))
        .route("/session/login", web::post().to(login))
        .route("/session/logout", web::post().to(logout))
        .route("/session/decisions/{decision}", web::post().to(decide))
        .route("/session/refresh", web::post().to(refresh))
        .route("/session/matches/{profile_id}", web::delete().to(remove_match))
        .route("/session/error", web::delete().to(dismiss_error));
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "Not authenticated".to_string(),
        message: "Log in to start a session".to_string(),
        status_code: 401,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Current session state
///
/// GET /api/v1/session
async fn get_session(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.response().await)
}

/// Start a session with an issued credential
///
/// POST /api/v1/session/login
///
/// Request body:
/// ```json
/// {
///   "token": "string",
///   "email": "string"
/// }
/// ```
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for login request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let credential = match Credential::parse(&req.token) {
        Ok(credential) => credential,
        Err(e) => {
            tracing::info!("Rejected login credential: {}", e);
            return HttpResponse::Unauthorized().json(ErrorResponse {
                error: "Invalid credential".to_string(),
                message: e.to_string(),
                status_code: 401,
            });
        }
    };

    tracing::info!(
        "Starting session for {}",
        req.email.as_deref().or(credential.subject()).unwrap_or("unknown user")
    );

    if let Some(expires_at) = credential.expires_at() {
        tracing::info!("Credential valid until {}", expires_at.to_rfc3339());
    }

    state.session.logout().await;
    state.credentials.set(credential).await;
    state.session.bootstrap().await;
    state.settle().await;

    HttpResponse::Ok().json(state.response().await)
}

/// End the session and discard the credential
///
/// POST /api/v1/session/logout
async fn logout(state: web::Data<AppState>) -> impl Responder {
    state.credentials.clear().await;
    state.session.logout().await;
    HttpResponse::Ok().json(state.response().await)
}

/// Apply a decision to the presented candidate
///
/// POST /api/v1/session/decisions/{pass|like|superlike}
async fn decide(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let decision: Decision = match path.into_inner().parse() {
        Ok(decision) => decision,
        Err(message) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid decision".to_string(),
                message,
                status_code: 400,
            });
        }
    };

    if !state.credentials.is_present().await {
        return unauthorized();
    }

    let outcome = state.session.decide(decision).await;
    state.settle().await;

    HttpResponse::Ok().json(DecisionResponse {
        outcome,
        session: state.response().await,
    })
}

/// Reconcile matches and likes with the matching service
///
/// POST /api/v1/session/refresh
async fn refresh(state: web::Data<AppState>) -> impl Responder {
    if !state.credentials.is_present().await {
        return unauthorized();
    }

    state.session.refresh_both().await;
    state.settle().await;

    HttpResponse::Ok().json(state.response().await)
}

/// Remove a match
///
/// DELETE /api/v1/session/matches/{profileId}
async fn remove_match(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    if !state.credentials.is_present().await {
        return unauthorized();
    }

    let profile_id = path.into_inner();
    state.session.remove_match(&profile_id).await;
    state.settle().await;

    HttpResponse::Ok().json(state.response().await)
}

/// Dismiss the error banner
///
/// DELETE /api/v1/session/error
async fn dismiss_error(state: web::Data<AppState>) -> impl Responder {
    state.session.dismiss_error().await;
    HttpResponse::Ok().json(state.response().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SESSION_EXPIRED;
    use crate::models::{LikeOutcome, LikeRecord, MatchRecord, Profile};
    use crate::services::{MatchingService, MemoryMatchingService, RemoteError};
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Serves a catalog, but rejects every like as the backend does for a
    /// revoked token: the shared credential is dropped and 401 comes back
    struct RevokingService {
        inner: MemoryMatchingService,
        credentials: CredentialStore,
    }

    #[async_trait]
    impl MatchingService for RevokingService {
        async fn list_profiles(&self) -> Result<Vec<Profile>, RemoteError> {
            self.inner.list_profiles().await
        }

        async fn seed_profiles(&self) -> Result<(), RemoteError> {
            self.inner.seed_profiles().await
        }

        async fn like(&self, _profile_id: &str) -> Result<LikeOutcome, RemoteError> {
            self.credentials.clear().await;
            Err(RemoteError::Unauthorized)
        }

        async fn super_like(&self, profile_id: &str) -> Result<LikeOutcome, RemoteError> {
            self.inner.super_like(profile_id).await
        }

        async fn pass(&self, profile_id: &str) -> Result<(), RemoteError> {
            self.inner.pass(profile_id).await
        }

        async fn list_matches(&self) -> Result<Vec<MatchRecord>, RemoteError> {
            self.inner.list_matches().await
        }

        async fn list_liked(&self) -> Result<Vec<LikeRecord>, RemoteError> {
            self.inner.list_liked().await
        }

        async fn remove_match(&self, profile_id: &str) -> Result<(), RemoteError> {
            self.inner.remove_match(profile_id).await
        }
    }

    fn app_state() -> AppState {
        let service = Arc::new(MemoryMatchingService::new(vec![]));
        AppState::new(Arc::new(Session::new(service)), CredentialStore::new())
    }

    fn candidate(id: &str) -> Profile {
        serde_json::from_value(json!({ "_id": id, "name": "Candidate", "age": 26 })).unwrap()
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_decision_requires_credential() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/session/decisions/like").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_decision_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/session/decisions/maybe").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_login_then_like() {
        let service = Arc::new(
            MemoryMatchingService::new(vec![candidate("p1"), candidate("p2")])
                .with_admirers(["p1"]),
        );
        let state = AppState::new(Arc::new(Session::new(service)), CredentialStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/session/login")
            .set_json(json!({ "token": "session-token" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["queueLength"], 2);
        assert_eq!(body["candidate"]["_id"], "p1");

        let req = test::TestRequest::post().uri("/session/decisions/like").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"]["status"], "applied");
        assert_eq!(body["outcome"]["isMatch"], true);
        assert_eq!(body["session"]["cursor"], 1);
        assert_eq!(body["session"]["matchCount"], 1);
    }

    #[actix_web::test]
    async fn test_login_rejects_empty_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/session/login")
            .set_json(json!({ "token": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_revoked_credential_ends_session_with_message() {
        let credentials = CredentialStore::new();
        let service = Arc::new(RevokingService {
            inner: MemoryMatchingService::new(vec![candidate("p1"), candidate("p2")]),
            credentials: credentials.clone(),
        });
        let state = AppState::new(Arc::new(Session::new(service)), credentials);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/session/login")
            .set_json(json!({ "token": "session-token" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["queueLength"], 2);

        let req = test::TestRequest::post().uri("/session/decisions/like").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"]["status"], "failed");
        assert_eq!(body["session"]["authenticated"], false);
        assert_eq!(body["session"]["queueLength"], 0);
        assert_eq!(body["session"]["error"], SESSION_EXPIRED);

        let req = test::TestRequest::get().uri("/session").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], SESSION_EXPIRED);
    }
}
