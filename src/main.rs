use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use lume_swipe::config::{LoggingSettings, Settings};
use lume_swipe::models::ErrorResponse;
use lume_swipe::routes::{self, AppState};
use lume_swipe::services::{Credential, CredentialStore, HttpMatchingService};
use lume_swipe::Session;
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

fn json_error(kind: &str, message: String) -> actix_web::Error {
    let body = ErrorResponse {
        error: kind.to_string(),
        message,
        status_code: StatusCode::BAD_REQUEST.as_u16(),
    };
    error::InternalError::from_response(
        kind.to_string(),
        HttpResponse::BadRequest().json(body),
    )
    .into()
}

/// Handle JSON payload errors
fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    json_error("invalid_json", format!("Invalid JSON: {}", err))
}

/// Handle path parameter errors
fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    json_error("invalid_path", format!("Invalid path: {}", err))
}

/// Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
fn init_logging(logging: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_logging(&settings.logging);
    info!("Starting Lume swipe session gateway...");

    let credentials = CredentialStore::new();

    let service = HttpMatchingService::new(
        settings.remote.base_url.clone(),
        settings.remote.timeout(),
        credentials.clone(),
    )
    .map_err(|e| {
        error!("Failed to create matching service client: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    info!("Matching service client initialized for {}", settings.remote.base_url);

    let session = Arc::new(Session::with_capacity(
        Arc::new(service),
        settings.session.match_capacity,
    ));

    // Resume a session when a credential is configured
    if let Some(token) = settings.remote.token.as_deref() {
        match Credential::parse(token) {
            Ok(credential) => {
                credentials.set(credential).await;
                session.bootstrap().await;
                info!("Session bootstrapped from configured credential");
            }
            Err(e) => warn!("Ignoring configured credential: {}", e),
        }
    }

    let app_state = AppState::new(session, credentials);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(1);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
