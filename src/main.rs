use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use stayfinder::config::Settings;
use stayfinder::core::{AccommodationFinder, Gazetteer, GeoResolver, RelevanceRanker, RELEVANCE_THRESHOLD};
use stayfinder::routes::{self, accommodations::AppState};
use stayfinder::services::{CatalogStore, ChatCompletionsScorer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn fail(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Stayfinder accommodation search service...");

    let settings = match std::env::var("STAYFINDER_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    }
    .map_err(|e| fail(format!("Configuration error: {}", e)))?;

    info!("Configuration loaded successfully");

    let catalog = match &settings.catalog.accommodations_path {
        Some(path) => CatalogStore::load(path),
        None => CatalogStore::bundled(),
    }
    .map_err(|e| fail(format!("Failed to load catalog: {}", e)))?;

    info!("Catalog loaded ({} accommodations)", catalog.len());

    let gazetteer = match &settings.catalog.gazetteer_path {
        Some(path) => Gazetteer::load(path),
        None => Gazetteer::bundled(),
    }
    .map_err(|e| fail(format!("Failed to load gazetteer: {}", e)))?;

    info!("Gazetteer loaded ({} places)", gazetteer.len());

    let ranker_config = settings.ranking.ranker_config();

    let scorer = ChatCompletionsScorer::new(
        settings.scorer.endpoint.clone(),
        settings.scorer.api_key.clone(),
        settings.scorer.model.clone(),
        settings.scorer.temperature,
        ranker_config.call_timeout.saturating_add(Duration::from_secs(1)),
    )
    .map_err(|e| fail(format!("Failed to create scorer client: {}", e)))?;

    info!(
        "Scorer initialized (model: {}, concurrency: {}, threshold: >{})",
        scorer.model(),
        ranker_config.max_concurrency,
        RELEVANCE_THRESHOLD
    );

    let finder = AccommodationFinder::new(
        catalog,
        GeoResolver::new(gazetteer),
        RelevanceRanker::new(Arc::new(scorer), ranker_config),
    );

    let app_state = AppState { finder };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
