use actix_web::{web, HttpResponse, Responder};
use tracing::Instrument;
use crate::core::{AccommodationFinder, SearchError};
use crate::models::{AccommodationsResponse, ErrorResponse, HealthResponse, SearchAccommodationsRequest, SearchAccommodationsResponse};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub finder: AccommodationFinder,
}

/// Configure all accommodation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/accommodations", web::get().to(get_all_accommodations))
        .route("/accommodations/search", web::post().to(search_accommodations));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let catalog_size = state.finder.catalog().len();
    let status = if catalog_size > 0 { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_size,
        timestamp: chrono::Utc::now(),
    })
}

/// List every accommodation without filtering
///
/// GET /api/v1/accommodations
async fn get_all_accommodations(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(AccommodationsResponse::new(state.finder.get_all().to_vec()))
}

/// Search endpoint
///
/// POST /api/v1/accommodations/search
///
/// Request body:
/// ```json
/// {
///   "userQuery": "luxury hotel with pool near the colosseum",
///   "minRating": 4.5,
///   "city": "Rome",
///   "nearLandmark": "Colosseum",
///   "maxDistanceKm": 1.0,
///   "amenities": ["pool"],
///   "maxPricePerNight": 500,
///   "type": "hotel"
/// }
/// ```
async fn search_accommodations(
    state: web::Data<AppState>,
    req: web::Json<SearchAccommodationsRequest>,
) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("search", %request_id);

    async move {
        let criteria = match req.to_criteria() {
            Ok(criteria) => criteria,
            Err(e) => {
                tracing::info!("Validation failed for search request: {}", e);
                return validation_failed(e.to_string());
            }
        };

        tracing::info!(
            "Searching accommodations: query={:?}, place={:?}",
            req.user_query,
            req.place_name()
        );

        match state
            .finder
            .search_near(criteria, req.place_name(), req.user_query.trim())
            .await
        {
            Ok(outcome) => HttpResponse::Ok().json(SearchAccommodationsResponse::new(
                outcome.matched_count,
                outcome.ranked,
            )),
            Err(SearchError::Validation(e)) => validation_failed(e.to_string()),
        }
    }
    .instrument(span)
    .await
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}
