use serde::{Deserialize, Serialize};
use crate::models::domain::Accommodation;

/// Response for the list-all endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccommodationsResponse {
    pub message: String,
    pub accommodations: Vec<Accommodation>,
}

impl AccommodationsResponse {
    pub fn new(accommodations: Vec<Accommodation>) -> Self {
        Self {
            message: format!("Found {} total accommodation(s).", accommodations.len()),
            accommodations,
        }
    }
}

/// Response for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAccommodationsResponse {
    pub message: String,
    #[serde(rename = "matchedCount")]
    pub matched_count: usize,
    pub accommodations: Vec<Accommodation>,
}

impl SearchAccommodationsResponse {
    /// Build the envelope, choosing the message from the three possible outcomes
    pub fn new(matched_count: usize, accommodations: Vec<Accommodation>) -> Self {
        let message = if matched_count == 0 {
            "No accommodations found matching the criteria.".to_string()
        } else if accommodations.is_empty() {
            "Found some accommodations but none were highly relevant to your query.".to_string()
        } else {
            format!(
                "Found {} highly relevant accommodation(s) out of {} matching your criteria.",
                accommodations.len(),
                matched_count
            )
        };

        Self {
            message,
            matched_count,
            accommodations,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog_size: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
