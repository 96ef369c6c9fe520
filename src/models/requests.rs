use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;
use crate::models::domain::{normalize_tags, AccommodationType, SearchCriteria};

/// Errors raised for malformed search input, before any filtering happens
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation failed: {0}")]
    Fields(#[from] validator::ValidationErrors),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Request to search accommodations
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchAccommodationsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_query", rename = "userQuery")]
    pub user_query: String,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default, alias = "min_rating", rename = "minRating")]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "near_landmark", rename = "nearLandmark")]
    pub near_landmark: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_price_per_night", rename = "maxPricePerNight")]
    pub max_price_per_night: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl SearchAccommodationsRequest {
    /// Validate the request and build structured criteria.
    ///
    /// The geo center is left unset; resolving `near_landmark` belongs to the caller.
    pub fn to_criteria(&self) -> Result<SearchCriteria, ValidationError> {
        self.validate()?;

        if self.user_query.trim().is_empty() {
            return Err(ValidationError::field("userQuery", "must not be blank"));
        }

        if self.amenities.iter().any(|a| a.trim().is_empty()) {
            return Err(ValidationError::field("amenities", "amenity tags must not be empty"));
        }

        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<AccommodationType>().map_err(|e| {
                ValidationError::field("type", e.to_string())
            })?),
        };

        let criteria = SearchCriteria {
            min_rating: self.min_rating,
            city: self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            center: None,
            max_distance_km: self.max_distance_km,
            required_amenities: normalize_tags(&self.amenities),
            max_price_per_night: self.max_price_per_night,
            kind,
        };

        validate_criteria(&criteria)?;
        Ok(criteria)
    }

    /// Place name to resolve into a search center, if one was given
    pub fn place_name(&self) -> Option<&str> {
        self.near_landmark
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Semantic checks on criteria built in code rather than deserialized
pub fn validate_criteria(criteria: &SearchCriteria) -> Result<(), ValidationError> {
    if let Some(rating) = criteria.min_rating {
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(ValidationError::field("minRating", "must be between 0 and 5"));
        }
    }

    if let Some(distance) = criteria.max_distance_km {
        if !distance.is_finite() || distance < 0.0 {
            return Err(ValidationError::field("maxDistanceKm", "must be a non-negative number"));
        }
    }

    if let Some(price) = criteria.max_price_per_night {
        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::field("maxPricePerNight", "must be a non-negative number"));
        }
    }

    if let Some(center) = criteria.center {
        if !center.is_valid() {
            return Err(ValidationError::field("center", "coordinates out of range"));
        }
    }

    if criteria.required_amenities.iter().any(|a| a.trim().is_empty()) {
        return Err(ValidationError::field("amenities", "amenity tags must not be empty"));
    }

    Ok(())
}
