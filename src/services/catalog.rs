use crate::models::Accommodation;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const BUNDLED_CATALOG: &str = include_str!("../../data/accommodations.json");

/// Errors that can occur when building the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate accommodation id: {0}")]
    DuplicateId(String),

    #[error("Invalid accommodation {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

/// Immutable, in-memory snapshot of the accommodation catalog
///
/// Built once at startup. Clones share the same snapshot, so concurrent
/// readers need no locking.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    accommodations: Arc<[Accommodation]>,
}

impl CatalogStore {
    /// Build a store from records, checking the catalog invariants first
    pub fn new(accommodations: Vec<Accommodation>) -> Result<Self, CatalogError> {
        validate_records(&accommodations)?;
        Ok(Self {
            accommodations: accommodations.into(),
        })
    }

    /// The catalog fixture shipped with the crate
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let accommodations: Vec<Accommodation> = serde_json::from_str(raw)?;
        Self::new(accommodations)
    }

    /// Every record, in catalog order
    pub fn all(&self) -> &[Accommodation] {
        &self.accommodations
    }

    pub fn get(&self, id: &str) -> Option<&Accommodation> {
        self.accommodations.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.accommodations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accommodations.is_empty()
    }
}

fn validate_records(accommodations: &[Accommodation]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(accommodations.len());

    for accommodation in accommodations {
        let invalid = |reason: &str| CatalogError::InvalidRecord {
            id: accommodation.id.clone(),
            reason: reason.to_string(),
        };

        if accommodation.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if !seen.insert(accommodation.id.as_str()) {
            return Err(CatalogError::DuplicateId(accommodation.id.clone()));
        }
        if !accommodation.rating.is_finite() || !(0.0..=5.0).contains(&accommodation.rating) {
            return Err(invalid("rating must be between 0 and 5"));
        }
        if !accommodation.position.is_valid() {
            return Err(invalid("position out of range"));
        }
        if !accommodation.price_per_night.is_finite() || accommodation.price_per_night < 0.0 {
            return Err(invalid("price per night must be non-negative"));
        }
    }

    Ok(())
}
