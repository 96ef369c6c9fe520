//! Stayfinder - accommodation search with LLM relevance reranking
//!
//! This library filters an in-memory lodging catalog on structured criteria
//! (rating, city, distance from a named place, amenities, price, type) and then
//! keeps only the results a language model judges relevant to the traveler's query.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{AccommodationFinder, GeoResolver, RelevanceRanker, RankerConfig, SearchOutcome, distance::haversine_distance};
pub use crate::models::{Accommodation, AccommodationType, Location, SearchCriteria, SearchAccommodationsRequest};
pub use crate::services::{CatalogStore, RelevanceScorer, ScorerError};
