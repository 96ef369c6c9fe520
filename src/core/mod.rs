// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod finder;
pub mod geocoding;
pub mod ranking;

pub use distance::{haversine_distance, distance_km, is_within_radius};
pub use filters::{matches_criteria, search};
pub use finder::{AccommodationFinder, SearchError, SearchOutcome};
pub use geocoding::{fallback_location, Gazetteer, GazetteerError, GeoResolver};
pub use ranking::{RankerConfig, RelevanceRanker, RELEVANCE_THRESHOLD};
