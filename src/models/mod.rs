// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Accommodation, AccommodationType, Address, Location, SearchCriteria, ScoredCandidate};
pub use requests::{SearchAccommodationsRequest, ValidationError, validate_criteria};
pub use responses::{AccommodationsResponse, SearchAccommodationsResponse, HealthResponse, ErrorResponse};
