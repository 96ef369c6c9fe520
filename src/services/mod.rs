// Service exports
pub mod catalog;
pub mod scorer;

pub use catalog::{CatalogStore, CatalogError};
pub use scorer::{ChatCompletionsScorer, RelevanceScorer, ScorerError};
