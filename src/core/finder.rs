use crate::core::{filters, geocoding::GeoResolver, ranking::RelevanceRanker};
use crate::models::{validate_criteria, Accommodation, Location, SearchCriteria, ValidationError};
use crate::services::CatalogStore;
use thiserror::Error;

/// Errors that halt a search request
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result of the search pipeline
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Records that passed the structured filters, before reranking
    pub matched_count: usize,
    /// Relevant records, best first
    pub ranked: Vec<Accommodation>,
}

/// Main search orchestrator
///
/// # Pipeline Stages
/// 1. Place-name resolution to a search center
/// 2. Structured filtering over the catalog snapshot
/// 3. LLM relevance reranking
#[derive(Clone)]
pub struct AccommodationFinder {
    catalog: CatalogStore,
    resolver: GeoResolver,
    ranker: RelevanceRanker,
}

impl AccommodationFinder {
    pub fn new(catalog: CatalogStore, resolver: GeoResolver, ranker: RelevanceRanker) -> Self {
        Self {
            catalog,
            resolver,
            ranker,
        }
    }

    /// Every accommodation, unfiltered, in catalog order
    pub fn get_all(&self) -> &[Accommodation] {
        self.catalog.all()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Resolve a free-text place into a search center
    pub fn resolve_place(&self, place: &str) -> Option<Location> {
        self.resolver.resolve(place)
    }

    /// Resolve `place` into `criteria.center`, then run the search.
    ///
    /// An unresolved (blank) place leaves the center unset, so no geo constraint applies.
    pub async fn search_near(
        &self,
        mut criteria: SearchCriteria,
        place: Option<&str>,
        user_query: &str,
    ) -> Result<SearchOutcome, SearchError> {
        if let Some(place) = place {
            criteria.center = self.resolve_place(place);
        }
        self.search(criteria, user_query).await
    }

    /// Filter the catalog with `criteria`, then rerank the matches against `user_query`
    ///
    /// Only validation failures are errors; everything else degrades to fewer results.
    pub async fn search(
        &self,
        criteria: SearchCriteria,
        user_query: &str,
    ) -> Result<SearchOutcome, SearchError> {
        validate_criteria(&criteria)?;

        let matches = filters::search(self.catalog.all(), &criteria);
        let matched_count = matches.len();

        tracing::debug!(
            "Filtered catalog: {} of {} accommodations match",
            matched_count,
            self.catalog.len()
        );

        if matches.is_empty() {
            return Ok(SearchOutcome {
                matched_count,
                ranked: Vec::new(),
            });
        }

        let ranked = self.ranker.rank(matches, user_query).await;

        tracing::info!(
            matched = matched_count,
            relevant = ranked.len(),
            "Search completed"
        );

        Ok(SearchOutcome {
            matched_count,
            ranked,
        })
    }
}
