use crate::models::{Accommodation, ScoredCandidate};
use crate::services::{RelevanceScorer, ScorerError};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Instruction sent with every scoring call
pub const SYSTEM_CONTEXT: &str = "You are a helpful assistant that rates accommodations based on user queries. Respond only with a number from 1 to 10.";

/// Score assigned when the model's reply cannot be parsed
const PARSE_FAILURE_SCORE: u8 = 1;

/// Candidates must score strictly above this to be kept
pub const RELEVANCE_THRESHOLD: u8 = 6;

/// Ranker tuning
#[derive(Debug, Clone, Copy)]
pub struct RankerConfig {
    /// Maximum simultaneous in-flight scoring calls
    pub max_concurrency: usize,
    /// Per-candidate call budget
    pub call_timeout: Duration,
    /// Budget for a whole `rank` call; `None` means unbounded
    pub deadline: Option<Duration>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            call_timeout: Duration::from_secs(20),
            deadline: Some(Duration::from_secs(60)),
        }
    }
}

/// Pointwise LLM reranker
///
/// Each candidate is scored independently against the user query. A failing
/// candidate is dropped on its own and never fails the batch.
#[derive(Clone)]
pub struct RelevanceRanker {
    scorer: Arc<dyn RelevanceScorer>,
    config: RankerConfig,
}

impl RelevanceRanker {
    pub fn new(scorer: Arc<dyn RelevanceScorer>, config: RankerConfig) -> Self {
        Self { scorer, config }
    }

    /// Rank candidates using the configured overall deadline
    pub async fn rank(&self, candidates: Vec<Accommodation>, user_query: &str) -> Vec<Accommodation> {
        // A budget too large to represent is the same as no budget
        let deadline = self
            .config
            .deadline
            .and_then(|budget| Instant::now().checked_add(budget));
        self.rank_until(candidates, user_query, deadline).await
    }

    /// Rank candidates, issuing no new scoring calls once `deadline` has passed.
    ///
    /// Output keeps only scores above the threshold, sorted by score descending;
    /// ties keep their input order.
    pub async fn rank_until(
        &self,
        candidates: Vec<Accommodation>,
        user_query: &str,
        deadline: Option<Instant>,
    ) -> Vec<Accommodation> {
        if candidates.is_empty() {
            return candidates;
        }

        let total = candidates.len();

        // `buffered` keeps input order, which the stable sort below relies on
        let scored: Vec<Option<ScoredCandidate>> = stream::iter(candidates)
            .map(|accommodation| self.score_candidate(accommodation, user_query, deadline))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut kept: Vec<ScoredCandidate> = scored
            .into_iter()
            .flatten()
            .filter(|candidate| candidate.score > RELEVANCE_THRESHOLD)
            .collect();

        kept.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!("Reranked {} candidates, kept {}", total, kept.len());

        kept.into_iter().map(|candidate| candidate.accommodation).collect()
    }

    async fn score_candidate(
        &self,
        accommodation: Accommodation,
        user_query: &str,
        deadline: Option<Instant>,
    ) -> Option<ScoredCandidate> {
        let now = Instant::now();
        let call_deadline = match deadline {
            Some(deadline) if now >= deadline => {
                tracing::warn!(
                    event = "rank.deadline_exceeded",
                    accommodation_id = %accommodation.id,
                    "Ranking deadline passed, not scoring {}",
                    accommodation.name
                );
                return None;
            }
            Some(deadline) => Some(
                now.checked_add(self.config.call_timeout)
                    .map_or(deadline, |call_end| deadline.min(call_end)),
            ),
            None => now.checked_add(self.config.call_timeout),
        };

        let prompt = build_prompt(&accommodation, user_query);
        let call = self.scorer.score(SYSTEM_CONTEXT, &prompt);
        let result = match call_deadline {
            Some(call_deadline) => timeout_at(call_deadline, call)
                .await
                .unwrap_or(Err(ScorerError::Timeout)),
            None => call.await,
        };

        match result {
            Ok(text) => {
                let score = parse_score(&text).unwrap_or_else(|| {
                    tracing::warn!(
                        event = "rank.score_parse_failed",
                        accommodation_id = %accommodation.id,
                        reply = %text.trim(),
                        "Invalid score received for {}, defaulting to {}",
                        accommodation.name,
                        PARSE_FAILURE_SCORE
                    );
                    PARSE_FAILURE_SCORE
                });
                tracing::trace!("Scored {} at {}", accommodation.name, score);
                Some(ScoredCandidate { accommodation, score })
            }
            Err(e) => {
                tracing::warn!(
                    event = "rank.score_call_failed",
                    accommodation_id = %accommodation.id,
                    error = %e,
                    "Failed to score {}, skipping",
                    accommodation.name
                );
                None
            }
        }
    }
}

/// Build the scoring prompt for one candidate
pub fn build_prompt(accommodation: &Accommodation, user_query: &str) -> String {
    format!(
        "Rate the following accommodation's relevance to the user query on a scale from 1 to 10.\n\
         Only respond with a single number between 1 and 10.\n\
         \n\
         User Query: {query}\n\
         \n\
         Accommodation:\n\
         Name: {name}\n\
         Type: {kind}\n\
         Rating: {rating}/5\n\
         Price per night: €{price:.2}\n\
         Location: {location}\n\
         Amenities: {amenities}\n\
         Description: {description}\n\
         \n\
         Relevance Score (1-10):",
        query = user_query,
        name = accommodation.name,
        kind = accommodation.kind,
        rating = accommodation.rating,
        price = accommodation.price_per_night,
        location = accommodation.address,
        amenities = accommodation.amenities.join(", "),
        description = accommodation.description,
    )
}

/// Parse a model reply into a score in `1..=10`.
///
/// Accepts at most one trailing period ("8." is 8, "8..." is not); anything else
/// that is not a bare integer is rejected.
pub fn parse_score(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed
        .parse::<u8>()
        .ok()
        .filter(|score| (1..=10).contains(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccommodationType, Address, Location};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies by looking for a candidate name in the prompt
    struct CannedScorer {
        replies: HashMap<&'static str, &'static str>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl CannedScorer {
        fn new(replies: &[(&'static str, &'static str)]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                delay: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl RelevanceScorer for CannedScorer {
        async fn score(&self, _system_context: &str, prompt: &str) -> Result<String, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let reply = self
                .replies
                .iter()
                .find(|(name, _)| prompt.contains(&format!("Name: {}\n", name)))
                .map(|(_, reply)| *reply);

            match reply {
                Some("ERROR") => Err(ScorerError::InvalidResponse("boom".to_string())),
                Some("HANG") => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("10".to_string())
                }
                Some(reply) => Ok(reply.to_string()),
                None => Ok("1".to_string()),
            }
        }
    }

    fn create_accommodation(id: &str, name: &str) -> Accommodation {
        Accommodation {
            id: id.to_string(),
            name: name.to_string(),
            kind: AccommodationType::Hotel,
            rating: 4.5,
            amenities: vec!["wifi".to_string(), "pool".to_string()],
            position: Location::new(41.89, 12.49),
            address: Address {
                street: "Via Labicana 125".to_string(),
                city: "Rome".to_string(),
                region: "Lazio".to_string(),
                postal_code: "00184".to_string(),
                country: "Italy".to_string(),
            },
            price_per_night: 120.0,
            description: "Test description".to_string(),
        }
    }

    fn ranker(scorer: Arc<CannedScorer>, config: RankerConfig) -> RelevanceRanker {
        RelevanceRanker::new(scorer, config)
    }

    fn names(ranked: &[Accommodation]) -> Vec<&str> {
        ranked.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("7"), Some(7));
        assert_eq!(parse_score(" 10 \n"), Some(10));
        assert_eq!(parse_score("8."), Some(8));
        assert_eq!(parse_score("8..."), None);
        assert_eq!(parse_score("8 ."), None);
        assert_eq!(parse_score("0"), None);
        assert_eq!(parse_score("11"), None);
        assert_eq!(parse_score("-3"), None);
        assert_eq!(parse_score("eight"), None);
        assert_eq!(parse_score("Score: 9"), None);
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt(&create_accommodation("1", "Palazzo Manfredi"), "luxury hotel with pool");

        assert!(prompt.contains("User Query: luxury hotel with pool"));
        assert!(prompt.contains("Name: Palazzo Manfredi\n"));
        assert!(prompt.contains("Type: hotel"));
        assert!(prompt.contains("Rating: 4.5/5"));
        assert!(prompt.contains("Price per night: €120.00"));
        assert!(prompt.contains("Location: Via Labicana 125, 00184 Rome, Lazio, Italy"));
        assert!(prompt.contains("Amenities: wifi, pool"));
        assert!(prompt.ends_with("Relevance Score (1-10):"));
    }

    #[tokio::test]
    async fn test_threshold_and_order() {
        let scorer = Arc::new(CannedScorer::new(&[
            ("A", "7"),
            ("B", "6"),
            ("C", "10"),
            ("D", "9"),
        ]));
        let candidates = vec![
            create_accommodation("1", "A"),
            create_accommodation("2", "B"),
            create_accommodation("3", "C"),
            create_accommodation("4", "D"),
        ];

        let ranked = ranker(scorer, RankerConfig::default()).rank(candidates, "query").await;

        assert_eq!(names(&ranked), vec!["C", "D", "A"]);
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let scorer = Arc::new(CannedScorer::new(&[("A", "8"), ("B", "9"), ("C", "8"), ("D", "8")]));
        let candidates = vec![
            create_accommodation("1", "A"),
            create_accommodation("2", "B"),
            create_accommodation("3", "C"),
            create_accommodation("4", "D"),
        ];

        let ranked = ranker(scorer, RankerConfig::default()).rank(candidates, "query").await;

        assert_eq!(names(&ranked), vec!["B", "A", "C", "D"]);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let scorer = Arc::new(CannedScorer::new(&[
            ("A", "ERROR"),
            ("B", "not a number"),
            ("C", "8"),
        ]));
        let candidates = vec![
            create_accommodation("1", "A"),
            create_accommodation("2", "B"),
            create_accommodation("3", "C"),
        ];

        let ranked = ranker(scorer, RankerConfig::default()).rank(candidates, "query").await;

        assert_eq!(names(&ranked), vec!["C"]);
    }

    #[tokio::test]
    async fn test_call_timeout_drops_only_that_candidate() {
        let scorer = Arc::new(CannedScorer::new(&[("A", "HANG"), ("B", "9")]));
        let config = RankerConfig {
            call_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let candidates = vec![create_accommodation("1", "A"), create_accommodation("2", "B")];

        let ranked = ranker(scorer, config).rank(candidates, "query").await;

        assert_eq!(names(&ranked), vec!["B"]);
    }

    #[tokio::test]
    async fn test_expired_deadline_issues_no_calls() {
        let scorer = Arc::new(CannedScorer::new(&[("A", "9")]));
        let ranker = ranker(scorer.clone(), RankerConfig::default());
        let candidates = vec![create_accommodation("1", "A")];

        let ranked = ranker
            .rank_until(candidates, "query", Some(Instant::now() - Duration::from_millis(1)))
            .await;

        assert!(ranked.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let scorer = Arc::new(
            CannedScorer::new(&[]).with_delay(Duration::from_millis(20)),
        );
        let config = RankerConfig {
            max_concurrency: 3,
            ..Default::default()
        };
        let candidates: Vec<Accommodation> = (0..12)
            .map(|i| create_accommodation(&i.to_string(), &format!("Stay {}", i)))
            .collect();

        let ranked = ranker(scorer.clone(), config).rank(candidates, "query").await;

        assert!(ranked.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 12);
        let peak = scorer.max_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {} exceeded cap", peak);
        assert!(peak > 1, "calls should overlap");
    }

    #[tokio::test]
    async fn test_unparseable_replies_never_kept() {
        struct ShrugScorer;

        #[async_trait]
        impl RelevanceScorer for ShrugScorer {
            async fn score(&self, _system_context: &str, _prompt: &str) -> Result<String, ScorerError> {
                Ok("no idea".to_string())
            }
        }

        let candidates: Vec<Accommodation> = (0..12)
            .map(|i| create_accommodation(&i.to_string(), &format!("Stay {}", i)))
            .collect();

        let ranked = RelevanceRanker::new(Arc::new(ShrugScorer), RankerConfig::default())
            .rank(candidates, "query")
            .await;

        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_huge_budgets_do_not_overflow() {
        let scorer = Arc::new(CannedScorer::new(&[("A", "9"), ("B", "3")]));
        let config = RankerConfig {
            call_timeout: Duration::MAX,
            deadline: Some(Duration::MAX),
            ..Default::default()
        };
        let candidates = vec![create_accommodation("1", "A"), create_accommodation("2", "B")];

        let ranked = ranker(scorer, config).rank(candidates, "query").await;

        assert_eq!(names(&ranked), vec!["A"]);
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let scorer = Arc::new(CannedScorer::new(&[]));
        let ranked = ranker(scorer.clone(), RankerConfig::default()).rank(vec![], "query").await;

        assert!(ranked.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }
}
