//! Natural-language query routing.
//!
//! A query is classified into a [`QueryIntent`] by keyword rules, entities
//! are extracted through a [`TextAnalyser`], and [`QueryRouter`] dispatches
//! to the matching [`ArticleCatalog`] listing.
//!
//! # Examples
//! ```
//! use newsdesk_core::{QueryIntent, classify_intent};
//!
//! assert_eq!(classify_intent("latest technology stories"), QueryIntent::Category);
//! assert_eq!(classify_intent("headlines from reuters"), QueryIntent::Source);
//! assert_eq!(classify_intent("solar power"), QueryIntent::Search);
//! ```

use geo::Coord;
use log::{debug, warn};
use thiserror::Error;

use crate::{Article, ArticleCatalog, StoreError};

/// Entities at or below this salience are discarded.
pub const ENTITY_SALIENCE_THRESHOLD: f32 = 0.1;

/// Confidence reported when entity extraction succeeded.
pub const ANALYSIS_CONFIDENCE: f32 = 0.85;

/// Radius used for `nearby` intents, in kilometres.
pub const NEARBY_QUERY_RADIUS_KM: f64 = 10.0;

/// Minimum relevance used for `score` intents.
pub const SCORE_QUERY_MIN: f32 = 0.7;

/// Default number of articles returned by routed queries.
pub const DEFAULT_QUERY_LIMIT: usize = 5;

/// What the reader is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QueryIntent {
    /// Stories close to the reader.
    Nearby,
    /// Stories in a named category.
    Category,
    /// Stories from a named publisher.
    Source,
    /// Highly relevant stories.
    Score,
    /// Free-text search.
    Search,
}

/// Keyword rules in priority order; the first rule with a matching word wins.
pub const INTENT_RULES: [(QueryIntent, &[&str]); 4] = [
    (
        QueryIntent::Nearby,
        &["near", "nearby", "around", "in", "at", "location", "area"],
    ),
    (
        QueryIntent::Category,
        &[
            "technology",
            "business",
            "sports",
            "politics",
            "entertainment",
            "science",
        ],
    ),
    (
        QueryIntent::Source,
        &["from", "source", "times", "reuters", "cnn", "bbc"],
    ),
    (
        QueryIntent::Score,
        &["top", "best", "high", "score", "relevant", "trending"],
    ),
];

impl QueryIntent {
    /// Return the intent as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearby => "nearby",
            Self::Category => "category",
            Self::Source => "source",
            Self::Score => "score",
            Self::Search => "search",
        }
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query by whole-word keyword match, ignoring case.
///
/// Words are maximal runs of alphanumeric characters, so `"pricing"` does
/// not trigger the `in` keyword.
#[must_use]
pub fn classify_intent(query: &str) -> QueryIntent {
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| words.iter().any(|word| keywords.contains(word)))
        .map_or(QueryIntent::Search, |(intent, _)| *intent)
}

/// A named entity reported by a [`TextAnalyser`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Surface text of the entity.
    pub name: String,
    /// Importance of the entity within the text, in `0.0..=1.0`.
    pub salience: f32,
}

/// Failure reported by a [`TextAnalyser`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analysis service could not be reached.
    #[error("text analysis request failed")]
    Request {
        /// Transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// The analysis service rejected the request.
    #[error("text analysis service responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The analysis response could not be decoded.
    #[error("text analysis response was malformed")]
    Malformed {
        /// Decoding error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Extracts named entities from free text.
pub trait TextAnalyser: Send + Sync {
    /// Return the entities found in `text`.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when the analysis cannot be completed.
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError>;
}

impl<T: TextAnalyser + ?Sized> TextAnalyser for Box<T> {
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError> {
        (**self).extract_entities(text)
    }
}

/// Analyser that never finds entities; routing falls back to keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordOnlyAnalyser;

impl TextAnalyser for KeywordOnlyAnalyser {
    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, AnalysisError> {
        Ok(Vec::new())
    }
}

/// Outcome of analysing a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnalysis {
    /// Keyword-derived intent.
    pub intent: QueryIntent,
    /// Salient entity names in analyser order.
    pub entities: Vec<String>,
    /// [`ANALYSIS_CONFIDENCE`] on success, `0.0` when the analyser failed.
    pub confidence: f32,
}

/// Classify `query` and extract its salient entities.
///
/// Analyser failures are logged and degrade to an empty entity list with
/// zero confidence; the keyword intent still applies.
pub fn analyse_query<A>(analyser: &A, query: &str) -> QueryAnalysis
where
    A: TextAnalyser + ?Sized,
{
    let intent = classify_intent(query);
    match analyser.extract_entities(query) {
        Ok(entities) => QueryAnalysis {
            intent,
            entities: entities
                .into_iter()
                .filter(|entity| {
                    !entity.name.trim().is_empty() && entity.salience > ENTITY_SALIENCE_THRESHOLD
                })
                .map(|entity| entity.name)
                .collect(),
            confidence: ANALYSIS_CONFIDENCE,
        },
        Err(err) => {
            warn!("entity extraction failed for query {query:?}: {err}");
            QueryAnalysis {
                intent,
                entities: Vec::new(),
                confidence: 0.0,
            }
        }
    }
}

/// Articles selected for a natural-language query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    /// How the query was interpreted.
    pub analysis: QueryAnalysis,
    /// Matching articles.
    pub articles: Vec<Article>,
    /// The query text as received.
    pub query_used: String,
}

impl QueryAnswer {
    /// Number of articles returned.
    #[must_use]
    pub fn total_results(&self) -> usize {
        self.articles.len()
    }
}

/// Errors returned by [`QueryRouter::answer`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query contained no text.
    #[error("query must not be empty")]
    EmptyQuery,
    /// The catalogue could not be read.
    #[error("article catalogue unavailable")]
    Store(#[from] StoreError),
}

/// Dispatches analysed queries to catalogue listings.
#[derive(Debug)]
pub struct QueryRouter<C, A> {
    catalog: C,
    analyser: A,
    limit: usize,
}

impl<C, A> QueryRouter<C, A>
where
    C: ArticleCatalog,
    A: TextAnalyser,
{
    /// Create a router returning [`DEFAULT_QUERY_LIMIT`] articles.
    pub const fn new(catalog: C, analyser: A) -> Self {
        Self {
            catalog,
            analyser,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    /// Override the number of articles returned.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Answer `query` for a reader optionally located at `location`.
    ///
    /// Category and source intents use the first entity and return nothing
    /// without one. Nearby intents need `location`. Score intents use
    /// [`SCORE_QUERY_MIN`]. Anything else is a free-text search.
    ///
    /// # Errors
    /// Returns [`QueryError::EmptyQuery`] for blank input and
    /// [`QueryError::Store`] when the catalogue fails.
    pub fn answer(
        &self,
        query: &str,
        location: Option<Coord<f64>>,
    ) -> Result<QueryAnswer, QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let analysis = analyse_query(&self.analyser, query);
        let first_entity = analysis.entities.first().map(String::as_str);
        let articles = match (analysis.intent, first_entity, location) {
            (QueryIntent::Category, Some(entity), _) => {
                self.catalog.by_category(entity, self.limit)?
            }
            (QueryIntent::Source, Some(entity), _) => self.catalog.by_source(entity, self.limit)?,
            (QueryIntent::Nearby, _, Some(centre)) => {
                self.catalog
                    .nearby(centre, NEARBY_QUERY_RADIUS_KM, self.limit)?
            }
            (QueryIntent::Score, _, _) => self.catalog.by_min_score(SCORE_QUERY_MIN, self.limit)?,
            (QueryIntent::Search, _, _) => self.catalog.search(query, self.limit)?,
            (intent, _, _) => {
                debug!("no {intent} parameters available for query {query:?}");
                Vec::new()
            }
        };
        Ok(QueryAnswer {
            analysis,
            articles,
            query_used: query.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingAnalyser, FixedAnalyser, sample_catalog};
    use crate::MemoryArticleStore;
    use rstest::{fixture, rstest};

    #[rstest]
    #[case("what is happening near me", QueryIntent::Nearby)]
    #[case("sports in Leeds", QueryIntent::Nearby)]
    #[case("Technology news", QueryIntent::Category)]
    #[case("headlines from the BBC", QueryIntent::Source)]
    #[case("TRENDING stories", QueryIntent::Score)]
    #[case("pricing update", QueryIntent::Search)]
    #[case("", QueryIntent::Search)]
    fn classifies_by_whole_word(#[case] query: &str, #[case] expected: QueryIntent) {
        assert_eq!(classify_intent(query), expected);
    }

    #[rstest]
    fn filters_low_salience_entities() {
        let analyser = FixedAnalyser::new([("Reuters", 0.6), ("news", 0.1), ("  ", 0.9)]);
        let analysis = analyse_query(&analyser, "news from Reuters");
        assert_eq!(analysis.intent, QueryIntent::Source);
        assert_eq!(analysis.entities, vec!["Reuters"]);
        assert_eq!(analysis.confidence, ANALYSIS_CONFIDENCE);
    }

    #[rstest]
    fn analyser_failure_keeps_keyword_intent() {
        let analysis = analyse_query(&FailingAnalyser, "top stories");
        assert_eq!(analysis.intent, QueryIntent::Score);
        assert!(analysis.entities.is_empty());
        assert_eq!(analysis.confidence, 0.0);
    }

    #[fixture]
    fn catalog() -> MemoryArticleStore {
        sample_catalog()
    }

    #[rstest]
    fn category_intent_uses_first_entity(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, FixedAnalyser::new([("science", 0.7)]));
        let answer = router.answer("science stories", None).expect("answer");
        assert!(!answer.articles.is_empty());
        assert!(answer.articles.iter().all(|a| a.has_category("science")));
    }

    #[rstest]
    fn category_intent_without_entity_is_empty(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, KeywordOnlyAnalyser);
        let answer = router.answer("science stories", None).expect("answer");
        assert_eq!(answer.analysis.intent, QueryIntent::Category);
        assert_eq!(answer.total_results(), 0);
    }

    #[rstest]
    fn nearby_intent_needs_location(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, KeywordOnlyAnalyser);
        let without = router.answer("news near me", None).expect("answer");
        assert!(without.articles.is_empty());
        let with = router
            .answer("news near me", Some(Coord { x: -122.42, y: 37.77 }))
            .expect("answer");
        assert!(!with.articles.is_empty());
    }

    #[rstest]
    fn score_intent_applies_threshold(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, KeywordOnlyAnalyser).with_limit(50);
        let answer = router.answer("best reads", None).expect("answer");
        assert!(!answer.articles.is_empty());
        assert!(answer
            .articles
            .iter()
            .all(|a| a.relevance_score >= SCORE_QUERY_MIN));
    }

    #[rstest]
    fn search_intent_uses_raw_query(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, KeywordOnlyAnalyser);
        let answer = router.answer("telescope", None).expect("answer");
        assert_eq!(answer.query_used, "telescope");
        assert_eq!(answer.total_results(), 1);
    }

    #[rstest]
    fn rejects_blank_query(catalog: MemoryArticleStore) {
        let router = QueryRouter::new(catalog, KeywordOnlyAnalyser);
        assert!(matches!(
            router.answer("  ", None),
            Err(QueryError::EmptyQuery)
        ));
    }
}
