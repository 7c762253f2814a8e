//! Core domain types for the Newsdesk engine.
//!
//! This crate holds the pieces every other Newsdesk crate agrees on:
//! articles and interaction events, great-circle distance, location
//! clusters, the clock seam, and the store traits that adapters implement.
//! It also carries the extractive summariser and natural-language query
//! routing, which only depend on those traits.
//!
//! Constructors validate their input and return `Result` so downstream
//! components never see an out-of-range coordinate or relevance score.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod article;
mod clock;
mod cluster;
mod distance;
mod interaction;
mod memory;
mod query;
mod score;
mod store;
mod summary;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use article::{Article, ArticleBuilder, ArticleError, ArticleId};
pub use clock::{Clock, SystemClock};
pub use cluster::{LocationCluster, cluster_key};
pub use distance::{
    CoordinateError, EARTH_RADIUS_KM, LATITUDE_RANGE, LONGITUDE_RANGE, distance_km,
    validate_coordinate,
};
pub use interaction::{InteractionEvent, InteractionKind};
pub use memory::{MemoryArticleStore, MemoryInteractionStore, rank_by_distance};
pub use query::{
    ANALYSIS_CONFIDENCE, AnalysisError, DEFAULT_QUERY_LIMIT, ENTITY_SALIENCE_THRESHOLD, Entity,
    INTENT_RULES, KeywordOnlyAnalyser, NEARBY_QUERY_RADIUS_KM, QueryAnalysis, QueryAnswer,
    QueryError, QueryIntent, QueryRouter, SCORE_QUERY_MIN, TextAnalyser, analyse_query,
    classify_intent,
};
pub use score::TrendingScoreEntry;
pub use store::{
    ArticleCatalog, ArticleLookup, InteractionStore, StoreError, StoreSource, search_terms,
};
pub use summary::{
    ExtractiveSummariser, FALLBACK_CHARS, LEADING_SENTENCES, MIN_SENTENCE_CHARS, Summariser,
};
