//! Facade crate for the Newsdesk retrieval engine.
//!
//! This crate re-exports the core domain types and exposes the trending
//! service and SQLite-backed data layer behind feature flags.

#![forbid(unsafe_code)]

pub use newsdesk_core::{
    Article, ArticleCatalog, ArticleError, ArticleId, ArticleLookup, Clock, ExtractiveSummariser,
    InteractionEvent, InteractionKind, InteractionStore, KeywordOnlyAnalyser, LocationCluster,
    MemoryArticleStore, MemoryInteractionStore, QueryAnswer, QueryError, QueryIntent,
    QueryRouter, StoreError, Summariser, SystemClock, TextAnalyser, TrendingScoreEntry,
    distance_km,
};

#[cfg(feature = "trending")]
pub use newsdesk_trending::{
    InteractionSimulator, TrendingConfig, TrendingError, TrendingQuery, TrendingResult,
    TrendingService,
};

#[cfg(feature = "store-sqlite")]
pub use newsdesk_data::{
    HttpTextAnalyser, LoadReport, SqliteNewsStore, SqliteStoreError, enrich_summaries,
    load_articles_from_path,
};
