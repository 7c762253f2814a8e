//! Location-aware trending rankings for Newsdesk articles.
//!
//! The crate turns a log of reader interactions into a ranked list of
//! articles for a query point:
//! - [`TrendingScorer`] keeps events within a radius of the point, tallies
//!   them per article, and multiplies the weighted tally by an exponential
//!   recency decay.
//! - [`TrendingCache`] holds results per location cluster and limit for a
//!   fixed TTL.
//! - [`InteractionSimulator`] produces seeded synthetic traffic when a store
//!   has none.
//! - [`TrendingService`] composes the three over the
//!   [`InteractionStore`](newsdesk_core::InteractionStore) and
//!   [`ArticleLookup`](newsdesk_core::ArticleLookup) seams.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use newsdesk_core::{Article, MemoryArticleStore, MemoryInteractionStore, SystemClock};
//! use newsdesk_trending::{
//!     InteractionSimulator, SimulationConfig, TrendingConfig, TrendingQuery, TrendingService,
//! };
//! use uuid::Uuid;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let article = Article::builder(Uuid::from_u128(1), "Cable car line extended")
//!     .coordinates(Some(37.77), Some(-122.42))
//!     .build()?;
//! let service = TrendingService::new(
//!     MemoryInteractionStore::default(),
//!     MemoryArticleStore::with_articles([article]),
//!     SystemClock,
//!     TrendingConfig::default(),
//! )
//! .with_seeder(InteractionSimulator::seeded(42, SimulationConfig::default())?);
//!
//! let trending = service.get_trending(&TrendingQuery::new(37.77, -122.42, 5)?)?;
//! assert_eq!(trending.total_count, 1);
//! assert!(trending.articles[0].score > 0.0);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod config;
mod error;
mod query;
mod result;
mod scorer;
mod service;
mod simulator;

pub use cache::{CacheKey, TrendingCache};
pub use config::{
    BOOKMARK_WEIGHT, CACHE_TTL, CLICK_WEIGHT, COMMENT_WEIGHT, DECAY_SECONDS, DEFAULT_LIMIT,
    MAX_LIMIT, RADIUS_KM, SEED_ARTICLE_LIMIT, SHARE_WEIGHT, TrendingConfig, TrendingWeights,
    VIEW_WEIGHT,
};
pub use error::{SimulationError, TrendingError, TrendingQueryError};
pub use query::TrendingQuery;
pub use result::{ScoreOutcome, SkipReason, TrendingArticle, TrendingResult};
pub use scorer::{ArticleScore, InteractionCounts, TrendingScorer};
pub use service::TrendingService;
pub use simulator::{InteractionSeeder, InteractionSimulator, NoSeeding, SimulationConfig};
