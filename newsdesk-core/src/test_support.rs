//! Test-only helpers shared by unit, behaviour and downstream crate tests.
//!
//! Gated behind the `test-support` feature (and `cfg(test)`).

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, TimeZone, Utc};
use geo::Coord;
use uuid::Uuid;

use crate::{
    AnalysisError, Article, ArticleId, ArticleLookup, Clock, Entity, InteractionEvent,
    InteractionStore, MemoryArticleStore, StoreError, TextAnalyser,
};

/// Clock whose time only moves when told to.
///
/// # Examples
/// ```rust
/// use chrono::Duration;
/// use newsdesk_core::Clock;
/// use newsdesk_core::test_support::{ManualClock, reference_time};
///
/// let clock = ManualClock::new(reference_time());
/// clock.advance(Duration::seconds(301));
/// assert_eq!(clock.now() - reference_time(), Duration::seconds(301));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed instant used as "now" across fixtures: 2025-06-01T12:00:00Z.
#[must_use]
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Construct a located article with one category.
#[must_use]
pub fn article(
    id: u128,
    title: &str,
    category: &str,
    relevance_score: f32,
    location: Option<Coord<f64>>,
) -> Article {
    Article {
        id: Uuid::from_u128(id),
        title: title.to_owned(),
        description: format!("{title}. Full coverage follows."),
        url: format!("https://news.example/{id}"),
        publication_date: reference_time() - Duration::days(i64::try_from(id).unwrap_or(0)),
        source_name: String::from("Example Wire"),
        categories: vec![category.to_owned()],
        relevance_score,
        location,
        summary: None,
    }
}

/// Five articles: three around San Francisco, one in London, one unlocated.
#[must_use]
pub fn sample_articles() -> Vec<Article> {
    vec![
        Article {
            source_name: String::from("Science Daily"),
            ..article(
                1,
                "Telescope captures distant galaxy",
                "science",
                0.9,
                Some(Coord { x: -122.42, y: 37.77 }),
            )
        },
        Article {
            source_name: String::from("TechCrunch"),
            categories: vec![String::from("business"), String::from("technology")],
            ..article(
                2,
                "Startup raises funding round",
                "business",
                0.75,
                Some(Coord { x: -122.41, y: 37.78 }),
            )
        },
        Article {
            source_name: String::from("Chronicle"),
            ..article(
                3,
                "Local team wins championship",
                "sports",
                0.5,
                Some(Coord { x: -122.27, y: 37.80 }),
            )
        },
        Article {
            source_name: String::from("BBC News"),
            ..article(
                4,
                "Parliament debates budget",
                "politics",
                0.6,
                Some(Coord { x: -0.12, y: 51.50 }),
            )
        },
        Article {
            source_name: String::from("Reuters"),
            ..article(5, "Research on coral reefs", "science", 0.4, None)
        },
    ]
}

/// A [`MemoryArticleStore`] holding [`sample_articles`].
#[must_use]
pub fn sample_catalog() -> MemoryArticleStore {
    MemoryArticleStore::with_articles(sample_articles())
}

/// Analyser returning a fixed entity list for every query.
#[derive(Debug, Clone, Default)]
pub struct FixedAnalyser {
    entities: Vec<Entity>,
}

impl FixedAnalyser {
    /// Create an analyser from `(name, salience)` pairs.
    pub fn new<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        Self {
            entities: entities
                .into_iter()
                .map(|(name, salience)| Entity {
                    name: name.to_owned(),
                    salience,
                })
                .collect(),
        }
    }
}

impl TextAnalyser for FixedAnalyser {
    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, AnalysisError> {
        Ok(self.entities.clone())
    }
}

/// Analyser that always fails with a 503 status.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAnalyser;

impl TextAnalyser for FailingAnalyser {
    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, AnalysisError> {
        Err(AnalysisError::Status { status: 503 })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("backing store offline")]
struct Offline;

/// Store whose every operation reports [`StoreError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl InteractionStore for UnavailableStore {
    fn append(&self, _event: InteractionEvent) -> Result<(), StoreError> {
        Err(StoreError::unavailable("append", Offline))
    }

    fn all_events(&self) -> Result<Vec<InteractionEvent>, StoreError> {
        Err(StoreError::unavailable("read events", Offline))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::unavailable("count events", Offline))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(StoreError::unavailable("clear", Offline))
    }
}

impl ArticleLookup for UnavailableStore {
    fn get_by_id(&self, _id: ArticleId) -> Result<Option<Article>, StoreError> {
        Err(StoreError::unavailable("get article", Offline))
    }

    fn located_articles(&self, _limit: usize) -> Result<Vec<Article>, StoreError> {
        Err(StoreError::unavailable("located articles", Offline))
    }
}
