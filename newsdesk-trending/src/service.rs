//! Cached trending rankings over an interaction store.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use newsdesk_core::{ArticleLookup, Clock, InteractionStore, LocationCluster};

use crate::{
    ArticleScore, CacheKey, InteractionSeeder, NoSeeding, ScoreOutcome, TrendingCache,
    TrendingConfig, TrendingError, TrendingQuery, TrendingResult, TrendingScorer,
};

/// Serves trending rankings per location cluster.
///
/// A request is answered from the cache when a fresh entry exists for its
/// cluster and limit. Otherwise every stored event is scored; when nothing
/// falls in the radius and the store holds no events at all, the seeder is
/// asked for events once and scoring is retried. A store with any events is
/// never seeded. Ranked ids are resolved through the article lookup before the
/// result is truncated, so a missing article never shortens the ranking
/// while other candidates remain. Store failures propagate and are never
/// cached.
///
/// # Examples
/// ```
/// use newsdesk_core::{MemoryArticleStore, MemoryInteractionStore, SystemClock};
/// use newsdesk_trending::{TrendingConfig, TrendingQuery, TrendingService};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TrendingService::new(
///     MemoryInteractionStore::default(),
///     MemoryArticleStore::default(),
///     SystemClock,
///     TrendingConfig::default(),
/// );
/// let result = service.get_trending(&TrendingQuery::new(37.77, -122.42, 5)?)?;
/// assert_eq!(result.total_count, 0);
/// assert_eq!(result.location_cluster.as_str(), "37.8_-122.4");
/// # Ok(())
/// # }
/// ```
pub struct TrendingService<I, A, C> {
    interactions: I,
    articles: A,
    clock: C,
    scorer: TrendingScorer,
    cache: TrendingCache,
    seeder: Mutex<Box<dyn InteractionSeeder>>,
    config: TrendingConfig,
}

impl<I, A, C> fmt::Debug for TrendingService<I, A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrendingService")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<I, A, C> TrendingService<I, A, C>
where
    I: InteractionStore,
    A: ArticleLookup,
    C: Clock,
{
    /// Create a service that never seeds interactions.
    pub fn new(interactions: I, articles: A, clock: C, config: TrendingConfig) -> Self {
        Self {
            interactions,
            articles,
            clock,
            scorer: TrendingScorer::new(&config),
            cache: TrendingCache::new(config.cache_ttl),
            seeder: Mutex::new(Box::new(NoSeeding)),
            config,
        }
    }

    /// Replace the seeder used when a query finds no events.
    #[must_use]
    pub fn with_seeder<S>(self, seeder: S) -> Self
    where
        S: InteractionSeeder + 'static,
    {
        Self {
            seeder: Mutex::new(Box::new(seeder)),
            ..self
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &TrendingConfig {
        &self.config
    }

    /// The ranking cache.
    #[must_use]
    pub const fn cache(&self) -> &TrendingCache {
        &self.cache
    }

    /// The interaction store.
    #[must_use]
    pub const fn interactions(&self) -> &I {
        &self.interactions
    }

    /// Drop every cached ranking.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
        info!("trending cache invalidated");
    }

    /// Return the trending articles around the query point.
    ///
    /// # Errors
    /// Returns [`TrendingError::Interactions`] when the interaction store
    /// cannot be read or seeded and [`TrendingError::Articles`] when the
    /// article lookup fails.
    pub fn get_trending(&self, query: &TrendingQuery) -> Result<TrendingResult, TrendingError> {
        let now = self.clock.now();
        let cluster = query.cluster();
        let key = CacheKey::new(cluster.clone(), query.limit());
        if let Some(hit) = self.cache.get(&key, now) {
            debug!("cache hit for {key}");
            return Ok(hit);
        }
        debug!("cache miss for {key}");

        let mut scores = self.score(query, now)?;
        if scores.is_empty()
            && self.config.seed_on_empty
            && self.store_is_empty()?
            && self.seed(now)? > 0
        {
            scores = self.score(query, now)?;
        }
        let result = self.resolve(scores, query.limit(), cluster, now)?;
        info!(
            "ranked {} trending articles for {key}",
            result.total_count
        );
        self.cache.put(key, result.clone(), now);
        Ok(result)
    }

    fn score(
        &self,
        query: &TrendingQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArticleScore>, TrendingError> {
        let events = self
            .interactions
            .all_events()
            .map_err(|source| TrendingError::Interactions { source })?;
        Ok(self.scorer.score(&events, query.location(), now))
    }

    fn store_is_empty(&self) -> Result<bool, TrendingError> {
        self.interactions
            .count()
            .map(|count| count == 0)
            .map_err(|source| TrendingError::Interactions { source })
    }

    fn seed(&self, now: DateTime<Utc>) -> Result<usize, TrendingError> {
        let articles = self
            .articles
            .located_articles(self.config.seed_article_limit)
            .map_err(|source| TrendingError::Articles { source })?;
        let events = self
            .seeder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seed(&articles, now);
        if events.is_empty() {
            return Ok(0);
        }
        let stored = self
            .interactions
            .append_all(events)
            .map_err(|source| TrendingError::Interactions { source })?;
        info!("seeded {stored} interactions");
        Ok(stored)
    }

    fn resolve(
        &self,
        scores: Vec<ArticleScore>,
        limit: usize,
        cluster: LocationCluster,
        now: DateTime<Utc>,
    ) -> Result<TrendingResult, TrendingError> {
        let mut ranked = Vec::with_capacity(limit);
        let mut skipped = Vec::new();
        for score in scores {
            if ranked.len() == limit {
                break;
            }
            let article = self
                .articles
                .get_by_id(score.article_id)
                .map_err(|source| TrendingError::Articles { source })?;
            match ScoreOutcome::resolve(score, article) {
                ScoreOutcome::Scored(entry) => ranked.push(entry),
                ScoreOutcome::Skipped { article_id, reason } => {
                    warn!("skipping article {article_id}: {reason}");
                    skipped.push((article_id, reason));
                }
            }
        }
        Ok(TrendingResult::new(ranked, cluster, now, skipped))
    }
}
