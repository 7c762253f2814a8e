//! Storage seams consumed by the query and trending operations.
//!
//! Three traits describe what the engine needs from a backing store:
//! - [`InteractionStore`]: an append-only event log.
//! - [`ArticleLookup`]: point lookups used to attach articles to scores.
//! - [`ArticleCatalog`]: the filtered listings served to readers.
//!
//! Methods take `&self` so one store handle can be shared between request
//! handlers; implementations guard their own state.

use std::sync::Arc;

use geo::Coord;
use thiserror::Error;

use crate::{Article, ArticleId, InteractionEvent};

/// Boxed source error from a backing store driver.
pub type StoreSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to reach or read a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not service the request.
    #[error("store unavailable during {operation}")]
    Unavailable {
        /// Description of the failed operation.
        operation: &'static str,
        /// Driver error.
        #[source]
        source: StoreSource,
    },
    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned during {operation}")]
    Poisoned {
        /// Description of the failed operation.
        operation: &'static str,
    },
}

impl StoreError {
    /// Wrap a driver error for `operation`.
    pub fn unavailable<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            operation,
            source: Box::new(source),
        }
    }
}

/// Append-only log of interaction events.
///
/// `append` must be durable before it returns and `count` must be accurate
/// as of the call.
pub trait InteractionStore: Send + Sync {
    /// Record one event.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the event cannot be persisted.
    fn append(&self, event: InteractionEvent) -> Result<(), StoreError>;

    /// Record a batch of events, returning how many were stored.
    ///
    /// # Errors
    /// Returns [`StoreError`] on the first event that cannot be persisted.
    fn append_all(&self, events: Vec<InteractionEvent>) -> Result<usize, StoreError> {
        let total = events.len();
        for event in events {
            self.append(event)?;
        }
        Ok(total)
    }

    /// Return every stored event in insertion order.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the log cannot be read.
    fn all_events(&self) -> Result<Vec<InteractionEvent>, StoreError>;

    /// Return the number of stored events.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the log cannot be read.
    fn count(&self) -> Result<usize, StoreError>;

    /// Remove every event.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the log cannot be cleared.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Point lookups over the article collection.
pub trait ArticleLookup: Send + Sync {
    /// Fetch an article by id; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, StoreError>;

    /// Return up to `limit` articles that carry a location.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn located_articles(&self, limit: usize) -> Result<Vec<Article>, StoreError>;
}

/// Filtered article listings.
///
/// Every method returns at most `limit` articles.
pub trait ArticleCatalog: Send + Sync {
    /// Articles tagged with `category` (case-insensitive), newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, StoreError>;

    /// Articles whose source name contains `source` (case-insensitive),
    /// newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn by_source(&self, source: &str, limit: usize) -> Result<Vec<Article>, StoreError>;

    /// Articles whose title or description contains any term of `query`,
    /// highest relevance first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, StoreError>;

    /// Articles with relevance at least `min_score`, highest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn by_min_score(&self, min_score: f32, limit: usize) -> Result<Vec<Article>, StoreError>;

    /// Located articles within `radius_km` of `centre`, nearest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    fn nearby(
        &self,
        centre: Coord<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError>;
}

/// Split a free-text query into lowercase search terms.
///
/// # Examples
/// ```
/// use newsdesk_core::search_terms;
///
/// assert_eq!(search_terms("  Solar  POWER "), vec!["solar", "power"]);
/// ```
#[must_use]
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

impl<T: InteractionStore + ?Sized> InteractionStore for Arc<T> {
    fn append(&self, event: InteractionEvent) -> Result<(), StoreError> {
        (**self).append(event)
    }

    fn append_all(&self, events: Vec<InteractionEvent>) -> Result<usize, StoreError> {
        (**self).append_all(events)
    }

    fn all_events(&self) -> Result<Vec<InteractionEvent>, StoreError> {
        (**self).all_events()
    }

    fn count(&self) -> Result<usize, StoreError> {
        (**self).count()
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

impl<T: ArticleLookup + ?Sized> ArticleLookup for Arc<T> {
    fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, StoreError> {
        (**self).get_by_id(id)
    }

    fn located_articles(&self, limit: usize) -> Result<Vec<Article>, StoreError> {
        (**self).located_articles(limit)
    }
}

impl<T: ArticleCatalog + ?Sized> ArticleCatalog for Arc<T> {
    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        (**self).by_category(category, limit)
    }

    fn by_source(&self, source: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        (**self).by_source(source, limit)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        (**self).search(query, limit)
    }

    fn by_min_score(&self, min_score: f32, limit: usize) -> Result<Vec<Article>, StoreError> {
        (**self).by_min_score(min_score, limit)
    }

    fn nearby(
        &self,
        centre: Coord<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError> {
        (**self).nearby(centre, radius_km, limit)
    }
}
