//! In-memory store implementations.
//!
//! Both stores perform linear scans and are intended for small datasets,
//! tests, and deployments that do not need persistence.

use std::sync::RwLock;

use geo::Coord;

use crate::{
    Article, ArticleCatalog, ArticleId, ArticleLookup, InteractionEvent, InteractionStore,
    StoreError, distance_km, search_terms,
};

/// Interaction log held in a `RwLock<Vec<_>>`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use uuid::Uuid;
/// use newsdesk_core::{InteractionEvent, InteractionKind, InteractionStore, MemoryInteractionStore};
///
/// # fn main() -> Result<(), newsdesk_core::StoreError> {
/// let store = MemoryInteractionStore::default();
/// store.append(InteractionEvent::new(
///     Uuid::from_u128(1),
///     "user_1",
///     InteractionKind::View,
///     None,
///     Utc::now(),
/// ))?;
/// assert_eq!(store.count()?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    events: RwLock<Vec<InteractionEvent>>,
}

impl MemoryInteractionStore {
    /// Create a store pre-populated with `events`.
    pub fn with_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = InteractionEvent>,
    {
        Self {
            events: RwLock::new(events.into_iter().collect()),
        }
    }
}

impl InteractionStore for MemoryInteractionStore {
    fn append(&self, event: InteractionEvent) -> Result<(), StoreError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| StoreError::Poisoned { operation: "append" })?;
        events.push(event);
        Ok(())
    }

    fn append_all(&self, batch: Vec<InteractionEvent>) -> Result<usize, StoreError> {
        let mut events = self.events.write().map_err(|_| StoreError::Poisoned {
            operation: "append batch",
        })?;
        let total = batch.len();
        events.extend(batch);
        Ok(total)
    }

    fn all_events(&self) -> Result<Vec<InteractionEvent>, StoreError> {
        self.events
            .read()
            .map(|events| events.clone())
            .map_err(|_| StoreError::Poisoned {
                operation: "read events",
            })
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.events
            .read()
            .map(|events| events.len())
            .map_err(|_| StoreError::Poisoned {
                operation: "count events",
            })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| StoreError::Poisoned { operation: "clear" })?;
        events.clear();
        Ok(())
    }
}

/// Article collection held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryArticleStore {
    /// Create a store from a collection of articles.
    pub fn with_articles<I>(articles: I) -> Self
    where
        I: IntoIterator<Item = Article>,
    {
        Self {
            articles: RwLock::new(articles.into_iter().collect()),
        }
    }

    /// Insert or replace an article by id.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn upsert(&self, article: Article) -> Result<(), StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|_| StoreError::Poisoned { operation: "upsert" })?;
        if let Some(existing) = articles.iter_mut().find(|a| a.id == article.id) {
            *existing = article;
        } else {
            articles.push(article);
        }
        Ok(())
    }

    /// Remove an article, returning whether it existed.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn remove(&self, id: ArticleId) -> Result<bool, StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|_| StoreError::Poisoned { operation: "remove" })?;
        let before = articles.len();
        articles.retain(|article| article.id != id);
        Ok(articles.len() != before)
    }

    fn select<F>(&self, operation: &'static str, filter: F) -> Result<Vec<Article>, StoreError>
    where
        F: Fn(&Article) -> bool,
    {
        let articles = self
            .articles
            .read()
            .map_err(|_| StoreError::Poisoned { operation })?;
        Ok(articles.iter().filter(|a| filter(a)).cloned().collect())
    }
}

fn newest_first(mut articles: Vec<Article>, limit: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
    articles.truncate(limit);
    articles
}

fn most_relevant_first(mut articles: Vec<Article>, limit: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    articles.truncate(limit);
    articles
}

impl ArticleLookup for MemoryArticleStore {
    fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, StoreError> {
        let articles = self.articles.read().map_err(|_| StoreError::Poisoned {
            operation: "get article",
        })?;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    fn located_articles(&self, limit: usize) -> Result<Vec<Article>, StoreError> {
        let mut located = self.select("located articles", Article::is_located)?;
        located.truncate(limit);
        Ok(located)
    }
}

impl ArticleCatalog for MemoryArticleStore {
    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        let matches = self.select("articles by category", |a| a.has_category(category))?;
        Ok(newest_first(matches, limit))
    }

    fn by_source(&self, source: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        let needle = source.to_lowercase();
        let matches = self.select("articles by source", |a| {
            a.source_name.to_lowercase().contains(&needle)
        })?;
        Ok(newest_first(matches, limit))
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let matches = self.select("search articles", |a| {
            let title = a.title.to_lowercase();
            let description = a.description.to_lowercase();
            terms
                .iter()
                .any(|term| title.contains(term.as_str()) || description.contains(term.as_str()))
        })?;
        Ok(most_relevant_first(matches, limit))
    }

    fn by_min_score(&self, min_score: f32, limit: usize) -> Result<Vec<Article>, StoreError> {
        let matches = self.select("articles by score", |a| a.relevance_score >= min_score)?;
        Ok(most_relevant_first(matches, limit))
    }

    fn nearby(
        &self,
        centre: Coord<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError> {
        let located = self.select("nearby articles", Article::is_located)?;
        Ok(rank_by_distance(located, centre, radius_km, limit))
    }
}

/// Keep located articles within `radius_km` of `centre`, nearest first.
///
/// Shared by every [`ArticleCatalog`] that computes proximity in process.
#[must_use]
pub fn rank_by_distance(
    articles: Vec<Article>,
    centre: Coord<f64>,
    radius_km: f64,
    limit: usize,
) -> Vec<Article> {
    let mut within: Vec<(f64, Article)> = articles
        .into_iter()
        .filter_map(|article| {
            let location = article.location?;
            let km = distance_km(centre, location);
            (km <= radius_km).then_some((km, article))
        })
        .collect();
    within.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    within
        .into_iter()
        .take(limit)
        .map(|(_, article)| article)
        .collect()
}
