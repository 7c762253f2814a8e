//! Output types of a trending computation.

use chrono::{DateTime, Utc};
use newsdesk_core::{Article, ArticleId, LocationCluster, TrendingScoreEntry};

use crate::{ArticleScore, InteractionCounts};

/// A ranked article with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingArticle {
    /// The resolved article.
    pub article: Article,
    /// Weighted, decayed score.
    pub score: f64,
    /// Interactions that contributed to the score.
    pub interactions: InteractionCounts,
}

/// Why a scored article was left out of the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Interactions reference an article the lookup no longer knows.
    NotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("article not found"),
        }
    }
}

/// Per-article result of resolving a score against the article lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// The article was found and ranked.
    Scored(TrendingArticle),
    /// The article was excluded.
    Skipped {
        /// Article that could not be ranked.
        article_id: ArticleId,
        /// Why it was excluded.
        reason: SkipReason,
    },
}

impl ScoreOutcome {
    /// Attach `article` to `score`, or record why it is missing.
    #[must_use]
    pub fn resolve(score: ArticleScore, article: Option<Article>) -> Self {
        match article {
            Some(article) => Self::Scored(TrendingArticle {
                article,
                score: score.score,
                interactions: score.counts,
            }),
            None => Self::Skipped {
                article_id: score.article_id,
                reason: SkipReason::NotFound,
            },
        }
    }
}

/// Ranked trending articles for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingResult {
    /// Articles, best first.
    pub articles: Vec<TrendingArticle>,
    /// Cluster of the query point.
    pub location_cluster: LocationCluster,
    /// Number of entries in `articles`.
    pub total_count: usize,
    /// When the ranking was computed.
    pub computed_at: DateTime<Utc>,
    /// Scored articles excluded while resolving.
    pub skipped: Vec<(ArticleId, SkipReason)>,
}

impl TrendingResult {
    /// Build a result from ranked articles.
    #[must_use]
    pub fn new(
        articles: Vec<TrendingArticle>,
        location_cluster: LocationCluster,
        computed_at: DateTime<Utc>,
        skipped: Vec<(ArticleId, SkipReason)>,
    ) -> Self {
        Self {
            total_count: articles.len(),
            articles,
            location_cluster,
            computed_at,
            skipped,
        }
    }

    /// Report whether no article was ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Scores in ranking order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.articles.iter().map(|entry| entry.score).collect()
    }

    /// Snapshot rows for every ranked article.
    #[must_use]
    pub fn score_entries(&self) -> Vec<TrendingScoreEntry> {
        self.articles
            .iter()
            .map(|entry| TrendingScoreEntry {
                article_id: entry.article.id,
                location_cluster: self.location_cluster.clone(),
                score: entry.score,
                computed_at: self.computed_at,
            })
            .collect()
    }
}
