//! Persistable snapshots of computed trending scores.

use chrono::{DateTime, Utc};

use crate::{ArticleId, LocationCluster};

/// One article's trending score within a cluster at a point in time.
///
/// Snapshots are derived data kept for inspection; the ranking is always
/// recomputed from interaction events.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingScoreEntry {
    /// Scored article.
    pub article_id: ArticleId,
    /// Cluster of the query that produced the score.
    pub location_cluster: LocationCluster,
    /// Decayed, weighted interaction score.
    pub score: f64,
    /// When the score was computed.
    pub computed_at: DateTime<Utc>,
}
