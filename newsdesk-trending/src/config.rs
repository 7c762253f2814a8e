//! Tunable constants and configuration for trending computation.

use std::time::Duration;

use newsdesk_core::InteractionKind;

/// Weight of a `view` interaction.
pub const VIEW_WEIGHT: f64 = 1.0;
/// Weight of a `click` interaction.
pub const CLICK_WEIGHT: f64 = 2.0;
/// Weight of a `share` interaction.
pub const SHARE_WEIGHT: f64 = 3.0;
/// Weight of a `bookmark` interaction.
pub const BOOKMARK_WEIGHT: f64 = 2.0;
/// Weight of a `comment` interaction.
pub const COMMENT_WEIGHT: f64 = 2.0;

/// Events further than this from the query point are ignored, in kilometres.
pub const RADIUS_KM: f64 = 100.0;

/// Decay constant of the recency multiplier, in seconds.
pub const DECAY_SECONDS: f64 = 86_400.0;

/// How long a cached ranking is served.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Largest result size a query may request.
pub const MAX_LIMIT: usize = 50;

/// Result size used when the caller does not choose one.
pub const DEFAULT_LIMIT: usize = 5;

/// Located articles handed to the seeder when a query finds no events.
pub const SEED_ARTICLE_LIMIT: usize = 50;

/// Per-kind interaction weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingWeights {
    /// Weight of a view.
    pub view: f64,
    /// Weight of a click.
    pub click: f64,
    /// Weight of a share.
    pub share: f64,
    /// Weight of a bookmark.
    pub bookmark: f64,
    /// Weight of a comment.
    pub comment: f64,
}

impl TrendingWeights {
    /// Return the weight applied to `kind`.
    #[must_use]
    pub const fn weight(&self, kind: InteractionKind) -> f64 {
        match kind {
            InteractionKind::View => self.view,
            InteractionKind::Click => self.click,
            InteractionKind::Share => self.share,
            InteractionKind::Bookmark => self.bookmark,
            InteractionKind::Comment => self.comment,
        }
    }
}

impl Default for TrendingWeights {
    fn default() -> Self {
        Self {
            view: VIEW_WEIGHT,
            click: CLICK_WEIGHT,
            share: SHARE_WEIGHT,
            bookmark: BOOKMARK_WEIGHT,
            comment: COMMENT_WEIGHT,
        }
    }
}

/// Configuration for [`TrendingService`](crate::TrendingService).
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingConfig {
    /// Search radius around the query point, in kilometres.
    pub radius_km: f64,
    /// Decay constant of the recency multiplier, in seconds.
    pub decay_seconds: f64,
    /// Per-kind interaction weights.
    pub weights: TrendingWeights,
    /// Lifetime of cached rankings.
    pub cache_ttl: Duration,
    /// Events older than this are ignored; `None` keeps every event.
    pub max_event_age: Option<Duration>,
    /// Seed interactions and retry once when the store holds no events.
    pub seed_on_empty: bool,
    /// Located articles offered to the seeder.
    pub seed_article_limit: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            radius_km: RADIUS_KM,
            decay_seconds: DECAY_SECONDS,
            weights: TrendingWeights::default(),
            cache_ttl: CACHE_TTL,
            max_event_age: None,
            seed_on_empty: true,
            seed_article_limit: SEED_ARTICLE_LIMIT,
        }
    }
}
