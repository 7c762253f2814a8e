//! Synthetic interaction generation for stores without real traffic.
//!
//! [`InteractionSeeder`] is the seam the service calls when a query finds no
//! events. Production deployments fed by real telemetry use [`NoSeeding`];
//! demos and tests use [`InteractionSimulator`] with a seeded random source.

use chrono::{DateTime, Duration, Utc};
use geo::Coord;
use log::info;
use newsdesk_core::{
    Article, ArticleId, InteractionEvent, InteractionKind, LATITUDE_RANGE, LONGITUDE_RANGE,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::SimulationError;

/// Produces interaction events for a set of located articles.
pub trait InteractionSeeder: Send {
    /// Generate events around `articles`, timestamped no later than `now`.
    fn seed(&mut self, articles: &[Article], now: DateTime<Utc>) -> Vec<InteractionEvent>;
}

/// Seeder that never generates anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSeeding;

impl InteractionSeeder for NoSeeding {
    fn seed(&mut self, _articles: &[Article], _now: DateTime<Utc>) -> Vec<InteractionEvent> {
        Vec::new()
    }
}

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of events generated per run.
    pub events: usize,
    /// Actors are drawn from `user_1..=user_{actor_pool}`.
    pub actor_pool: u32,
    /// Maximum actor offset from the article, in degrees per axis.
    pub jitter_degrees: f64,
    /// Oldest generated timestamp, relative to `now`.
    pub max_age: std::time::Duration,
    /// Relative draw weights for view, click, share, bookmark and comment.
    pub kind_weights: [f64; 5],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            events: 1_000,
            actor_pool: 100,
            jitter_degrees: 0.5,
            max_age: std::time::Duration::from_secs(72 * 3_600),
            kind_weights: [0.4, 0.3, 0.15, 0.1, 0.05],
        }
    }
}

/// Random interaction generator.
///
/// Each event picks a located article uniformly, a kind by weighted draw,
/// an actor near the article (clamped to valid coordinates) and a timestamp
/// uniformly within the configured age window.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use geo::Coord;
/// use uuid::Uuid;
/// use newsdesk_core::Article;
/// use newsdesk_trending::{InteractionSeeder, InteractionSimulator, SimulationConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let article = Article::builder(Uuid::from_u128(1), "Harbour reopens")
///     .coordinates(Some(37.77), Some(-122.42))
///     .build()?;
/// let mut simulator = InteractionSimulator::seeded(7, SimulationConfig::default())?;
/// let events = simulator.seed(&[article], Utc::now());
/// assert_eq!(events.len(), 1_000);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InteractionSimulator<R = ChaCha8Rng> {
    rng: R,
    config: SimulationConfig,
    kinds: WeightedIndex<f64>,
}

impl InteractionSimulator<ChaCha8Rng> {
    /// Simulator driven by `ChaCha8Rng` seeded with `seed`.
    ///
    /// # Errors
    /// See [`InteractionSimulator::new`].
    pub fn seeded(seed: u64, config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::new(ChaCha8Rng::seed_from_u64(seed), config)
    }
}

impl<R: Rng> InteractionSimulator<R> {
    /// Simulator drawing from `rng`.
    ///
    /// # Errors
    /// Returns [`SimulationError`] when the kind weights cannot form a
    /// distribution, the jitter is negative or non-finite, or the actor pool
    /// is empty.
    pub fn new(rng: R, config: SimulationConfig) -> Result<Self, SimulationError> {
        let kinds =
            WeightedIndex::new(config.kind_weights).map_err(SimulationError::KindWeights)?;
        if !config.jitter_degrees.is_finite() || config.jitter_degrees < 0.0 {
            return Err(SimulationError::Jitter(config.jitter_degrees));
        }
        if config.actor_pool == 0 {
            return Err(SimulationError::EmptyActorPool);
        }
        Ok(Self { rng, config, kinds })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn kind(&mut self) -> InteractionKind {
        kind_at(self.kinds.sample(&mut self.rng))
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "actor placement offsets the article coordinate"
    )]
    fn actor_location(&mut self, article: Coord<f64>) -> Coord<f64> {
        let jitter = self.config.jitter_degrees;
        let lat = article.y + self.rng.gen_range(-jitter..=jitter);
        let lon = article.x + self.rng.gen_range(-jitter..=jitter);
        Coord {
            x: lon.clamp(*LONGITUDE_RANGE.start(), *LONGITUDE_RANGE.end()),
            y: lat.clamp(*LATITUDE_RANGE.start(), *LATITUDE_RANGE.end()),
        }
    }

    fn timestamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let window = i64::try_from(self.config.max_age.as_secs()).unwrap_or(i64::MAX);
        let age =
            Duration::try_seconds(self.rng.gen_range(0..=window)).unwrap_or_else(Duration::zero);
        now.checked_sub_signed(age).unwrap_or(now)
    }
}

/// Kind for a draw from the five `kind_weights`, in their documented order.
const fn kind_at(index: usize) -> InteractionKind {
    match index {
        0 => InteractionKind::View,
        1 => InteractionKind::Click,
        2 => InteractionKind::Share,
        3 => InteractionKind::Bookmark,
        _ => InteractionKind::Comment,
    }
}

impl<R: Rng + Send> InteractionSeeder for InteractionSimulator<R> {
    fn seed(&mut self, articles: &[Article], now: DateTime<Utc>) -> Vec<InteractionEvent> {
        let targets: Vec<(ArticleId, Coord<f64>)> = articles
            .iter()
            .filter_map(|article| article.location.map(|location| (article.id, location)))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(self.config.events);
        for _ in 0..self.config.events {
            let Some(&(article_id, location)) = targets.choose(&mut self.rng) else {
                break;
            };
            let kind = self.kind();
            let actor = format!("user_{}", self.rng.gen_range(1..=self.config.actor_pool));
            let actor_location = self.actor_location(location);
            let timestamp = self.timestamp(now);
            events.push(InteractionEvent::new(
                article_id,
                actor,
                kind,
                Some(actor_location),
                timestamp,
            ));
        }
        info!(
            "simulated {} interactions across {} articles",
            events.len(),
            targets.len()
        );
        events
    }
}
