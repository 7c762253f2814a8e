//! Weighted, time-decayed interaction scoring.
//!
//! An article's score is the weighted count of interactions recorded within
//! the search radius, multiplied by `exp(-age / decay)` where `age` is the
//! time since its most recent interaction. Ties are ordered by ascending
//! article id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use geo::Coord;
use newsdesk_core::{ArticleId, InteractionEvent, InteractionKind, distance_km};

use crate::{TrendingConfig, TrendingWeights};

/// Interaction tallies for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionCounts {
    /// Number of views.
    pub views: u32,
    /// Number of clicks.
    pub clicks: u32,
    /// Number of shares.
    pub shares: u32,
    /// Number of bookmarks.
    pub bookmarks: u32,
    /// Number of comments.
    pub comments: u32,
}

impl InteractionCounts {
    /// Count one interaction of `kind`.
    pub const fn record(&mut self, kind: InteractionKind) {
        let slot = match kind {
            InteractionKind::View => &mut self.views,
            InteractionKind::Click => &mut self.clicks,
            InteractionKind::Share => &mut self.shares,
            InteractionKind::Bookmark => &mut self.bookmarks,
            InteractionKind::Comment => &mut self.comments,
        };
        *slot = slot.saturating_add(1);
    }

    /// Return the tally for `kind`.
    #[must_use]
    pub const fn get(&self, kind: InteractionKind) -> u32 {
        match kind {
            InteractionKind::View => self.views,
            InteractionKind::Click => self.clicks,
            InteractionKind::Share => self.shares,
            InteractionKind::Bookmark => self.bookmarks,
            InteractionKind::Comment => self.comments,
        }
    }

    /// Total number of interactions.
    #[must_use]
    pub fn total(&self) -> u32 {
        InteractionKind::ALL
            .iter()
            .fold(0_u32, |acc, kind| acc.saturating_add(self.get(*kind)))
    }

    /// Weighted sum of the tallies.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "base score is a weighted sum of counts"
    )]
    pub fn weighted_sum(&self, weights: &TrendingWeights) -> f64 {
        InteractionKind::ALL
            .iter()
            .map(|kind| f64::from(self.get(*kind)) * weights.weight(*kind))
            .sum()
    }
}

/// Score computed for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleScore {
    /// Scored article.
    pub article_id: ArticleId,
    /// Weighted, decayed score.
    pub score: f64,
    /// Interactions that contributed.
    pub counts: InteractionCounts,
    /// Most recent contributing interaction.
    pub last_interaction: DateTime<Utc>,
}

/// Ranks articles from interaction events around a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingScorer {
    radius_km: f64,
    decay_seconds: f64,
    weights: TrendingWeights,
    max_event_age: Option<std::time::Duration>,
}

impl Default for TrendingScorer {
    fn default() -> Self {
        Self::new(&TrendingConfig::default())
    }
}

impl TrendingScorer {
    /// Build a scorer from the scoring fields of `config`.
    #[must_use]
    pub const fn new(config: &TrendingConfig) -> Self {
        Self {
            radius_km: config.radius_km,
            decay_seconds: config.decay_seconds,
            weights: config.weights,
            max_event_age: config.max_event_age,
        }
    }

    /// Score every article with at least one qualifying event, best first.
    ///
    /// An event qualifies when it carries a location within the radius of
    /// `centre` and, if a maximum age is configured, is not older than it.
    /// Article locations play no part.
    pub fn score<'a, I>(
        &self,
        events: I,
        centre: Coord<f64>,
        now: DateTime<Utc>,
    ) -> Vec<ArticleScore>
    where
        I: IntoIterator<Item = &'a InteractionEvent>,
    {
        let mut grouped: HashMap<ArticleId, (InteractionCounts, DateTime<Utc>)> = HashMap::new();
        for event in events {
            if !self.qualifies(event, centre, now) {
                continue;
            }
            let (counts, last) = grouped
                .entry(event.article_id)
                .or_insert((InteractionCounts::default(), event.timestamp));
            counts.record(event.kind);
            if event.timestamp > *last {
                *last = event.timestamp;
            }
        }

        let mut scores: Vec<ArticleScore> = grouped
            .into_iter()
            .map(|(article_id, (counts, last_interaction))| ArticleScore {
                article_id,
                score: self.combine(&counts, last_interaction, now),
                counts,
                last_interaction,
            })
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.article_id.cmp(&b.article_id))
        });
        scores
    }

    /// Recency multiplier `exp(-age / decay)`; future timestamps count as
    /// age zero.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "exponential decay over a millisecond age"
    )]
    pub fn recency_multiplier(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_seconds = ((now - last).num_milliseconds() as f64 / 1000.0).max(0.0);
        (-age_seconds / self.decay_seconds).exp()
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "final score is base score times recency"
    )]
    fn combine(
        &self,
        counts: &InteractionCounts,
        last: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        counts.weighted_sum(&self.weights) * self.recency_multiplier(last, now)
    }

    fn qualifies(
        &self,
        event: &InteractionEvent,
        centre: Coord<f64>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(location) = event.location else {
            return false;
        };
        if distance_km(centre, location) > self.radius_km {
            return false;
        }
        match self.max_event_age {
            Some(max_age) => (now - event.timestamp)
                .to_std()
                .map_or(true, |age| age <= max_age),
            None => true,
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare floating-point scores"
)]
mod tests {
    use super::*;
    use chrono::Duration;
    use newsdesk_core::test_support::reference_time;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    const SF: Coord<f64> = Coord { x: -122.42, y: 37.77 };

    fn event(article: u128, kind: InteractionKind, seconds_ago: i64) -> InteractionEvent {
        InteractionEvent::new(
            Uuid::from_u128(article),
            "user_1",
            kind,
            Some(SF),
            reference_time() - Duration::seconds(seconds_ago),
        )
    }

    #[fixture]
    fn scorer() -> TrendingScorer {
        TrendingScorer::default()
    }

    #[rstest]
    fn combines_weights_and_decay(scorer: TrendingScorer) {
        let events = [
            event(1, InteractionKind::View, 3_600),
            event(1, InteractionKind::View, 7_200),
            event(1, InteractionKind::Share, 3_600),
        ];
        let scores = scorer.score(&events, SF, reference_time());
        assert_eq!(scores.len(), 1);
        let expected = 5.0 * (-3_600.0_f64 / 86_400.0).exp();
        assert!((scores[0].score - expected).abs() < 1e-9);
        assert_eq!(scores[0].counts.views, 2);
        assert_eq!(scores[0].counts.shares, 1);
        assert_eq!(
            scores[0].last_interaction,
            reference_time() - Duration::seconds(3_600)
        );
    }

    #[rstest]
    fn excludes_distant_and_unlocated_events(scorer: TrendingScorer) {
        let mut far = event(1, InteractionKind::Share, 0);
        far.location = Some(Coord { x: -0.12, y: 51.5 });
        let mut nowhere = event(2, InteractionKind::Share, 0);
        nowhere.location = None;
        let near = event(3, InteractionKind::View, 0);
        let scores = scorer.score(&[far, nowhere, near], SF, reference_time());
        let ids: Vec<u128> = scores.iter().map(|s| s.article_id.as_u128()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[rstest]
    fn future_events_do_not_inflate(scorer: TrendingScorer) {
        let scores = scorer.score(&[event(1, InteractionKind::View, -600)], SF, reference_time());
        assert!((scores[0].score - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn ties_are_ordered_by_article_id(scorer: TrendingScorer) {
        let events = [
            event(9, InteractionKind::Click, 60),
            event(4, InteractionKind::Click, 60),
            event(6, InteractionKind::Share, 60),
        ];
        let scores = scorer.score(&events, SF, reference_time());
        let ids: Vec<u128> = scores.iter().map(|s| s.article_id.as_u128()).collect();
        assert_eq!(ids, vec![6, 4, 9]);
    }

    #[rstest]
    fn empty_input_scores_nothing(scorer: TrendingScorer) {
        assert!(scorer.score(&[], SF, reference_time()).is_empty());
    }

    #[rstest]
    fn max_event_age_drops_old_events() {
        let scorer = TrendingScorer::new(&TrendingConfig {
            max_event_age: Some(std::time::Duration::from_secs(3_600)),
            ..TrendingConfig::default()
        });
        let events = [
            event(1, InteractionKind::View, 60),
            event(2, InteractionKind::Share, 7_200),
        ];
        let scores = scorer.score(&events, SF, reference_time());
        let ids: Vec<u128> = scores.iter().map(|s| s.article_id.as_u128()).collect();
        assert_eq!(ids, vec![1]);
    }

    #[rstest]
    fn counts_total_every_kind() {
        let mut counts = InteractionCounts::default();
        for kind in InteractionKind::ALL {
            counts.record(kind);
        }
        assert_eq!(counts.total(), 5);
        assert!((counts.weighted_sum(&TrendingWeights::default()) - 10.0).abs() < 1e-12);
    }

    fn kind_strategy() -> impl Strategy<Value = InteractionKind> {
        prop::sample::select(InteractionKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn adding_a_share_strictly_increases_score(
            kinds in prop::collection::vec((kind_strategy(), 0_i64..259_200), 1..20),
            share_age in 0_i64..259_200,
        ) {
            let scorer = TrendingScorer::default();
            let mut events: Vec<InteractionEvent> = kinds
                .iter()
                .map(|(kind, age)| event(1, *kind, *age))
                .collect();
            let before = scorer.score(&events, SF, reference_time())[0].score;
            events.push(event(1, InteractionKind::Share, share_age));
            let after = scorer.score(&events, SF, reference_time())[0].score;
            prop_assert!(after > before);
        }

        #[test]
        fn more_recent_activity_scores_at_least_as_high(
            kinds in prop::collection::vec(kind_strategy(), 1..20),
            recent in 0_i64..86_400,
            extra in 0_i64..86_400,
        ) {
            let scorer = TrendingScorer::default();
            let fresh: Vec<InteractionEvent> =
                kinds.iter().map(|kind| event(1, *kind, recent)).collect();
            let stale: Vec<InteractionEvent> =
                kinds.iter().map(|kind| event(1, *kind, recent + extra)).collect();
            let fresh_score = scorer.score(&fresh, SF, reference_time())[0].score;
            let stale_score = scorer.score(&stale, SF, reference_time())[0].score;
            prop_assert!(fresh_score >= stale_score);
        }
    }
}
