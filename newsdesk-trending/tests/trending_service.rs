//! Service-level coverage for cached trending rankings.

use std::sync::Arc;

use chrono::Duration;
use geo::Coord;
use newsdesk_core::test_support::{
    ManualClock, UnavailableStore, reference_time, sample_catalog,
};
use newsdesk_core::{
    InteractionEvent, InteractionKind, InteractionStore, MemoryArticleStore,
    MemoryInteractionStore,
};
use newsdesk_trending::{
    InteractionSimulator, SimulationConfig, SkipReason, TrendingConfig, TrendingError,
    TrendingQuery, TrendingService,
};
use rstest::{fixture, rstest};
use uuid::Uuid;

const SF: Coord<f64> = Coord { x: -122.42, y: 37.77 };

type Service =
    TrendingService<Arc<MemoryInteractionStore>, MemoryArticleStore, Arc<ManualClock>>;

struct Harness {
    interactions: Arc<MemoryInteractionStore>,
    clock: Arc<ManualClock>,
    service: Service,
}

#[fixture]
fn harness() -> Harness {
    let interactions = Arc::new(MemoryInteractionStore::default());
    let clock = Arc::new(ManualClock::new(reference_time()));
    let service = TrendingService::new(
        Arc::clone(&interactions),
        sample_catalog(),
        Arc::clone(&clock),
        TrendingConfig::default(),
    );
    Harness {
        interactions,
        clock,
        service,
    }
}

fn event(article: u128, kind: InteractionKind, seconds_ago: i64) -> InteractionEvent {
    InteractionEvent::new(
        Uuid::from_u128(article),
        "user_7",
        kind,
        Some(SF),
        reference_time() - Duration::seconds(seconds_ago),
    )
}

fn query(limit: usize) -> TrendingQuery {
    TrendingQuery::new(37.77, -122.42, limit).expect("valid query")
}

#[rstest]
fn empty_store_is_seeded_and_ranked() {
    let interactions = Arc::new(MemoryInteractionStore::default());
    let service = TrendingService::new(
        Arc::clone(&interactions),
        sample_catalog(),
        ManualClock::new(reference_time()),
        TrendingConfig::default(),
    )
    .with_seeder(InteractionSimulator::seeded(42, SimulationConfig::default()).expect("config"));

    let result = service.get_trending(&query(5)).expect("trending");

    assert_eq!(interactions.count().expect("count"), 1_000);
    assert!(!result.articles.is_empty());
    assert!(result.articles.len() <= 5);
    assert_eq!(result.total_count, result.articles.len());
    assert!(result.articles.iter().all(|entry| entry.score > 0.0));
    assert_eq!(result.location_cluster.as_str(), "37.8_-122.4");
}

#[rstest]
#[expect(
    clippy::float_arithmetic,
    reason = "expected score is computed with the decay formula"
)]
fn exact_score_for_views_and_share(harness: Harness) {
    harness
        .interactions
        .append_all(vec![
            event(1, InteractionKind::View, 600),
            event(1, InteractionKind::View, 600),
            event(1, InteractionKind::Share, 600),
        ])
        .expect("append");

    let result = harness.service.get_trending(&query(1)).expect("trending");

    assert_eq!(result.total_count, 1);
    let top = &result.articles[0];
    assert_eq!(top.article.id, Uuid::from_u128(1));
    let expected = (2.0 * 1.0 + 1.0 * 3.0) * (-600.0_f64 / 86_400.0).exp();
    assert!((top.score - expected).abs() < 1e-9, "got {}", top.score);
}

#[rstest]
fn cache_hit_ignores_new_interactions(harness: Harness) {
    harness
        .interactions
        .append(event(2, InteractionKind::Click, 60))
        .expect("append");
    let first = harness.service.get_trending(&query(5)).expect("first");

    harness
        .interactions
        .append_all(vec![
            event(1, InteractionKind::Share, 0),
            event(2, InteractionKind::Share, 0),
        ])
        .expect("append");
    harness.clock.advance(Duration::seconds(299));
    let second = harness.service.get_trending(&query(5)).expect("second");

    assert_eq!(first, second);
}

#[rstest]
fn expired_or_invalidated_cache_recomputes(harness: Harness) {
    harness
        .interactions
        .append(event(2, InteractionKind::Click, 60))
        .expect("append");
    let first = harness.service.get_trending(&query(5)).expect("first");
    harness
        .interactions
        .append(event(1, InteractionKind::Share, 0))
        .expect("append");

    harness.service.invalidate_cache();
    let refreshed = harness.service.get_trending(&query(5)).expect("refreshed");
    assert_ne!(first.scores(), refreshed.scores());
    assert_eq!(refreshed.total_count, 2);

    harness
        .interactions
        .append(event(3, InteractionKind::View, 0))
        .expect("append");
    harness.clock.advance(Duration::seconds(300));
    let expired = harness.service.get_trending(&query(5)).expect("expired");
    assert_eq!(expired.total_count, 3);
}

#[rstest]
fn unknown_articles_are_skipped_not_counted(harness: Harness) {
    harness
        .interactions
        .append_all(vec![
            event(99, InteractionKind::Share, 0),
            event(99, InteractionKind::Share, 0),
            event(1, InteractionKind::View, 0),
        ])
        .expect("append");

    let result = harness.service.get_trending(&query(1)).expect("trending");

    assert_eq!(result.total_count, 1);
    assert_eq!(result.articles[0].article.id, Uuid::from_u128(1));
    assert_eq!(
        result.skipped,
        vec![(Uuid::from_u128(99), SkipReason::NotFound)]
    );
}

#[rstest]
fn results_are_truncated_to_limit(harness: Harness) {
    harness
        .interactions
        .append_all(vec![
            event(1, InteractionKind::Share, 0),
            event(2, InteractionKind::Click, 0),
            event(3, InteractionKind::View, 0),
        ])
        .expect("append");

    let result = harness.service.get_trending(&query(2)).expect("trending");
    let ids: Vec<u128> = result
        .articles
        .iter()
        .map(|entry| entry.article.id.as_u128())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(result.score_entries().len(), 2);
}

#[rstest]
fn article_location_is_irrelevant(harness: Harness) {
    // Article 5 has no coordinates; its readers are in San Francisco.
    harness
        .interactions
        .append(event(5, InteractionKind::Comment, 0))
        .expect("append");
    let result = harness.service.get_trending(&query(5)).expect("trending");
    assert_eq!(result.articles[0].article.id, Uuid::from_u128(5));
}

#[rstest]
fn store_failures_propagate_and_are_not_cached() {
    let service = TrendingService::new(
        UnavailableStore,
        sample_catalog(),
        ManualClock::new(reference_time()),
        TrendingConfig::default(),
    );
    let err = service.get_trending(&query(5)).expect_err("store is down");
    assert!(matches!(err, TrendingError::Interactions { .. }));
    assert!(service.cache().is_empty());
}

#[rstest]
fn lookup_failures_propagate() {
    let interactions = MemoryInteractionStore::with_events([event(1, InteractionKind::View, 0)]);
    let service = TrendingService::new(
        interactions,
        UnavailableStore,
        ManualClock::new(reference_time()),
        TrendingConfig::default(),
    );
    let err = service.get_trending(&query(5)).expect_err("lookup is down");
    assert!(matches!(err, TrendingError::Articles { .. }));
}

#[rstest]
fn distant_query_without_seeder_is_empty(harness: Harness) {
    harness
        .interactions
        .append(event(1, InteractionKind::Share, 0))
        .expect("append");
    let london = TrendingQuery::new(51.5, -0.12, 5).expect("valid query");
    let result = harness.service.get_trending(&london).expect("trending");
    assert!(result.is_empty());
    assert_eq!(result.total_count, 0);
}

#[rstest]
#[case::empty_store(0, 1_000)]
#[case::existing_traffic(1, 1)]
fn distant_queries_seed_at_most_once(#[case] preloaded: usize, #[case] expected: usize) {
    let interactions = Arc::new(MemoryInteractionStore::with_events(
        (0..preloaded).map(|_| event(1, InteractionKind::Share, 0)),
    ));
    let clock = Arc::new(ManualClock::new(reference_time()));
    let service = TrendingService::new(
        Arc::clone(&interactions),
        sample_catalog(),
        Arc::clone(&clock),
        TrendingConfig::default(),
    )
    .with_seeder(InteractionSimulator::seeded(42, SimulationConfig::default()).expect("config"));
    let mid_pacific = TrendingQuery::new(0.0, -150.0, 5).expect("valid query");

    for _ in 0..3 {
        let result = service.get_trending(&mid_pacific).expect("trending");
        assert!(result.is_empty());
        assert_eq!(result.total_count, 0);
        assert_eq!(result.location_cluster.as_str(), "0.0_-150.0");
        assert_eq!(interactions.count().expect("count"), expected);
        clock.advance(Duration::seconds(301));
    }
}
