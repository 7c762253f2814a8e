//! Behavioural coverage for the trending service.

use std::cell::RefCell;
use std::sync::Arc;

use chrono::Duration;
use geo::Coord;
use newsdesk_core::test_support::{ManualClock, reference_time, sample_catalog};
use newsdesk_core::{
    Clock, InteractionEvent, InteractionKind, InteractionStore, MemoryArticleStore,
    MemoryInteractionStore,
};
use newsdesk_trending::{
    InteractionSimulator, SimulationConfig, TrendingConfig, TrendingQuery, TrendingResult,
    TrendingService,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use uuid::Uuid;

const SAN_FRANCISCO: Coord<f64> = Coord { x: -122.42, y: 37.77 };
const LONDON: Coord<f64> = Coord { x: -0.12, y: 51.5 };

type Service =
    TrendingService<Arc<MemoryInteractionStore>, MemoryArticleStore, Arc<ManualClock>>;

/// World state shared by trending scenarios.
struct TrendingWorld {
    interactions: Arc<MemoryInteractionStore>,
    clock: Arc<ManualClock>,
    service: RefCell<Service>,
    result: RefCell<Option<TrendingResult>>,
}

impl TrendingWorld {
    fn record(&self, article: u128, kind: InteractionKind, location: Coord<f64>) {
        let event = InteractionEvent::new(
            Uuid::from_u128(article),
            "user_1",
            kind,
            Some(location),
            self.clock.now(),
        );
        self.interactions
            .append(event)
            .unwrap_or_else(|err| panic!("append interaction: {err}"));
    }

    fn fetch(&self) {
        let query = TrendingQuery::new(SAN_FRANCISCO.y, SAN_FRANCISCO.x, 5)
            .unwrap_or_else(|err| panic!("valid query: {err}"));
        let result = self
            .service
            .borrow()
            .get_trending(&query)
            .unwrap_or_else(|err| panic!("trending request: {err}"));
        *self.result.borrow_mut() = Some(result);
    }

    fn ranked_ids(&self) -> Vec<u128> {
        self.result
            .borrow()
            .as_ref()
            .unwrap_or_else(|| panic!("trending result must be recorded"))
            .articles
            .iter()
            .map(|entry| entry.article.id.as_u128())
            .collect()
    }
}

#[fixture]
fn world() -> TrendingWorld {
    let interactions = Arc::new(MemoryInteractionStore::default());
    let clock = Arc::new(ManualClock::new(reference_time()));
    let service = TrendingService::new(
        Arc::clone(&interactions),
        sample_catalog(),
        Arc::clone(&clock),
        TrendingConfig::default(),
    );
    TrendingWorld {
        interactions,
        clock,
        service: RefCell::new(service),
        result: RefCell::new(None),
    }
}

#[given("readers in San Francisco viewed the telescope story twice")]
fn viewed_telescope(world: &TrendingWorld) {
    world.record(1, InteractionKind::View, SAN_FRANCISCO);
    world.record(1, InteractionKind::View, SAN_FRANCISCO);
}

#[given("readers in San Francisco shared the startup story once")]
fn shared_startup(world: &TrendingWorld) {
    world.record(2, InteractionKind::Share, SAN_FRANCISCO);
}

#[when("readers in San Francisco share the startup story")]
fn share_startup(world: &TrendingWorld) {
    world.record(2, InteractionKind::Share, SAN_FRANCISCO);
}

#[given("readers in London shared the parliament story")]
fn shared_parliament(world: &TrendingWorld) {
    world.record(4, InteractionKind::Share, LONDON);
}

#[given("a service that simulates interactions when none exist")]
fn simulating_service(world: &TrendingWorld) {
    let simulator = InteractionSimulator::seeded(42, SimulationConfig::default())
        .unwrap_or_else(|err| panic!("simulator config: {err}"));
    let service = TrendingService::new(
        Arc::clone(&world.interactions),
        sample_catalog(),
        Arc::clone(&world.clock),
        TrendingConfig::default(),
    )
    .with_seeder(simulator);
    *world.service.borrow_mut() = service;
}

#[given("I requested trending articles for San Francisco")]
fn requested_trending(world: &TrendingWorld) {
    world.fetch();
}

#[when("I request trending articles for San Francisco")]
fn request_trending(world: &TrendingWorld) {
    world.fetch();
}

#[when("five minutes pass")]
fn five_minutes_pass(world: &TrendingWorld) {
    world.clock.advance(Duration::minutes(5));
}

#[then("the startup story ranks first")]
fn startup_first(world: &TrendingWorld) {
    assert_eq!(world.ranked_ids().first(), Some(&2));
}

#[then("the telescope story ranks first")]
fn telescope_first(world: &TrendingWorld) {
    assert_eq!(world.ranked_ids().first(), Some(&1));
}

#[then("the telescope story ranks second")]
fn telescope_second(world: &TrendingWorld) {
    assert_eq!(world.ranked_ids().get(1), Some(&1));
}

#[then("no trending articles are returned")]
fn nothing_returned(world: &TrendingWorld) {
    assert!(world.ranked_ids().is_empty());
}

#[then("some trending articles are returned")]
fn something_returned(world: &TrendingWorld) {
    let ids = world.ranked_ids();
    assert!(!ids.is_empty() && ids.len() <= 5, "got {ids:?}");
}

#[then("every trending score is positive")]
fn scores_positive(world: &TrendingWorld) {
    let binding = world.result.borrow();
    let result = binding
        .as_ref()
        .unwrap_or_else(|| panic!("trending result must be recorded"));
    assert!(result.scores().iter().all(|score| *score > 0.0));
}

#[scenario(path = "tests/features/trending.feature", index = 0)]
fn shares_outrank_views(world: TrendingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/trending.feature", index = 1)]
fn distant_interactions_ignored(world: TrendingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/trending.feature", index = 2)]
fn cached_ranking_until_expiry(world: TrendingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/trending.feature", index = 3)]
fn empty_store_is_seeded(world: TrendingWorld) {
    let _ = world;
}
