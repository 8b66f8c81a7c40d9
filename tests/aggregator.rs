//! Integration tests for the aggregation engine.
//!
//! The engine is driven through scripted in-memory sources, so these run
//! offline. A watch-channel gate holds a cycle open to exercise the
//! single-flight guard.
//!
//! Run with:
//! ```bash
//! cargo test --test aggregator
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::timeout;

use cosmic_feed::aggregate::{
    AggregateSnapshot, AggregatorConfig, CosmicAggregator, CycleOutcome, CyclePhase, EventSource,
    PriceSource, SnapshotStatus, CYCLE_ABORTED,
};
use cosmic_feed::domain::neo::{EventBatch, EventDayRecord, Provenance};
use cosmic_feed::domain::price::RawPricePair;
use cosmic_feed::error::{CosmicError, Provider};
use cosmic_feed::shared::DateKey;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// 2023-01-01T00:00:00Z
const JAN_1_MS: f64 = 1_672_531_200_000.0;
const DAY_MS: f64 = 86_400_000.0;

// ─── Fakes ───────────────────────────────────────────────────────────────────

struct Script {
    current_price: Decimal,
    price_history: Vec<(f64, f64)>,
    today: EventBatch,
    history: EventBatch,
    fail_prices: bool,
    fail_events: bool,
    panic_prices: bool,
}

/// One scripted object standing in for both providers.
#[derive(Clone)]
struct FakeProviders {
    script: Arc<Mutex<Script>>,
    price_calls: Arc<AtomicUsize>,
    history_calls: Arc<AtomicUsize>,
    gate: watch::Receiver<bool>,
}

impl FakeProviders {
    fn new(script: Script) -> (Self, watch::Sender<bool>) {
        let (gate_tx, gate) = watch::channel(true);
        let fake = Self {
            script: Arc::new(Mutex::new(script)),
            price_calls: Arc::new(AtomicUsize::new(0)),
            history_calls: Arc::new(AtomicUsize::new(0)),
            gate,
        };
        (fake, gate_tx)
    }

    fn edit(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    async fn pass_gate(&self) {
        let mut gate = self.gate.clone();
        let _ = gate.wait_for(|open| *open).await;
    }
}

#[async_trait]
impl PriceSource for FakeProviders {
    async fn current_price(&self) -> Result<Decimal, CosmicError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.script.lock().unwrap().panic_prices {
            panic!("price source crashed");
        }
        let script = self.script.lock().unwrap();
        if script.fail_prices {
            return Err(CosmicError::UpstreamTimeout {
                provider: Provider::CoinGecko,
            });
        }
        Ok(script.current_price)
    }

    async fn price_history(&self, _days: u32) -> Result<Vec<RawPricePair>, CosmicError> {
        let script = self.script.lock().unwrap();
        script
            .price_history
            .iter()
            .map(|&(ts, price)| RawPricePair::new(ts, price))
            .collect()
    }
}

#[async_trait]
impl EventSource for FakeProviders {
    async fn today(&self) -> Result<EventBatch, CosmicError> {
        Ok(self.script.lock().unwrap().today.clone())
    }

    async fn history(&self, _days: u32) -> Result<EventBatch, CosmicError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        if script.fail_events {
            return Err(CosmicError::UpstreamServerError {
                provider: Provider::NeoWs,
                status: 503,
            });
        }
        Ok(script.history.clone())
    }
}

fn key(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

fn record(date: &str, count: u32, hazardous: u32) -> EventDayRecord {
    EventDayRecord::new(key(date), count, hazardous).unwrap()
}

/// Prices on Jan 1 + 2, events on Jan 1 + 3.
fn scenario() -> Script {
    Script {
        current_price: Decimal::new(4700050, 2),
        price_history: vec![(JAN_1_MS, 45000.0), (JAN_1_MS + DAY_MS, 46000.0)],
        today: EventBatch::live(vec![record("2023-01-03", 3, 0)]),
        history: EventBatch::live(vec![
            record("2023-01-01", 5, 1),
            record("2023-01-03", 2, 0),
        ]),
        fail_prices: false,
        fail_events: false,
        panic_prices: false,
    }
}

type Engine = CosmicAggregator<FakeProviders, FakeProviders>;

fn engine(fake: &FakeProviders) -> Engine {
    CosmicAggregator::new(fake.clone(), fake.clone(), AggregatorConfig::default())
}

async fn settled(engine: &Engine) -> AggregateSnapshot {
    let mut rx = engine.subscribe();
    let snap = timeout(TEST_TIMEOUT, rx.wait_for(|s| !s.is_refreshing))
        .await
        .expect("timed out waiting for cycle to finish")
        .expect("snapshot channel closed")
        .clone();
    snap
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_initial_cycle_commits_joined_snapshot() {
    let (fake, _gate) = FakeProviders::new(scenario());
    let engine = engine(&fake);

    assert_eq!(engine.snapshot().status(), SnapshotStatus::Loading);
    assert_eq!(engine.phase(), CyclePhase::Refreshing);

    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Ready);
    assert_eq!(snap.current_price, Some(Decimal::new(4700050, 2)));
    assert_eq!(snap.today_event_count, 3);
    assert_eq!(snap.overall_hazard_score, Decimal::new(143, 1));
    assert_eq!(snap.series.len(), 1);
    assert_eq!(snap.series[0].date, key("2023-01-01"));
    assert_eq!(snap.series[0].price, Decimal::new(45000, 0));
    assert_eq!(snap.series[0].event_count, 5);
    assert_eq!(snap.event_provenance, Some(Provenance::Live));
    assert!(snap.last_updated.is_some());
    assert!(snap.last_error.is_none());
    assert_eq!(engine.phase(), CyclePhase::Idle);
}

#[tokio::test]
async fn test_refresh_is_single_flight() {
    let (fake, gate) = FakeProviders::new(scenario());
    gate.send_replace(false);

    let engine = engine(&fake);
    assert_eq!(engine.phase(), CyclePhase::Refreshing);

    for _ in 0..10 {
        assert!(!engine.refresh());
    }
    assert_eq!(engine.run_cycle().await, CycleOutcome::Skipped);
    assert!(engine.snapshot().is_refreshing);

    gate.send_replace(true);
    settled(&engine).await;

    assert_eq!(fake.price_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.history_calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.phase(), CyclePhase::Idle);

    assert!(engine.refresh());
    settled(&engine).await;
    assert_eq!(fake.price_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_cycle_preserves_data() {
    let (fake, _gate) = FakeProviders::new(scenario());
    let engine = engine(&fake);
    let good = settled(&engine).await;

    fake.edit(|s| {
        s.fail_prices = true;
        s.current_price = Decimal::ONE;
    });
    let outcome = engine.run_cycle().await;
    let message = match outcome {
        CycleOutcome::Failed(message) => message,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(message, "CoinGecko API request timed out. Please try again.");

    let snap = engine.snapshot();
    assert_eq!(snap.status(), SnapshotStatus::Stale);
    assert_eq!(snap.last_error.as_deref(), Some(message.as_str()));
    assert!(!snap.is_refreshing);
    assert_eq!(snap.current_price, good.current_price);
    assert_eq!(snap.today_event_count, good.today_event_count);
    assert_eq!(snap.overall_hazard_score, good.overall_hazard_score);
    assert_eq!(snap.series, good.series);
    assert_eq!(snap.last_updated, good.last_updated);
}

#[tokio::test]
async fn test_event_failure_also_preserves_data() {
    let (fake, _gate) = FakeProviders::new(scenario());
    let engine = engine(&fake);
    let good = settled(&engine).await;

    fake.edit(|s| s.fail_events = true);
    assert!(matches!(engine.run_cycle().await, CycleOutcome::Failed(_)));

    let snap = engine.snapshot();
    assert!(snap.last_error.unwrap().contains("NASA NeoWs"));
    assert_eq!(snap.series, good.series);
}

#[tokio::test]
async fn test_refresh_clears_error_then_success_commits() {
    let mut script = scenario();
    script.fail_prices = true;
    let (fake, _gate) = FakeProviders::new(script);
    let engine = engine(&fake);

    let failed = settled(&engine).await;
    assert_eq!(failed.status(), SnapshotStatus::Failed);
    assert!(failed.current_price.is_none());
    assert!(failed.series.is_empty());

    fake.edit(|s| s.fail_prices = false);
    assert!(engine.refresh());
    let in_flight = engine.snapshot();
    assert!(in_flight.is_refreshing);
    assert!(in_flight.last_error.is_none());

    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Ready);
    assert!(snap.last_error.is_none());
    assert_eq!(snap.current_price, Some(Decimal::new(4700050, 2)));
}

#[tokio::test]
async fn test_fallback_provenance_reaches_snapshot() {
    let mut script = scenario();
    script.history.provenance = Provenance::Fallback;
    let (fake, _gate) = FakeProviders::new(script);
    let engine = engine(&fake);

    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Ready);
    assert!(snap.uses_fallback_events());
}

#[tokio::test]
async fn test_invalid_price_history_fails_whole_cycle() {
    let mut script = scenario();
    script.price_history.push((JAN_1_MS + 2.0 * DAY_MS, f64::NAN));
    let (fake, _gate) = FakeProviders::new(script);
    let engine = engine(&fake);

    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Failed);
    assert!(snap.last_error.unwrap().starts_with("Invalid response from CoinGecko"));
}

#[tokio::test]
async fn test_subscriber_sees_commit() {
    let (fake, gate) = FakeProviders::new(scenario());
    gate.send_replace(false);
    let engine = engine(&fake);

    let mut rx = engine.subscribe();
    assert!(rx.borrow_and_update().is_refreshing);

    gate.send_replace(true);
    timeout(TEST_TIMEOUT, rx.changed())
        .await
        .expect("timed out waiting for commit")
        .expect("snapshot channel closed");
    let snap = rx.borrow().clone();
    assert!(!snap.is_refreshing);
    assert_eq!(snap.series.len(), 1);
}

#[tokio::test]
async fn test_panicking_source_releases_guard() {
    let mut script = scenario();
    script.panic_prices = true;
    let (fake, _gate) = FakeProviders::new(script);
    let engine = engine(&fake);

    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Failed);
    assert_eq!(snap.last_error.as_deref(), Some(CYCLE_ABORTED));
    assert_eq!(engine.phase(), CyclePhase::Idle);

    fake.edit(|s| s.panic_prices = false);
    assert!(engine.refresh());
    let snap = settled(&engine).await;
    assert_eq!(snap.status(), SnapshotStatus::Ready);
    assert_eq!(fake.price_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_run_cycle_releases_guard() {
    let (fake, gate) = FakeProviders::new(scenario());
    let engine = engine(&fake);
    settled(&engine).await;

    gate.send_replace(false);
    let stalled = timeout(Duration::from_millis(50), engine.run_cycle()).await;
    assert!(stalled.is_err());
    assert_eq!(engine.phase(), CyclePhase::Idle);
    assert_eq!(engine.snapshot().status(), SnapshotStatus::Stale);

    gate.send_replace(true);
    assert_eq!(engine.run_cycle().await, CycleOutcome::Succeeded);
}

#[tokio::test]
async fn test_shorter_lookback_is_used() {
    let (fake, _gate) = FakeProviders::new(scenario());
    let config = AggregatorConfig::new(3).unwrap();
    let engine = CosmicAggregator::new(fake.clone(), fake.clone(), config);
    assert_eq!(engine.config().lookback_days(), 3);
    settled(&engine).await;
}

#[test]
fn test_new_outside_runtime_reports_error() {
    let (fake, _gate) = FakeProviders::new(scenario());
    let engine = engine(&fake);

    let snap = engine.snapshot();
    assert!(!snap.is_refreshing);
    assert_eq!(snap.status(), SnapshotStatus::Failed);
    assert!(!engine.refresh());
    assert_eq!(engine.phase(), CyclePhase::Idle);

    assert_eq!(
        tokio_test::block_on(engine.run_cycle()),
        CycleOutcome::Succeeded
    );
    assert_eq!(engine.snapshot().status(), SnapshotStatus::Ready);
}
