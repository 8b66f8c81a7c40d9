//! `CosmicAggregator`: single-flight refresh cycle over a price source and
//! an event source.
//!
//! The snapshot lives in a `tokio::sync::watch` channel. A cycle fetches in
//! two concurrent phases, aligns synchronously and then commits everything in
//! one `send_modify`, so readers never observe a half-applied result. The
//! in-flight guard is released inside that same closure. A cycle that ends
//! without committing (a source panicked, or `run_cycle` was dropped) releases
//! it from a drop guard instead and records [`CYCLE_ABORTED`].

use super::align::align;
use super::source::{EventSource, PriceSource};
use super::state::{AggregateSnapshot, MergedPoint};
use crate::domain::neo::{aggregate_hazard_ratio, EventBatch, Provenance};
use crate::domain::price::normalize_history;
use crate::error::CosmicError;

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Longest lookback the event provider can serve in a single request.
pub const MAX_LOOKBACK_DAYS: u32 = 7;

/// `last_error` of a cycle that ended without committing.
pub const CYCLE_ABORTED: &str = "Refresh was interrupted before it finished. Please try again.";

/// `last_error` when the first cycle cannot be spawned.
const NO_RUNTIME: &str = "No async runtime available to load data.";

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    lookback_days: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            lookback_days: MAX_LOOKBACK_DAYS,
        }
    }
}

impl AggregatorConfig {
    /// `lookback_days` must be within `1..=7`.
    pub fn new(lookback_days: u32) -> Result<Self, CosmicError> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
            return Err(CosmicError::InvalidParameter(format!(
                "lookback must be between 1 and {} days, got {}",
                MAX_LOOKBACK_DAYS, lookback_days
            )));
        }
        Ok(Self { lookback_days })
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }
}

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CyclePhase {
    Idle = 0,
    Refreshing = 1,
}

impl From<u8> for CyclePhase {
    fn from(v: u8) -> Self {
        match v {
            1 => CyclePhase::Refreshing,
            _ => CyclePhase::Idle,
        }
    }
}

/// Result of [`CosmicAggregator::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded,
    /// Carries the message stored as `last_error`.
    Failed(String),
    /// Another cycle was already in flight.
    Skipped,
}

/// Everything a successful cycle commits.
struct CycleData {
    current_price: Decimal,
    today_event_count: u32,
    overall_hazard_score: Decimal,
    series: Vec<MergedPoint>,
    event_provenance: Provenance,
}

struct Inner<P, E> {
    prices: P,
    events: E,
    config: AggregatorConfig,
    phase: AtomicU8,
    snapshot: watch::Sender<AggregateSnapshot>,
}

/// Owned aggregation state with a synchronous read accessor and a
/// fire-and-forget [`refresh`](Self::refresh).
///
/// Cloning shares the same state and guard.
pub struct CosmicAggregator<P, E> {
    inner: Arc<Inner<P, E>>,
}

impl<P, E> Clone for CosmicAggregator<P, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PriceSource, E: EventSource> CosmicAggregator<P, E> {
    /// Create the engine and start the first cycle.
    ///
    /// Must be called from within a Tokio runtime for the first cycle to
    /// start; otherwise the snapshot records the failure and a later
    /// [`refresh`](Self::refresh) from inside a runtime will load it.
    pub fn new(prices: P, events: E, config: AggregatorConfig) -> Self {
        let (snapshot, _) = watch::channel(AggregateSnapshot::default());
        let aggregator = Self {
            inner: Arc::new(Inner {
                prices,
                events,
                config,
                phase: AtomicU8::new(CyclePhase::Idle as u8),
                snapshot,
            }),
        };

        match Handle::try_current() {
            Ok(handle) => {
                aggregator.start_on(&handle);
            }
            Err(_) => {
                tracing::warn!("CosmicAggregator created outside a Tokio runtime, first cycle not started");
                aggregator.inner.snapshot.send_modify(|s| {
                    s.is_refreshing = false;
                    s.last_error = Some(NO_RUNTIME.to_string());
                });
            }
        }
        aggregator
    }

    /// Start a cycle in the background unless one is already running.
    ///
    /// Returns `true` if a cycle was started. Needs a Tokio runtime; outside
    /// one this is a no-op returning `false`.
    pub fn refresh(&self) -> bool {
        match Handle::try_current() {
            Ok(handle) => self.start_on(&handle),
            Err(_) => {
                tracing::warn!("refresh() called outside a Tokio runtime, ignoring");
                false
            }
        }
    }

    fn start_on(&self, handle: &Handle) -> bool {
        if !self.inner.try_begin() {
            tracing::debug!("Refresh already in flight, skipping");
            return false;
        }

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            inner.run().await;
        });
        true
    }

    /// Run a cycle to completion on the current task.
    ///
    /// Same guard as [`refresh`](Self::refresh): returns
    /// [`CycleOutcome::Skipped`] while another cycle is in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.inner.try_begin() {
            return CycleOutcome::Skipped;
        }
        self.inner.run().await
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AggregateSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receiver that observes every committed change.
    pub fn subscribe(&self) -> watch::Receiver<AggregateSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn phase(&self) -> CyclePhase {
        CyclePhase::from(self.inner.phase.load(Ordering::SeqCst))
    }

    pub fn config(&self) -> AggregatorConfig {
        self.inner.config
    }
}

impl<P: PriceSource, E: EventSource> Inner<P, E> {
    /// Take the guard and publish the in-flight flags. `false` if already held.
    fn try_begin(&self) -> bool {
        if self
            .phase
            .compare_exchange(
                CyclePhase::Idle as u8,
                CyclePhase::Refreshing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return false;
        }
        self.snapshot.send_modify(|s| {
            s.is_refreshing = true;
            s.last_error = None;
        });
        true
    }

    /// Caller must hold the guard.
    async fn run(&self) -> CycleOutcome {
        let lookback = self.config.lookback_days;
        tracing::info!(lookback_days = lookback, "Refresh cycle started");

        let mut release = Release {
            phase: &self.phase,
            snapshot: &self.snapshot,
            armed: true,
        };

        let result = self.fetch().await;
        let outcome = match &result {
            Ok(data) => {
                tracing::info!(
                    points = data.series.len(),
                    today_events = data.today_event_count,
                    hazard_score = %data.overall_hazard_score,
                    provenance = ?data.event_provenance,
                    "Refresh cycle committed"
                );
                CycleOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh cycle failed, keeping previous data");
                CycleOutcome::Failed(e.user_message())
            }
        };

        self.snapshot.send_modify(|s| {
            match result {
                Ok(data) => {
                    s.current_price = Some(data.current_price);
                    s.today_event_count = data.today_event_count;
                    s.overall_hazard_score = data.overall_hazard_score;
                    s.series = data.series;
                    s.event_provenance = Some(data.event_provenance);
                    s.last_updated = Some(Utc::now());
                    s.last_error = None;
                }
                Err(e) => {
                    s.last_error = Some(e.user_message());
                }
            }
            s.is_refreshing = false;
            self.phase.store(CyclePhase::Idle as u8, Ordering::SeqCst);
        });
        release.armed = false;

        outcome
    }

    async fn fetch(&self) -> Result<CycleData, CosmicError> {
        let days = self.config.lookback_days;

        let (current_price, today) =
            tokio::try_join!(self.prices.current_price(), self.events.today())?;
        let (raw_history, event_history) = tokio::try_join!(
            self.prices.price_history(days),
            self.events.history(days)
        )?;

        let prices = normalize_history(&raw_history);
        let series = align(&prices, &event_history.records);
        let overall_hazard_score = aggregate_hazard_ratio(&event_history.records);

        Ok(CycleData {
            current_price,
            today_event_count: today_count(&today),
            overall_hazard_score,
            series,
            event_provenance: combined_provenance(&today, &event_history),
        })
    }
}

/// Hands the guard back if a cycle is unwound or dropped before its commit.
struct Release<'a> {
    phase: &'a AtomicU8,
    snapshot: &'a watch::Sender<AggregateSnapshot>,
    armed: bool,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::error!("Refresh cycle aborted before commit, releasing guard");
        self.snapshot.send_modify(|s| {
            s.is_refreshing = false;
            s.last_error = Some(CYCLE_ABORTED.to_string());
            self.phase.store(CyclePhase::Idle as u8, Ordering::SeqCst);
        });
    }
}

fn today_count(batch: &EventBatch) -> u32 {
    batch.records.iter().map(|r| r.count()).sum()
}

/// Fallback if either batch was synthesized.
fn combined_provenance(today: &EventBatch, history: &EventBatch) -> Provenance {
    if today.is_fallback() || history.is_fallback() {
        Provenance::Fallback
    } else {
        Provenance::Live
    }
}
