//! Aggregation engine: joins the price series with daily event counts and
//! keeps the latest good snapshot.
//!
//! - `source.rs`: Traits the engine fetches through
//! - `align.rs`: Date-keyed inner join
//! - `state.rs`: Snapshot types
//! - `engine.rs`: Single-flight refresh cycle

pub mod align;
pub mod engine;
pub mod source;
pub mod state;

pub use align::align;
pub use engine::{AggregatorConfig, CosmicAggregator, CycleOutcome, CyclePhase, CYCLE_ABORTED};
pub use source::{EventSource, PriceSource};
pub use state::{AggregateSnapshot, MergedPoint, SnapshotStatus};
