//! # Cosmic Feed
//!
//! Aggregates a crypto price feed (CoinGecko) with the NASA NeoWs
//! near-Earth-object catalog into one date-aligned snapshot.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Date keys, rounding, domain models and their validation
//! 2. **HTTP API**: `ProviderHttp` with per-request timeouts and retry policies
//! 3. **High-Level Client**: `CosmicClient` with nested sub-clients
//! 4. **Aggregation**: `CosmicAggregator`, a single-flight refresh cycle
//!    publishing an `AggregateSnapshot`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cosmic_feed::prelude::*;
//!
//! let client = CosmicClient::builder().neo_api_key("...").build()?;
//! let engine = CosmicAggregator::new(client.clone(), client, AggregatorConfig::default());
//!
//! let mut rx = engine.subscribe();
//! rx.wait_for(|s| !s.is_refreshing).await?;
//! println!("{:?}", engine.snapshot().status());
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Date keys, calendar arithmetic and rounding.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions.
pub mod domain;

/// Unified error types.
pub mod error;

/// Upstream URL constants and provider defaults.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `CosmicClient`: the entry point for both providers.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 4: Aggregation ─────────────────────────────────────────────────────

/// Date-aligned snapshot engine.
pub mod aggregate;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared
    pub use crate::shared::date::{display_date, range_ending_today, to_date_key, today_key};
    pub use crate::shared::DateKey;

    // Domain types: price
    pub use crate::domain::price::{normalize_history, PricePoint, RawPricePair};

    // Domain types: near-Earth objects
    pub use crate::domain::neo::{
        aggregate_hazard_ratio, flatten, hazard_ratio, EventBatch, EventDayRecord,
        NearEarthObject, NeoFeed, Provenance,
    };

    // Aggregation
    pub use crate::aggregate::{
        align, AggregateSnapshot, AggregatorConfig, CosmicAggregator, CycleOutcome, CyclePhase,
        EventSource, MergedPoint, PriceSource, SnapshotStatus,
    };

    // Errors
    pub use crate::error::{CosmicError, Provider};

    // Network
    pub use crate::network::{DEFAULT_NEO_API_URL, DEFAULT_PRICE_API_URL, DEMO_API_KEY};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{CosmicClient, CosmicClientBuilder, NeoClient, PricesClient, Timeouts};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
