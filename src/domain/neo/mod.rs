//! Near-Earth-object domain: daily catalogs and the per-day records derived from them.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod fallback;
mod metrics;
pub mod wire;

pub use fallback::{generate_fallback, FALLBACK_ID_PREFIX};
pub use metrics::{aggregate_hazard_ratio, flatten, hazard_ratio};

use crate::error::CosmicError;
use crate::shared::DateKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Whether event data came from the provider or was synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    /// Substituted because the provider was rate limiting.
    Fallback,
}

/// A validated near-Earth object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearEarthObject {
    pub id: String,
    pub name: String,
    pub is_potentially_hazardous: bool,
    /// Never empty.
    pub close_approaches: Vec<CloseApproach>,
    pub estimated_diameter_km: Option<DiameterRange>,
}

impl NearEarthObject {
    /// True for objects produced by the rate-limit fallback.
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with(FALLBACK_ID_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseApproach {
    pub date: Option<DateKey>,
    pub relative_velocity_kps: Option<f64>,
    pub miss_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiameterRange {
    pub min: f64,
    pub max: f64,
}

/// A validated date-keyed catalog for an inclusive range of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeoFeed {
    pub provenance: Provenance,
    pub days: BTreeMap<DateKey, Vec<NearEarthObject>>,
}

impl NeoFeed {
    /// Total number of objects across all days.
    pub fn element_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Object counts for one calendar day. `hazardous_count <= count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDayRecord {
    date: DateKey,
    count: u32,
    hazardous_count: u32,
}

impl EventDayRecord {
    pub fn new(date: DateKey, count: u32, hazardous_count: u32) -> Result<Self, CosmicError> {
        if hazardous_count > count {
            return Err(CosmicError::InvalidParameter(format!(
                "hazardous count {} exceeds total count {} for {}",
                hazardous_count, count, date
            )));
        }
        Ok(Self {
            date,
            count,
            hazardous_count,
        })
    }

    /// A day with no recorded objects.
    pub fn empty(date: DateKey) -> Self {
        Self {
            date,
            count: 0,
            hazardous_count: 0,
        }
    }

    pub fn date(&self) -> &DateKey {
        &self.date
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn hazardous_count(&self) -> u32 {
        self.hazardous_count
    }
}

/// Flattened per-day records plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBatch {
    pub provenance: Provenance,
    /// Ascending by date, one record per day.
    pub records: Vec<EventDayRecord>,
}

impl EventBatch {
    pub fn live(records: Vec<EventDayRecord>) -> Self {
        Self {
            provenance: Provenance::Live,
            records,
        }
    }

    pub fn from_feed(feed: &NeoFeed) -> Self {
        Self {
            provenance: feed.provenance,
            records: flatten(feed),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.count())).sum()
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}
