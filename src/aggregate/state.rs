//! Snapshot types published by the engine.

use crate::domain::neo::Provenance;
use crate::shared::DateKey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One day on which both a price and an event record exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedPoint {
    pub date: DateKey,
    /// Rounded to 2 dp.
    pub price: Decimal,
    pub event_count: u32,
}

/// Latest committed aggregate result plus transient status flags.
///
/// Data fields only change together, on a successful cycle. A failed cycle
/// touches `last_error` and `is_refreshing` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    /// Unrounded spot price; `None` until the first successful cycle.
    pub current_price: Option<Decimal>,
    pub today_event_count: u32,
    /// Percentage in `[0, 100]`, 1 dp.
    pub overall_hazard_score: Decimal,
    /// Ascending by date.
    pub series: Vec<MergedPoint>,
    pub is_refreshing: bool,
    pub last_error: Option<String>,
    /// Whether the committed event figures are live or synthetic.
    pub event_provenance: Option<Provenance>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for AggregateSnapshot {
    fn default() -> Self {
        Self {
            current_price: None,
            today_event_count: 0,
            overall_hazard_score: Decimal::ZERO,
            series: Vec::new(),
            is_refreshing: true,
            last_error: None,
            event_provenance: None,
            last_updated: None,
        }
    }
}

/// What a consumer should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// A cycle is in flight, or nothing has been attempted yet.
    Loading,
    Ready,
    /// Last cycle failed; previously committed data is still shown.
    Stale,
    /// Last cycle failed and no data was ever committed.
    Failed,
}

impl AggregateSnapshot {
    /// True once any cycle has committed.
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }

    pub fn status(&self) -> SnapshotStatus {
        if self.is_refreshing {
            return SnapshotStatus::Loading;
        }
        match (&self.last_error, self.has_data()) {
            (Some(_), true) => SnapshotStatus::Stale,
            (Some(_), false) => SnapshotStatus::Failed,
            (None, true) => SnapshotStatus::Ready,
            (None, false) => SnapshotStatus::Loading,
        }
    }

    /// Whether the committed event figures were synthesized.
    pub fn uses_fallback_events(&self) -> bool {
        self.event_provenance == Some(Provenance::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_loading() {
        let snap = AggregateSnapshot::default();
        assert!(snap.is_refreshing);
        assert!(snap.current_price.is_none());
        assert!(snap.series.is_empty());
        assert_eq!(snap.status(), SnapshotStatus::Loading);
        assert!(!snap.uses_fallback_events());
    }

    #[test]
    fn test_status_distinguishes_error_cases() {
        let failed = AggregateSnapshot {
            is_refreshing: false,
            last_error: Some("boom".into()),
            ..Default::default()
        };
        assert_eq!(failed.status(), SnapshotStatus::Failed);

        let stale = AggregateSnapshot {
            current_price: Some(Decimal::new(45000, 0)),
            last_updated: Some(Utc::now()),
            ..failed.clone()
        };
        assert_eq!(stale.status(), SnapshotStatus::Stale);

        let ready = AggregateSnapshot {
            last_error: None,
            ..stale.clone()
        };
        assert_eq!(ready.status(), SnapshotStatus::Ready);

        let reloading = AggregateSnapshot {
            is_refreshing: true,
            ..ready
        };
        assert_eq!(reloading.status(), SnapshotStatus::Loading);
    }

    #[test]
    fn test_serializes_decimals_as_strings() {
        let snap = AggregateSnapshot {
            current_price: Some(Decimal::new(4712345, 2)),
            overall_hazard_score: Decimal::new(143, 1),
            event_provenance: Some(Provenance::Fallback),
            ..Default::default()
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["current_price"], "47123.45");
        assert_eq!(json["overall_hazard_score"], "14.3");
        assert_eq!(json["event_provenance"], "fallback");
    }
}
