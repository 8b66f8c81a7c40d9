//! Synthetic catalog substituted when the provider rate limits.
//!
//! Objects are recognizable by the [`FALLBACK_ID_PREFIX`] on their id and the
//! feed carries [`Provenance::Fallback`], so callers can always tell
//! generated data from real observations.

use super::{CloseApproach, DiameterRange, NearEarthObject, NeoFeed, Provenance};
use crate::shared::DateKey;
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::Range;

pub const FALLBACK_ID_PREFIX: &str = "fallback-";

/// Chance that a generated object is flagged potentially hazardous.
pub const FALLBACK_HAZARD_PROBABILITY: f64 = 0.1;

/// Objects generated per day (half-open).
pub const FALLBACK_OBJECTS_PER_DAY: Range<u32> = 5..20;

/// Generate a plausible catalog for every day in `start..=end`.
///
/// Each object gets one close approach dated on its own day. An inverted
/// range yields an empty feed.
pub fn generate_fallback<R: Rng>(start: &DateKey, end: &DateKey, rng: &mut R) -> NeoFeed {
    let days = start
        .through(end)
        .map(|date| {
            let count = rng.gen_range(FALLBACK_OBJECTS_PER_DAY);
            let objects = (0..count).map(|i| synthetic_object(&date, i, rng)).collect();
            (date, objects)
        })
        .collect::<BTreeMap<_, Vec<_>>>();

    NeoFeed {
        provenance: Provenance::Fallback,
        days,
    }
}

fn synthetic_object<R: Rng>(date: &DateKey, index: u32, rng: &mut R) -> NearEarthObject {
    NearEarthObject {
        id: format!("{}{}-{}", FALLBACK_ID_PREFIX, date, index),
        name: format!("Fallback Asteroid {}", index + 1),
        is_potentially_hazardous: rng.gen_bool(FALLBACK_HAZARD_PROBABILITY),
        close_approaches: vec![CloseApproach {
            date: Some(date.clone()),
            relative_velocity_kps: Some(rng.gen_range(5.0..25.0)),
            miss_distance_km: Some(rng.gen_range(1_000_000.0..11_000_000.0)),
        }],
        estimated_diameter_km: Some(DiameterRange {
            min: rng.gen_range(0.0..2.0),
            max: rng.gen_range(2.0..7.0),
        }),
    }
}
