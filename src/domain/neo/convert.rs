//! Validation of NeoWs payloads and conversion to domain types.

use super::wire::{FeedResponse, WireCloseApproach, WireNeo};
use super::{CloseApproach, DiameterRange, NearEarthObject, NeoFeed, Provenance};
use crate::error::{CosmicError, Provider};
use crate::shared::DateKey;
use std::collections::BTreeMap;

impl TryFrom<WireNeo> for NearEarthObject {
    type Error = CosmicError;

    fn try_from(w: WireNeo) -> Result<Self, Self::Error> {
        if w.id.trim().is_empty() {
            return Err(CosmicError::invalid_response(
                Provider::NeoWs,
                "object with empty id",
            ));
        }
        if w.name.trim().is_empty() {
            return Err(CosmicError::invalid_response(
                Provider::NeoWs,
                format!("object {} has an empty name", w.id),
            ));
        }
        if w.close_approach_data.is_empty() {
            return Err(CosmicError::invalid_response(
                Provider::NeoWs,
                format!("object {} has no close-approach data", w.id),
            ));
        }

        let estimated_diameter_km = w
            .estimated_diameter
            .and_then(|d| d.kilometers)
            .map(|k| DiameterRange {
                min: k.estimated_diameter_min,
                max: k.estimated_diameter_max,
            });

        Ok(Self {
            id: w.id,
            name: w.name,
            is_potentially_hazardous: w.is_potentially_hazardous_asteroid,
            close_approaches: w
                .close_approach_data
                .into_iter()
                .map(CloseApproach::from)
                .collect(),
            estimated_diameter_km,
        })
    }
}

impl From<WireCloseApproach> for CloseApproach {
    fn from(w: WireCloseApproach) -> Self {
        let velocity = w.relative_velocity;
        let relative_velocity_kps = velocity.as_ref().and_then(|v| {
            parse_number(v.kilometers_per_second.as_deref()).or_else(|| {
                parse_number(v.kilometers_per_hour.as_deref()).map(|kph| kph / 3600.0)
            })
        });

        Self {
            date: w
                .close_approach_date
                .as_deref()
                .and_then(|d| DateKey::parse(d).ok()),
            relative_velocity_kps,
            miss_distance_km: w
                .miss_distance
                .and_then(|m| parse_number(m.kilometers.as_deref())),
        }
    }
}

/// Validate the whole feed; any malformed day key or object rejects it.
pub(crate) fn validate_feed(resp: FeedResponse) -> Result<NeoFeed, CosmicError> {
    let mut days = BTreeMap::new();

    for (raw_date, objects) in resp.near_earth_objects {
        let date = DateKey::parse(&raw_date).map_err(|_| {
            CosmicError::invalid_response(
                Provider::NeoWs,
                format!("invalid date key '{}'", raw_date),
            )
        })?;
        let objects = objects
            .into_iter()
            .map(NearEarthObject::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        days.insert(date, objects);
    }

    Ok(NeoFeed {
        provenance: Provenance::Live,
        days,
    })
}

fn parse_number(s: Option<&str>) -> Option<f64> {
    s.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
