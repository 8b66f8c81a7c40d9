//! Wire types for the NeoWs feed (REST).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /feed` body. Keys of `near_earth_objects` are `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub element_count: Option<u64>,
    pub near_earth_objects: BTreeMap<String, Vec<WireNeo>>,
}

/// A single near-Earth object as sent by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNeo {
    pub id: String,
    pub name: String,
    pub is_potentially_hazardous_asteroid: bool,
    pub close_approach_data: Vec<WireCloseApproach>,
    #[serde(default)]
    pub estimated_diameter: Option<WireEstimatedDiameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireCloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,
    #[serde(default)]
    pub relative_velocity: Option<WireRelativeVelocity>,
    #[serde(default)]
    pub miss_distance: Option<WireMissDistance>,
}

/// Velocities arrive as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRelativeVelocity {
    #[serde(default)]
    pub kilometers_per_second: Option<String>,
    #[serde(default)]
    pub kilometers_per_hour: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMissDistance {
    #[serde(default)]
    pub kilometers: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEstimatedDiameter {
    #[serde(default)]
    pub kilometers: Option<WireDiameterRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDiameterRange {
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
}
