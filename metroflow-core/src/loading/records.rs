use serde::Deserialize;

use super::de::deserialize_id;
use crate::model::{FacilityKind, TimeWindow};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeighborhoodRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub population: u64,
    pub lat: f64,
    pub lon: f64,
    /// Land-use description (residential, mixed, business, ...)
    #[serde(default, rename = "type")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FacilityKind,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoadRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub to: String,
    pub distance: f64,
    pub capacity: f64,
    pub condition: u8,
    #[serde(default)]
    pub one_way: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PotentialRoadRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub to: String,
    pub distance: f64,
    pub capacity: f64,
    pub cost: f64,
}

/// Traffic observation for one road in one time window.
///
/// Either the vehicle `flow` (turned into a congestion factor with the BPR
/// relation) or an explicit `multiplier` in `(0, 1]` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub to: String,
    pub window: TimeWindow,
    #[serde(default)]
    pub flow: Option<f64>,
    #[serde(default)]
    pub multiplier: Option<f64>,
}

/// Every record needed to assemble a [`RoadNetwork`](crate::RoadNetwork)
#[derive(Debug, Clone, Default)]
pub struct NetworkRecords {
    pub neighborhoods: Vec<NeighborhoodRecord>,
    pub facilities: Vec<FacilityRecord>,
    pub roads: Vec<RoadRecord>,
    pub potential_roads: Vec<PotentialRoadRecord>,
    pub traffic: Vec<TrafficRecord>,
}

impl RoadRecord {
    pub fn two_way(from: &str, to: &str, distance: f64, capacity: f64, condition: u8) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            distance,
            capacity,
            condition,
            one_way: false,
        }
    }

    #[must_use]
    pub fn one_way(mut self) -> Self {
        self.one_way = true;
        self
    }
}

impl NeighborhoodRecord {
    pub fn new(id: &str, population: u64, lat: f64, lon: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            population,
            lat,
            lon,
            district: None,
        }
    }
}

impl FacilityRecord {
    pub fn new(id: &str, kind: FacilityKind, lat: f64, lon: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            lat,
            lon,
        }
    }
}

impl PotentialRoadRecord {
    pub fn new(from: &str, to: &str, distance: f64, capacity: f64, cost: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            distance,
            capacity,
            cost,
        }
    }
}
