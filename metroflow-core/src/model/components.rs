//! Road network components - nodes and road segments

use std::fmt;
use std::str::FromStr;

use geo::Point;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::traffic::normalize;
use crate::Error;

/// Network node: a neighborhood or a facility
#[derive(Debug, Clone)]
pub struct Node {
    /// External identifier from the source records
    pub id: String,
    pub name: String,
    /// Coordinates, x = longitude, y = latitude
    pub location: Point<f64>,
    /// Residents, neighborhoods only
    pub population: Option<u64>,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_facility(&self, kind: FacilityKind) -> bool {
        self.kind == NodeKind::Facility(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Neighborhood,
    Facility(FacilityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Hospital,
    TransitHub,
    School,
    Airport,
    Commercial,
    Other,
}

impl FromStr for FacilityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match normalize(s).as_str() {
            "" => return Err(Error::invalid("facility type is empty")),
            "hospital" | "medical" => FacilityKind::Hospital,
            "transithub" | "hub" | "station" => FacilityKind::TransitHub,
            "school" | "education" | "university" => FacilityKind::School,
            "airport" => FacilityKind::Airport,
            "commercial" | "business" | "retail" => FacilityKind::Commercial,
            _ => FacilityKind::Other,
        };
        Ok(kind)
    }
}

impl<'de> Deserialize<'de> for FacilityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Dense road identifier, index into the network's road table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoadId(pub usize);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    OneWay,
    TwoWay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadStatus {
    Existing,
    /// Construction candidate
    Potential,
}

/// Ordinal road condition rating, 1 (poor) to 5 (excellent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Condition(u8);

impl Condition {
    pub const WORST: Condition = Condition(1);
    pub const BEST: Condition = Condition(5);

    pub fn new(rating: u8) -> Result<Self, Error> {
        if (1..=5).contains(&rating) {
            Ok(Self(rating))
        } else {
            Err(Error::invalid(format!(
                "condition rating must be within 1..=5, got {rating}"
            )))
        }
    }

    pub fn rating(self) -> u8 {
        self.0
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::WORST
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rating = u8::deserialize(deserializer)?;
        Condition::new(rating).map_err(serde::de::Error::custom)
    }
}

/// Road segment between two nodes
#[derive(Debug, Clone)]
pub struct Road {
    pub id: RoadId,
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub direction: Direction,
    /// Length in kilometres
    pub distance: f64,
    /// Vehicles per hour
    pub capacity: f64,
    pub condition: Condition,
    /// Construction cost, potential roads only
    pub construction_cost: Option<f64>,
    pub status: RoadStatus,
}

impl Road {
    pub fn is_existing(&self) -> bool {
        self.status == RoadStatus::Existing
    }

    /// The endpoint opposite to `node`
    pub fn other_end(&self, node: NodeIndex) -> NodeIndex {
        if node == self.from { self.to } else { self.from }
    }
}
