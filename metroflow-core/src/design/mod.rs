//! Infrastructure design: a priority-weighted minimum spanning forest over
//! existing roads and construction candidates.

mod kruskal;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{RoadId, RoadStatus};

pub use kruskal::{base_cost, build_minimum_network};

/// Discount on roads touching a hospital
pub const HOSPITAL_BONUS: f64 = 0.4;
/// Discount on roads touching the most populated neighborhood; scaled down
/// linearly with population rank
pub const MAX_POPULATION_BONUS: f64 = 0.3;
/// Yearly upkeep per kilometre of a condition-5 road
pub const MAINTENANCE_COST_PER_KM: f64 = 20.0;
/// Adjusted costs never fall below this
pub const MIN_ADJUSTED_COST: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignOptions {
    /// Make construction candidates eligible
    pub include_new_roads: bool,
    pub hospital_priority: bool,
    pub population_priority: bool,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            include_new_roads: true,
            hospital_priority: true,
            population_priority: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedRoad {
    pub road: RoadId,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub status: RoadStatus,
    /// Construction cost, or maintenance cost for an existing road
    pub base_cost: f64,
    pub adjusted_cost: f64,
}

/// Minimum spanning forest under the adjusted-cost metric
#[derive(Debug, Clone, Serialize)]
pub struct SpanningTreeResult {
    /// Roads in selection order
    pub selected: Vec<SelectedRoad>,
    pub total_adjusted_cost: f64,
    pub total_base_cost: f64,
    pub new_roads: usize,
    pub existing_roads: usize,
    /// Connected components of the selected forest, isolated nodes included
    pub components: usize,
    /// Ids of nodes outside the largest component
    pub unreachable_nodes: Vec<String>,
    /// Hospitals inside the largest component
    pub connected_hospitals: usize,
}

impl SpanningTreeResult {
    pub fn is_connected(&self) -> bool {
        self.unreachable_nodes.is_empty()
    }

    /// Turns a spanning forest into [`Error::Disconnected`]
    pub fn require_connected(self) -> Result<Self, Error> {
        if self.is_connected() {
            Ok(self)
        } else {
            Err(Error::Disconnected(self.unreachable_nodes))
        }
    }
}
