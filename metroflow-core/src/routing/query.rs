use serde::Deserialize;

use crate::model::{Condition, CostMode, Road, RoadNetwork, TimeWindow, VehicleType};

/// Options of a shortest-path query
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteQuery {
    pub time_window: TimeWindow,
    pub cost_mode: CostMode,
    pub vehicle: VehicleType,
    /// Roads rated below this are never traversed
    pub min_condition: Condition,
    /// Traverse construction candidates as if they were built
    pub include_potential_roads: bool,
}

impl Default for RouteQuery {
    fn default() -> Self {
        Self {
            time_window: TimeWindow::MorningPeak,
            cost_mode: CostMode::Time,
            vehicle: VehicleType::Car,
            min_condition: Condition::WORST,
            include_potential_roads: false,
        }
    }
}

impl RouteQuery {
    #[must_use]
    pub fn in_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    #[must_use]
    pub fn with_cost_mode(mut self, mode: CostMode) -> Self {
        self.cost_mode = mode;
        self
    }

    pub(crate) fn admits(&self, road: &Road) -> bool {
        road.condition >= self.min_condition && (road.is_existing() || self.include_potential_roads)
    }

    pub(crate) fn cost(&self, network: &RoadNetwork, road: &Road) -> f64 {
        network.vehicle_weight(road.id, self.time_window, self.cost_mode, self.vehicle)
    }
}

/// Options of an emergency-route query
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmergencyQuery {
    pub vehicle: VehicleType,
    /// Hard constraint: roads rated below this are excluded
    pub min_condition: Condition,
    pub time_window: TimeWindow,
    pub cost_mode: CostMode,
}

impl Default for EmergencyQuery {
    fn default() -> Self {
        Self {
            vehicle: VehicleType::Emergency,
            min_condition: Condition::WORST,
            time_window: TimeWindow::MorningPeak,
            cost_mode: CostMode::Time,
        }
    }
}

impl EmergencyQuery {
    #[must_use]
    pub fn with_min_condition(mut self, condition: Condition) -> Self {
        self.min_condition = condition;
        self
    }

    /// The Dijkstra query with exactly the same edge-cost definition and filter
    pub fn as_route_query(&self) -> RouteQuery {
        RouteQuery {
            time_window: self.time_window,
            cost_mode: self.cost_mode,
            vehicle: self.vehicle,
            min_condition: self.min_condition,
            include_potential_roads: false,
        }
    }
}
