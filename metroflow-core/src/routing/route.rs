use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::RouteQuery;
use crate::model::{CostMode, RoadId, RoadNetwork, RoadStatus, TimeWindow, VehicleType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    /// Classifies a slowdown (`1 / congestion factor`)
    fn from_slowdown(slowdown: f64) -> Self {
        if slowdown > 1.3 {
            TrafficLevel::Heavy
        } else if slowdown > 1.1 {
            TrafficLevel::Moderate
        } else {
            TrafficLevel::Light
        }
    }
}

/// One road traversal within a route
#[derive(Debug, Clone, Serialize)]
pub struct RouteSegment {
    pub road: RoadId,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub time_minutes: f64,
    pub condition: u8,
    pub congestion_factor: f64,
    pub traffic: TrafficLevel,
    pub status: RoadStatus,
}

/// Immutable search result, independent of the network it came from
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
    /// Node ids from origin to destination
    pub nodes: Vec<String>,
    pub segments: Vec<RouteSegment>,
    pub total_time_minutes: f64,
    pub total_distance_km: f64,
    /// Path cost under `cost_mode`
    pub total_cost: f64,
    pub cost_mode: CostMode,
    pub time_window: TimeWindow,
    pub vehicle: VehicleType,
    /// Nodes settled by the search that produced this route
    pub nodes_expanded: usize,
}

impl Route {
    pub(crate) fn assemble(
        network: &RoadNetwork,
        origin: NodeIndex,
        hops: &[(NodeIndex, RoadId)],
        total_cost: f64,
        query: &RouteQuery,
        nodes_expanded: usize,
    ) -> Self {
        let mut nodes = Vec::with_capacity(hops.len() + 1);
        nodes.push(network.node(origin).id.clone());

        let mut previous = origin;
        let segments: Vec<RouteSegment> = hops
            .iter()
            .map(|&(node, road_id)| {
                let road = network.road(road_id);
                let congestion = network.congestion_factor(road_id, query.time_window);
                let segment = RouteSegment {
                    road: road_id,
                    from: network.node(previous).id.clone(),
                    to: network.node(node).id.clone(),
                    distance_km: road.distance,
                    time_minutes: network.vehicle_time(road_id, query.time_window, query.vehicle),
                    condition: road.condition.rating(),
                    congestion_factor: congestion,
                    traffic: TrafficLevel::from_slowdown(1.0 / congestion),
                    status: road.status,
                };
                nodes.push(segment.to.clone());
                previous = node;
                segment
            })
            .collect();

        Self {
            origin: network.node(origin).id.clone(),
            destination: nodes.last().cloned().unwrap_or_default(),
            total_time_minutes: segments.iter().map(|s| s.time_minutes).sum(),
            total_distance_km: segments.iter().map(|s| s.distance_km).sum(),
            nodes,
            segments,
            total_cost,
            cost_mode: query.cost_mode,
            time_window: query.time_window,
            vehicle: query.vehicle,
            nodes_expanded,
        }
    }

    pub fn average_condition(&self) -> Option<f64> {
        if self.segments.is_empty() {
            return None;
        }
        let sum: f64 = self.segments.iter().map(|s| f64::from(s.condition)).sum();
        Some(sum / self.segments.len() as f64)
    }

    pub fn average_congestion(&self) -> Option<f64> {
        if self.segments.is_empty() {
            return None;
        }
        let sum: f64 = self.segments.iter().map(|s| s.congestion_factor).sum();
        Some(sum / self.segments.len() as f64)
    }

    /// Average slowdown mapped onto a 1–10 scale, 0 for an empty route
    pub fn congestion_level(&self) -> u8 {
        if self.segments.is_empty() {
            return 0;
        }
        let slowdown: f64 = self
            .segments
            .iter()
            .map(|s| 1.0 / s.congestion_factor)
            .sum::<f64>()
            / self.segments.len() as f64;
        (slowdown * 5.0).floor().min(10.0) as u8
    }
}
