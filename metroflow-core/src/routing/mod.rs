//! Shortest-path search: time-dependent Dijkstra and condition-constrained A*

mod astar;
mod dijkstra;
mod emissions;
mod query;
mod route;
mod state;

pub use astar::{find_emergency_route, route_to_nearest_facility};
pub use dijkstra::{compare_time_windows, find_shortest_path};
pub use emissions::{
    DEFAULT_SEGMENT_SPEED, Emissions, RouteEmissions, SegmentEmissions, VehicleMix,
};
pub use query::{EmergencyQuery, RouteQuery};
pub use route::{Route, RouteSegment, TrafficLevel};
