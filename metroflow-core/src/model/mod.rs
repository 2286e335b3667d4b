//! Data model of the metropolitan road network
//!
//! Contains node and road types, the time-window speed model and the
//! immutable [`RoadNetwork`] snapshot every algorithm runs on.

pub mod components;
pub mod network;
pub mod traffic;

pub use components::{Condition, Direction, FacilityKind, Node, NodeKind, Road, RoadId, RoadStatus};
pub use network::RoadNetwork;
pub use traffic::{
    BASE_SPEED_KMH, CostMode, MAX_EMERGENCY_SPEED_FACTOR, TimeWindow, VehicleType, WeatherImpact,
    bpr_congestion, free_flow_speed,
};
