pub use crate::MIN_CONGESTION_FACTOR;

// Network model and loading
pub use crate::loading::{NetworkConfig, create_road_network, load_transit_network};
pub use crate::model::{
    Condition, CostMode, FacilityKind, RoadNetwork, TimeWindow, VehicleType, WeatherImpact,
};

// Algorithms
pub use crate::design::{DesignOptions, SpanningTreeResult, build_minimum_network};
pub use crate::routing::{
    EmergencyQuery, Route, RouteQuery, VehicleMix, compare_time_windows, find_emergency_route,
    find_shortest_path, route_to_nearest_facility,
};
pub use crate::signals::{
    Intersection, PhaseFlow, PriorityMode, SignalOptions, SignalPlan, approach_flows,
    optimize_network_signals, optimize_signals,
};
pub use crate::transit::{TransitNetwork, TransitOptions, TransitPlan, allocate_buses};

// Execution control and results
pub use crate::diagnostics::ConstraintViolation;
pub use crate::{Error, Interrupt, OptimizationEngine};

// Units
pub use crate::{Kilometres, Minutes, Seconds};
