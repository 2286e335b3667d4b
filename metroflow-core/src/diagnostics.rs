//! Best-effort diagnostics attached to transit and signal plans

use serde::Serialize;

/// A constraint the planner could not satisfy exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintViolation {
    /// Route waiting time above the requested bound
    WaitingTimeExceeded {
        route_id: String,
        waiting_minutes: f64,
        bound_minutes: f64,
    },
    /// Not enough buses to give the route a single vehicle
    RouteUnserved { route_id: String },
    /// `phases × min_green_time` does not fit in the cycle
    MinimumGreenInfeasible {
        intersection_id: String,
        required_seconds: u64,
        cycle_seconds: u32,
    },
    /// Residual reconciliation pushed a phase past its cap
    MaximumGreenExceeded {
        intersection_id: String,
        phase: String,
        green_seconds: u32,
        cap_seconds: u32,
    },
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingTimeExceeded {
                route_id,
                waiting_minutes,
                bound_minutes,
            } => write!(
                f,
                "route {route_id}: waiting {waiting_minutes:.1} min exceeds {bound_minutes:.1} min"
            ),
            Self::RouteUnserved { route_id } => write!(f, "route {route_id}: no bus allocated"),
            Self::MinimumGreenInfeasible {
                intersection_id,
                required_seconds,
                cycle_seconds,
            } => write!(
                f,
                "intersection {intersection_id}: minimum greens need {required_seconds}s, cycle is {cycle_seconds}s"
            ),
            Self::MaximumGreenExceeded {
                intersection_id,
                phase,
                green_seconds,
                cap_seconds,
            } => write!(
                f,
                "intersection {intersection_id}: phase {phase} green {green_seconds}s exceeds cap {cap_seconds}s"
            ),
        }
    }
}
