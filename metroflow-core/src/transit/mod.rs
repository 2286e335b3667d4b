//! Bus fleet allocation and metro-bus transfer coordination

mod model;
mod planner;
mod transfers;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::diagnostics::ConstraintViolation;

pub use model::{BusRoute, MetroLine, TransferPoint, TransitNetwork, WaitingCurve};
pub use planner::allocate_buses;
pub use transfers::TRANSFER_BUFFER_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitOptions {
    /// Fleet size; the plan never allocates more
    pub total_buses: u32,
    /// Acceptable average wait per route, minutes
    pub max_waiting_time: f64,
    pub optimize_transfers: bool,
    /// Upper bound on buses moved by the transfer pass
    pub max_transfer_moves: u32,
}

impl Default for TransitOptions {
    fn default() -> Self {
        Self {
            total_buses: 50,
            max_waiting_time: 15.0,
            optimize_transfers: true,
            max_transfer_moves: 3,
        }
    }
}

impl TransitOptions {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(self.max_waiting_time.is_finite() && self.max_waiting_time > 0.0) {
            return Err(Error::invalid(format!(
                "max waiting time must be positive, got {}",
                self.max_waiting_time
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteAllocation {
    pub route_id: String,
    pub buses: u32,
    /// Infinite when the route gets no bus
    pub waiting_minutes: f64,
    pub within_bound: bool,
    /// Buses on the route today, from the input data
    pub current_buses: Option<u32>,
    pub current_waiting_minutes: Option<f64>,
    /// `buses - current_buses`
    pub change: Option<i64>,
}

/// One bus moved by the transfer pass
#[derive(Debug, Clone, Serialize)]
pub struct TransferAdjustment {
    /// Route that received the bus
    pub route_id: String,
    /// Route that gave it up, `None` when it came from the unallocated pool
    pub donor_route_id: Option<String>,
    pub buses_after: u32,
    pub max_transfer_wait_before: f64,
    pub max_transfer_wait_after: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub station: String,
    pub metro_lines: Vec<String>,
    pub bus_routes: Vec<String>,
    /// Worst bus wait at the station without timetable coordination
    pub uncoordinated_wait: f64,
    /// Buffer plus a quarter of the mean metro peak headway
    pub coordinated_wait: f64,
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitPlan {
    pub allocations: Vec<RouteAllocation>,
    pub total_allocated: u32,
    pub leftover_buses: u32,
    /// Demand-weighted over served routes
    pub average_waiting: Option<f64>,
    /// Same average for today's fleet, when every route reports one
    pub current_average_waiting: Option<f64>,
    /// Reduction of the average wait against today's fleet, percent
    pub improvement_pct: Option<f64>,
    pub transfer_adjustments: Vec<TransferAdjustment>,
    pub transfer_reports: Vec<TransferReport>,
    pub violations: Vec<ConstraintViolation>,
}

impl TransitPlan {
    pub fn buses_for(&self, route_id: &str) -> Option<u32> {
        self.allocations
            .iter()
            .find(|allocation| allocation.route_id == route_id)
            .map(|allocation| allocation.buses)
    }
}
