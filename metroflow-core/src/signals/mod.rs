//! Traffic signal timing: greedy green-time allocation per intersection

mod greedy;
mod intersections;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::ConstraintViolation;
use crate::model::traffic::normalize;
use crate::{Error, Seconds};

pub use greedy::optimize_signals;
pub use intersections::{MIN_APPROACHES, approach_flows, optimize_network_signals};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Intersection {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
        }
    }
}

/// Vehicles per hour served by one signal phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseFlow {
    pub phase: String,
    pub flow: f64,
}

impl PhaseFlow {
    pub fn new(phase: &str, flow: f64) -> Self {
        Self {
            phase: phase.to_string(),
            flow,
        }
    }
}

/// Weighting applied to flows before proportional allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityMode {
    /// Weight by flow
    #[default]
    MinimizeAverageDelay,
    /// Weight by `flow^1.5`, favouring the busiest approaches
    PrioritizeHighTraffic,
    /// Weight by `√flow`, narrowing the spread between phases
    BalanceWaitTimes,
}

impl PriorityMode {
    pub fn weight(self, flow: f64) -> f64 {
        match self {
            PriorityMode::MinimizeAverageDelay => flow,
            PriorityMode::PrioritizeHighTraffic => flow.powf(1.5),
            PriorityMode::BalanceWaitTimes => flow.sqrt(),
        }
    }
}

impl FromStr for PriorityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "minimizeaveragedelay" | "delay" => Ok(PriorityMode::MinimizeAverageDelay),
            "prioritizehightraffic" | "prioritizehightrafficroads" | "hightraffic" => {
                Ok(PriorityMode::PrioritizeHighTraffic)
            }
            "balancewaittimes" | "balance" => Ok(PriorityMode::BalanceWaitTimes),
            _ => Err(Error::invalid(format!("unknown priority mode '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalOptions {
    /// The plan's greens always sum to exactly this
    pub max_cycle_length: Seconds,
    pub priority: PriorityMode,
    pub min_green_time: Seconds,
    pub max_green_time: Option<Seconds>,
}

impl Default for SignalOptions {
    fn default() -> Self {
        Self {
            max_cycle_length: 120,
            priority: PriorityMode::MinimizeAverageDelay,
            min_green_time: 10,
            max_green_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub phase: String,
    pub flow: f64,
    /// Share of the total weight
    pub weight: f64,
    pub green_seconds: Seconds,
    pub red_seconds: Seconds,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalPlan {
    pub intersection_id: String,
    pub phases: Vec<PhaseTiming>,
    pub cycle_length: Seconds,
    /// Flow-weighted uniform delay per vehicle
    pub average_wait_seconds: f64,
    /// Same delay model under an equal split of the cycle
    pub baseline_wait_seconds: f64,
    pub improvement_pct: f64,
    pub violations: Vec<ConstraintViolation>,
}

impl SignalPlan {
    pub fn green_for(&self, phase: &str) -> Option<Seconds> {
        self.phases
            .iter()
            .find(|timing| timing.phase == phase)
            .map(|timing| timing.green_seconds)
    }
}
