//! Time windows, cost modes and the speed model shared by every search

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, MIN_CONGESTION_FACTOR};

/// Free-flow speed of a condition-5 road, km/h
pub const BASE_SPEED_KMH: f64 = 60.0;
/// Upper bound on the emergency speed bonus
pub const MAX_EMERGENCY_SPEED_FACTOR: f64 = 1.5;

/// One of the four traffic periods of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    MorningPeak,
    Afternoon,
    EveningPeak,
    Night,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::MorningPeak,
        TimeWindow::Afternoon,
        TimeWindow::EveningPeak,
        TimeWindow::Night,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            TimeWindow::MorningPeak => 0,
            TimeWindow::Afternoon => 1,
            TimeWindow::EveningPeak => 2,
            TimeWindow::Night => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::MorningPeak => "morning_peak",
            TimeWindow::Afternoon => "afternoon",
            TimeWindow::EveningPeak => "evening_peak",
            TimeWindow::Night => "night",
        }
    }

    /// Ratio of outbound to inbound flow at an intersection during this window
    pub fn outbound_ratio(self) -> f64 {
        match self {
            TimeWindow::MorningPeak => 0.6,
            TimeWindow::EveningPeak => 1.2,
            TimeWindow::Afternoon | TimeWindow::Night => 0.9,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "morningpeak" => Ok(TimeWindow::MorningPeak),
            "afternoon" => Ok(TimeWindow::Afternoon),
            "eveningpeak" => Ok(TimeWindow::EveningPeak),
            "night" => Ok(TimeWindow::Night),
            _ => Err(Error::invalid(format!("unknown time window '{s}'"))),
        }
    }
}

/// What a search minimises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    /// Kilometres
    Distance,
    /// Minutes under the query's time window
    #[default]
    Time,
    /// Equal-weight sum of minutes and kilometres
    Blended,
}

impl CostMode {
    pub(crate) fn combine(self, distance_km: f64, minutes: f64) -> f64 {
        match self {
            CostMode::Distance => distance_km,
            CostMode::Time => minutes,
            CostMode::Blended => 0.5 * minutes + 0.5 * distance_km,
        }
    }
}

impl FromStr for CostMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "distance" => Ok(CostMode::Distance),
            "time" => Ok(CostMode::Time),
            "blended" | "balanced" => Ok(CostMode::Blended),
            _ => Err(Error::invalid(format!("unknown cost mode '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    #[default]
    Car,
    Bus,
    Emergency,
}

impl VehicleType {
    /// Speed multiplier on a road of the given condition (1–5)
    pub fn speed_factor(self, condition: u8) -> f64 {
        match self {
            VehicleType::Car => 1.0,
            VehicleType::Bus => 0.85,
            VehicleType::Emergency => {
                (1.0 + 0.1 * f64::from(condition)).min(MAX_EMERGENCY_SPEED_FACTOR)
            }
        }
    }

    /// Largest value `speed_factor` can return
    pub fn max_speed_factor(self) -> f64 {
        match self {
            VehicleType::Car => 1.0,
            VehicleType::Bus => 0.85,
            VehicleType::Emergency => MAX_EMERGENCY_SPEED_FACTOR,
        }
    }

    /// Congestion factor as experienced by this vehicle. Emergency vehicles
    /// recover half of the speed lost to traffic.
    pub fn effective_congestion(self, factor: f64) -> f64 {
        let factor = factor.clamp(MIN_CONGESTION_FACTOR, 1.0);
        match self {
            VehicleType::Car | VehicleType::Bus => factor,
            VehicleType::Emergency => 1.0 - (1.0 - factor) / 2.0,
        }
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "car" | "private" => Ok(VehicleType::Car),
            "bus" => Ok(VehicleType::Bus),
            "emergency" | "ambulance" => Ok(VehicleType::Emergency),
            _ => Err(Error::invalid(format!("unknown vehicle type '{s}'"))),
        }
    }
}

/// Free-flow speed of a road in km/h given its condition rating
pub fn free_flow_speed(condition: u8) -> f64 {
    BASE_SPEED_KMH * (0.5 + 0.1 * f64::from(condition))
}

/// BPR volume-delay relation turned into a speed factor in `(0, 1]`
pub fn bpr_congestion(flow: f64, capacity: f64) -> f64 {
    let ratio = flow / capacity;
    (1.0 / (1.0 + 0.15 * ratio.powi(4))).max(MIN_CONGESTION_FACTOR)
}

/// Weather effect on the road network, consumed as an edge-weight modifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherImpact {
    /// Fraction of speed lost, `0.0..1.0`
    pub speed_reduction: f64,
}

pub(crate) fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
