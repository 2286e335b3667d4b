use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Expected passenger wait as a function of the buses assigned to a route.
///
/// Zero buses, or an empty table, means an unserved route with infinite
/// waiting time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitingCurve {
    /// Evenly spaced buses on a loop: `round_trip / buses / 2`
    Headway { round_trip_minutes: f64 },
    /// Measured waits for 1, 2, … buses; buses beyond the table keep the
    /// last value
    Table(Vec<f64>),
}

impl WaitingCurve {
    pub fn waiting(&self, buses: u32) -> f64 {
        if buses == 0 {
            return f64::INFINITY;
        }
        match self {
            WaitingCurve::Headway { round_trip_minutes } => {
                round_trip_minutes / f64::from(buses) / 2.0
            }
            WaitingCurve::Table(waits) => waits
                .get(buses as usize - 1)
                .or(waits.last())
                .copied()
                .unwrap_or(f64::INFINITY),
        }
    }

    pub(crate) fn validate(&self, route: &str) -> Result<(), Error> {
        match self {
            WaitingCurve::Headway { round_trip_minutes } => {
                if !(round_trip_minutes.is_finite() && *round_trip_minutes > 0.0) {
                    return Err(Error::invalid(format!(
                        "route {route} has non-positive round trip time {round_trip_minutes}"
                    )));
                }
            }
            WaitingCurve::Table(waits) => {
                if waits.is_empty() {
                    return Err(Error::invalid(format!("route {route} has an empty waiting curve")));
                }
                if waits.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
                    return Err(Error::invalid(format!(
                        "route {route} has a non-positive waiting time in its curve"
                    )));
                }
                if waits.windows(2).any(|pair| pair[1] > pair[0]) {
                    return Err(Error::invalid(format!(
                        "waiting curve of route {route} increases with more buses"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BusRoute {
    pub id: String,
    pub name: String,
    pub daily_passengers: u64,
    pub stops: Vec<String>,
    pub curve: WaitingCurve,
    /// Fleet limit for this route
    pub max_buses: Option<u32>,
    /// Buses running today, when known
    pub current_buses: Option<u32>,
}

impl BusRoute {
    pub fn new(id: &str, daily_passengers: u64, curve: WaitingCurve) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            daily_passengers,
            stops: Vec::new(),
            curve,
            max_buses: None,
            current_buses: None,
        }
    }

    pub fn waiting(&self, buses: u32) -> f64 {
        self.curve.waiting(buses)
    }

    pub(crate) fn bus_limit(&self, available: u32) -> u32 {
        self.max_buses.map_or(available, |limit| limit.min(available))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetroLine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stations: Vec<String>,
    #[serde(default)]
    pub daily_passengers: Option<u64>,
    /// Minutes between trains at peak
    pub frequency_peak: f64,
    pub frequency_offpeak: f64,
}

/// Station shared by metro lines and bus routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferPoint {
    pub station: String,
    pub metro_lines: Vec<String>,
    pub bus_routes: Vec<String>,
}

/// Bus routes, metro lines and their interchanges.
///
/// Route order is significant: when two allocations are equally good, the
/// earlier route keeps its buses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitNetwork {
    pub bus_routes: Vec<BusRoute>,
    pub metro_lines: Vec<MetroLine>,
    pub transfer_points: Vec<TransferPoint>,
}

impl TransitNetwork {
    pub fn validate(&self) -> Result<(), Error> {
        let mut routes = HashSet::new();
        for route in &self.bus_routes {
            if route.id.is_empty() {
                return Err(Error::invalid("bus route with an empty id"));
            }
            if !routes.insert(route.id.as_str()) {
                return Err(Error::invalid(format!("duplicate bus route id '{}'", route.id)));
            }
            route.curve.validate(&route.id)?;
        }

        let mut lines: HashMap<&str, &MetroLine> = HashMap::new();
        for line in &self.metro_lines {
            if !(line.frequency_peak > 0.0 && line.frequency_offpeak > 0.0) {
                return Err(Error::invalid(format!(
                    "metro line {} has a non-positive frequency",
                    line.id
                )));
            }
            if lines.insert(line.id.as_str(), line).is_some() {
                return Err(Error::invalid(format!("duplicate metro line id '{}'", line.id)));
            }
        }

        for point in &self.transfer_points {
            if point.metro_lines.is_empty() || point.bus_routes.is_empty() {
                return Err(Error::invalid(format!(
                    "transfer point {} must connect at least one metro line and one bus route",
                    point.station
                )));
            }
            if let Some(line) = point.metro_lines.iter().find(|l| !lines.contains_key(l.as_str())) {
                return Err(Error::invalid(format!(
                    "transfer point {} references unknown metro line '{line}'",
                    point.station
                )));
            }
            if let Some(route) = point.bus_routes.iter().find(|r| !routes.contains(r.as_str())) {
                return Err(Error::invalid(format!(
                    "transfer point {} references unknown bus route '{route}'",
                    point.station
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn route_position(&self, id: &str) -> Option<usize> {
        self.bus_routes.iter().position(|route| route.id == id)
    }

    pub(crate) fn metro_line(&self, id: &str) -> Option<&MetroLine> {
        self.metro_lines.iter().find(|line| line.id == id)
    }
}
