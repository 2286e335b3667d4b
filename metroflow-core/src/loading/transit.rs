use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::de::deserialize_id;
use crate::Error;
use crate::transit::{BusRoute, MetroLine, TransferPoint, TransitNetwork, WaitingCurve};

/// Round-trip minutes contributed by each stop when a route gives neither a
/// round trip time nor a waiting curve
pub const MINUTES_PER_STOP: f64 = 17.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusRouteRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "route")]
    pub name: String,
    pub daily_passengers: u64,
    #[serde(default)]
    pub stops: Vec<String>,
    #[serde(default)]
    pub round_trip_minutes: Option<f64>,
    /// Waits for 1, 2, … buses
    #[serde(default)]
    pub waiting_curve: Option<Vec<f64>>,
    #[serde(default)]
    pub max_buses: Option<u32>,
    /// Buses running today; the plan reports its change against this
    #[serde(default)]
    pub current_buses: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitRecords {
    pub bus_routes: Vec<BusRouteRecord>,
    #[serde(default)]
    pub metro_lines: Vec<MetroLine>,
    #[serde(default)]
    pub transfer_points: Vec<TransferPoint>,
}

impl BusRouteRecord {
    fn curve(&self) -> Result<WaitingCurve, Error> {
        match (&self.waiting_curve, self.round_trip_minutes) {
            (Some(_), Some(_)) => Err(Error::invalid(format!(
                "route {} gives both a waiting curve and a round trip time",
                self.id
            ))),
            (Some(waits), None) => Ok(WaitingCurve::Table(waits.clone())),
            (None, Some(minutes)) => Ok(WaitingCurve::Headway {
                round_trip_minutes: minutes,
            }),
            (None, None) if !self.stops.is_empty() => Ok(WaitingCurve::Headway {
                round_trip_minutes: self.stops.len() as f64 * MINUTES_PER_STOP,
            }),
            (None, None) => Err(Error::invalid(format!(
                "route {} needs stops, a round trip time or a waiting curve",
                self.id
            ))),
        }
    }
}

impl TransitRecords {
    /// Converts and validates the records
    pub fn into_network(self) -> Result<TransitNetwork, Error> {
        let bus_routes = self
            .bus_routes
            .into_iter()
            .map(|record| {
                let curve = record.curve()?;
                Ok(BusRoute {
                    name: if record.name.is_empty() {
                        record.id.clone()
                    } else {
                        record.name
                    },
                    id: record.id,
                    daily_passengers: record.daily_passengers,
                    stops: record.stops,
                    curve,
                    max_buses: record.max_buses,
                    current_buses: record.current_buses,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let network = TransitNetwork {
            bus_routes,
            metro_lines: self.metro_lines,
            transfer_points: self.transfer_points,
        };
        network.validate()?;
        Ok(network)
    }
}

/// Loads bus routes, metro lines and transfer points from a JSON document
pub fn load_transit_network(path: &Path) -> Result<TransitNetwork, Error> {
    info!("Loading transit network: {}", path.display());
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let records: TransitRecords = serde_json::from_reader(BufReader::new(file))?;
    let network = records.into_network()?;
    info!(
        "Transit network loaded: {} bus routes, {} metro lines, {} transfer points",
        network.bus_routes.len(),
        network.metro_lines.len(),
        network.transfer_points.len()
    );
    Ok(network)
}
