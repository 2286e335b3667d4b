use serde::{Deserialize, Serialize};

use super::Route;
use crate::Error;
use crate::model::RoadId;

/// Speed assumed for a segment whose travel time is unknown, km/h
pub const DEFAULT_SEGMENT_SPEED: f64 = 50.0;

/// Emission factors in g/km, indexed `[vehicle][speed band]` with vehicles
/// car, bus, truck and bands below 40, below 70 and from 70 km/h
const CO2: [[f64; 3]; 3] = [
    [180.0, 150.0, 170.0],
    [650.0, 550.0, 600.0],
    [800.0, 700.0, 750.0],
];
const NOX: [[f64; 3]; 3] = [[0.4, 0.3, 0.35], [6.0, 5.0, 5.5], [7.0, 6.0, 6.5]];
const PM: [[f64; 3]; 3] = [[0.03, 0.02, 0.025], [0.2, 0.15, 0.18], [0.25, 0.2, 0.22]];

fn speed_band(speed_kmh: f64) -> usize {
    if speed_kmh < 40.0 {
        0
    } else if speed_kmh < 70.0 {
        1
    } else {
        2
    }
}

/// Share of each vehicle class in the traffic on a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleMix {
    pub car: f64,
    pub bus: f64,
    pub truck: f64,
}

impl Default for VehicleMix {
    fn default() -> Self {
        Self {
            car: 0.8,
            bus: 0.1,
            truck: 0.1,
        }
    }
}

impl VehicleMix {
    fn validate(&self) -> Result<(), Error> {
        if [self.car, self.bus, self.truck]
            .iter()
            .any(|share| !(share.is_finite() && *share >= 0.0))
        {
            return Err(Error::invalid(format!(
                "vehicle mix shares must be non-negative, got {self:?}"
            )));
        }
        Ok(())
    }

    fn shares(&self) -> [f64; 3] {
        [self.car, self.bus, self.truck]
    }
}

/// Grams emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Emissions {
    pub co2: f64,
    pub nox: f64,
    pub pm: f64,
}

impl Emissions {
    fn over(distance_km: f64, speed_kmh: f64, mix: &VehicleMix) -> Self {
        let band = speed_band(speed_kmh);
        let emitted = |factors: &[[f64; 3]; 3]| -> f64 {
            mix.shares()
                .iter()
                .zip(factors)
                .map(|(share, by_band)| by_band[band] * distance_km * share)
                .sum()
        };
        Self {
            co2: emitted(&CO2),
            nox: emitted(&NOX),
            pm: emitted(&PM),
        }
    }

    fn add(self, other: Emissions) -> Self {
        Self {
            co2: self.co2 + other.co2,
            nox: self.nox + other.nox,
            pm: self.pm + other.pm,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentEmissions {
    pub road: RoadId,
    pub distance_km: f64,
    pub speed_kmh: f64,
    pub emissions: Emissions,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteEmissions {
    pub segments: Vec<SegmentEmissions>,
    pub total: Emissions,
}

impl Route {
    /// Pollutants emitted by `mix` traffic along the route.
    ///
    /// Each segment is driven at its average speed in the route's time
    /// window; factors depend on the speed band.
    pub fn emissions(&self, mix: &VehicleMix) -> Result<RouteEmissions, Error> {
        mix.validate()?;
        let segments: Vec<SegmentEmissions> = self
            .segments
            .iter()
            .map(|segment| {
                let speed_kmh = if segment.time_minutes > 0.0 {
                    segment.distance_km / (segment.time_minutes / 60.0)
                } else {
                    DEFAULT_SEGMENT_SPEED
                };
                SegmentEmissions {
                    road: segment.road,
                    distance_km: segment.distance_km,
                    speed_kmh,
                    emissions: Emissions::over(segment.distance_km, speed_kmh, mix),
                }
            })
            .collect();
        let total = segments
            .iter()
            .fold(Emissions::default(), |total, s| total.add(s.emissions));
        Ok(RouteEmissions { segments, total })
    }
}
