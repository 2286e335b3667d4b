use metroflow_core::Error;
use metroflow_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::errors::{as_json, to_py_err};
use crate::model::PyRoadNetwork;

/// Python wrapper for a computed route
#[gen_stub_pyclass]
#[pyclass(name = "Route")]
#[derive(Clone)]
pub struct PyRoute {
    pub(crate) inner: Route,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyRoute {
    /// Node ids from origin to destination
    #[getter]
    fn nodes(&self) -> Vec<String> {
        self.inner.nodes.clone()
    }

    #[getter]
    fn total_time_minutes(&self) -> f64 {
        self.inner.total_time_minutes
    }

    #[getter]
    fn total_distance_km(&self) -> f64 {
        self.inner.total_distance_km
    }

    /// Path cost under the cost mode the route was searched with
    #[getter]
    fn total_cost(&self) -> f64 {
        self.inner.total_cost
    }

    #[getter]
    fn time_window(&self) -> String {
        self.inner.time_window.to_string()
    }

    #[getter]
    fn nodes_expanded(&self) -> usize {
        self.inner.nodes_expanded
    }

    #[getter]
    fn average_condition(&self) -> Option<f64> {
        self.inner.average_condition()
    }

    #[getter]
    fn average_congestion(&self) -> Option<f64> {
        self.inner.average_congestion()
    }

    /// Average slowdown on a 1-10 scale
    #[getter]
    fn congestion_level(&self) -> u8 {
        self.inner.congestion_level()
    }

    /// Grams of CO2, NOx and PM emitted along the route
    ///
    /// Parameters
    /// ----------
    /// car, bus, truck : float
    ///     Share of each vehicle class in the traffic
    ///
    /// Returns
    /// -------
    /// tuple[float, float, float]
    ///     ``(co2, nox, pm)`` totals
    #[pyo3(signature = (car = 0.8, bus = 0.1, truck = 0.1))]
    fn emissions(&self, car: f64, bus: f64, truck: f64) -> PyResult<(f64, f64, f64)> {
        let report = self
            .inner
            .emissions(&VehicleMix { car, bus, truck })
            .map_err(|e| to_py_err("Emission estimate failed", e))?;
        Ok((report.total.co2, report.total.nox, report.total.pm))
    }

    /// Export the route with every segment as a JSON string
    fn as_json(&self) -> PyResult<String> {
        as_json(&self.inner, "route")
    }

    fn __repr__(&self) -> String {
        format!(
            "Route({} -> {}, {} segments, {:.1} min, {:.2} km)",
            self.inner.origin,
            self.inner.destination,
            self.inner.segments.len(),
            self.inner.total_time_minutes,
            self.inner.total_distance_km
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

fn parse<T>(value: &str) -> PyResult<T>
where
    T: std::str::FromStr<Err = Error>,
{
    value.parse().map_err(|e| to_py_err("Invalid option", e))
}

fn condition(rating: u8) -> PyResult<Condition> {
    Condition::new(rating).map_err(|e| to_py_err("Invalid option", e))
}

fn route_query(
    time_window: &str,
    cost_mode: &str,
    vehicle: &str,
    min_condition: u8,
    include_potential_roads: bool,
) -> PyResult<RouteQuery> {
    Ok(RouteQuery {
        time_window: parse(time_window)?,
        cost_mode: parse(cost_mode)?,
        vehicle: parse(vehicle)?,
        min_condition: condition(min_condition)?,
        include_potential_roads,
    })
}

fn emergency_query(time_window: &str, min_condition: u8) -> PyResult<EmergencyQuery> {
    Ok(EmergencyQuery {
        time_window: parse(time_window)?,
        min_condition: condition(min_condition)?,
        ..EmergencyQuery::default()
    })
}

/// Find the cheapest route between two nodes
///
/// Parameters
/// ----------
/// network : RoadNetwork
/// origin : str
///     Origin node id
/// destination : str
///     Destination node id
/// time_window : str, default="morning_peak"
///     One of morning_peak, afternoon, evening_peak, night
/// cost_mode : str, default="time"
///     One of distance, time, blended
/// vehicle : str, default="car"
///     One of car, bus, emergency
/// min_condition : int, default=1
///     Roads rated below this are never used
/// include_potential_roads : bool, default=False
///     Route over construction candidates as if they were built
///
/// Returns
/// -------
/// Route
///
/// Raises
/// ------
/// ValueError
///     If a node id or an option is unknown
/// LookupError
///     If no route satisfies the query
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (
    network,
    origin,
    destination,
    time_window = "morning_peak",
    cost_mode = "time",
    vehicle = "car",
    min_condition = 1,
    include_potential_roads = false
))]
#[allow(clippy::too_many_arguments)]
pub fn find_shortest_path(
    network: &PyRoadNetwork,
    origin: &str,
    destination: &str,
    time_window: &str,
    cost_mode: &str,
    vehicle: &str,
    min_condition: u8,
    include_potential_roads: bool,
) -> PyResult<PyRoute> {
    let query = route_query(
        time_window,
        cost_mode,
        vehicle,
        min_condition,
        include_potential_roads,
    )?;
    let route = OptimizationEngine::new(&network.network)
        .shortest_path(origin, destination, &query)
        .map_err(|e| to_py_err("Route calculation failed", e))?;
    Ok(PyRoute { inner: route })
}

/// Run the same query in every time window
///
/// Returns a list of ``(time_window, route)`` pairs in chronological order;
/// ``route`` is ``None`` when no path exists in that window.
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (network, origin, destination, cost_mode = "time", vehicle = "car"))]
pub fn compare_time_windows(
    py: Python<'_>,
    network: &PyRoadNetwork,
    origin: &str,
    destination: &str,
    cost_mode: &str,
    vehicle: &str,
) -> PyResult<Vec<(String, Option<PyRoute>)>> {
    let query = route_query("morning_peak", cost_mode, vehicle, 1, false)?;
    let results = py.detach(|| {
        OptimizationEngine::new(&network.network).compare_time_windows(origin, destination, &query)
    });

    results
        .into_iter()
        .map(|(window, result)| match result {
            Ok(route) => Ok((window.to_string(), Some(PyRoute { inner: route }))),
            Err(Error::NotFound { .. }) => Ok((window.to_string(), None)),
            Err(e) => Err(to_py_err("Time window comparison failed", e)),
        })
        .collect()
}

/// Emergency route between two nodes, searched with A*
///
/// Parameters
/// ----------
/// network : RoadNetwork
/// origin : str
/// destination : str
/// time_window : str, default="morning_peak"
/// min_condition : int, default=1
///     Roads rated below this are excluded from the search
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (network, origin, destination, time_window = "morning_peak", min_condition = 1))]
pub fn find_emergency_route(
    network: &PyRoadNetwork,
    origin: &str,
    destination: &str,
    time_window: &str,
    min_condition: u8,
) -> PyResult<PyRoute> {
    let query = emergency_query(time_window, min_condition)?;
    let route = OptimizationEngine::new(&network.network)
        .emergency_route(origin, destination, &query)
        .map_err(|e| to_py_err("Emergency routing failed", e))?;
    Ok(PyRoute { inner: route })
}

/// Emergency route from a node to whichever hospital is cheapest to reach
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (network, origin, time_window = "morning_peak", min_condition = 1))]
pub fn nearest_hospital_route(
    network: &PyRoadNetwork,
    origin: &str,
    time_window: &str,
    min_condition: u8,
) -> PyResult<PyRoute> {
    let query = emergency_query(time_window, min_condition)?;
    let route = OptimizationEngine::new(&network.network)
        .nearest_facility(origin, FacilityKind::Hospital, &query)
        .map_err(|e| to_py_err("Emergency routing failed", e))?;
    Ok(PyRoute { inner: route })
}
