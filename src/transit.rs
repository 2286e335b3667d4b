use std::path::Path;

use metroflow_core::Interrupt;
use metroflow_core::loading::load_transit_network;
use metroflow_core::transit::{self, TransitNetwork, TransitOptions, TransitPlan};
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::errors::{as_json, to_py_err};

/// Bus routes, metro lines and the stations where they meet
#[gen_stub_pyclass]
#[pyclass(name = "TransitNetwork")]
pub struct PyTransitNetwork {
    pub(crate) network: TransitNetwork,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyTransitNetwork {
    pub fn bus_route_ids(&self) -> Vec<String> {
        self.network
            .bus_routes
            .iter()
            .map(|route| route.id.clone())
            .collect()
    }

    pub fn metro_line_ids(&self) -> Vec<String> {
        self.network
            .metro_lines
            .iter()
            .map(|line| line.id.clone())
            .collect()
    }

    /// Average wait on a route served by the given number of buses
    pub fn waiting_time(&self, route_id: &str, buses: u32) -> Option<f64> {
        self.network
            .bus_routes
            .iter()
            .find(|route| route.id == route_id)
            .map(|route| route.waiting(buses))
    }

    fn __repr__(&self) -> String {
        format!(
            "TransitNetwork with {} bus routes, {} metro lines and {} transfer points",
            self.network.bus_routes.len(),
            self.network.metro_lines.len(),
            self.network.transfer_points.len()
        )
    }
}

/// Load a transit network from a JSON file
///
/// The file holds ``bus_routes``, ``metro_lines`` and ``transfer_points``
/// arrays. A bus route gives either a ``waiting_curve`` table, a
/// ``round_trip_minutes`` headway model or just its ``stops``.
#[gen_stub_pyfunction]
#[pyfunction(name = "load_transit_network")]
pub fn py_load_transit_network(path: &str) -> PyResult<PyTransitNetwork> {
    let network = load_transit_network(Path::new(path))
        .map_err(|e| to_py_err("Failed to load transit network", e))?;
    Ok(PyTransitNetwork { network })
}

/// Bus allocation produced by `allocate_buses`
#[gen_stub_pyclass]
#[pyclass(name = "TransitPlan")]
pub struct PyTransitPlan {
    pub(crate) inner: TransitPlan,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyTransitPlan {
    /// Buses per route id
    #[getter]
    fn allocations(&self) -> Vec<(String, u32)> {
        self.inner
            .allocations
            .iter()
            .map(|allocation| (allocation.route_id.clone(), allocation.buses))
            .collect()
    }

    #[getter]
    fn total_allocated(&self) -> u32 {
        self.inner.total_allocated
    }

    #[getter]
    fn average_waiting(&self) -> Option<f64> {
        self.inner.average_waiting
    }

    /// Reduction of the average wait against the routes' current fleet, if
    /// every route reports ``current_buses``
    #[getter]
    fn improvement_pct(&self) -> Option<f64> {
        self.inner.improvement_pct
    }

    /// Human-readable constraint violations
    #[getter]
    fn violations(&self) -> Vec<String> {
        self.inner
            .violations
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn buses_for(&self, route_id: &str) -> Option<u32> {
        self.inner.buses_for(route_id)
    }

    fn as_json(&self) -> PyResult<String> {
        as_json(&self.inner, "transit plan")
    }

    fn __repr__(&self) -> String {
        format!(
            "TransitPlan({} routes, {} buses, {} violations)",
            self.inner.allocations.len(),
            self.inner.total_allocated,
            self.inner.violations.len()
        )
    }
}

/// Distribute a bus fleet over routes to minimise waiting
///
/// Parameters
/// ----------
/// transit : TransitNetwork
/// total_buses : int, default=50
///     Fleet size, never exceeded
/// max_waiting_time : float, default=15.0
///     Acceptable average wait per route, in minutes
/// optimize_transfers : bool, default=True
///     Move buses towards routes serving metro transfer stations
/// max_transfer_moves : int, default=3
///
/// Returns
/// -------
/// TransitPlan
///     Routes that cannot meet the bound are reported as violations rather
///     than raised.
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (
    transit,
    total_buses = 50,
    max_waiting_time = 15.0,
    optimize_transfers = true,
    max_transfer_moves = 3
))]
pub fn allocate_buses(
    transit: &PyTransitNetwork,
    total_buses: u32,
    max_waiting_time: f64,
    optimize_transfers: bool,
    max_transfer_moves: u32,
) -> PyResult<PyTransitPlan> {
    let options = TransitOptions {
        total_buses,
        max_waiting_time,
        optimize_transfers,
        max_transfer_moves,
    };
    let plan = transit::allocate_buses(&transit.network, &options, &Interrupt::none())
        .map_err(|e| to_py_err("Bus allocation failed", e))?;
    Ok(PyTransitPlan { inner: plan })
}
