use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use design::{PySpanningTreeResult, build_minimum_network};
use model::{PyRoadNetwork, py_create_road_network};
use routing::{
    PyRoute, compare_time_windows, find_emergency_route, find_shortest_path,
    nearest_hospital_route,
};
use signals::{PySignalPlan, optimize_intersection, optimize_signals};
use transit::{PyTransitNetwork, PyTransitPlan, allocate_buses, py_load_transit_network};

pub mod design;
mod errors;
pub mod model;
pub mod routing;
pub mod signals;
pub mod transit;

/// A Python module implemented in Rust.
#[pymodule]
fn metroflow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyRoadNetwork>()?;
    m.add_function(wrap_pyfunction!(py_create_road_network, m)?)?;

    m.add_class::<PyRoute>()?;
    m.add_function(wrap_pyfunction!(find_shortest_path, m)?)?;
    m.add_function(wrap_pyfunction!(compare_time_windows, m)?)?;
    m.add_function(wrap_pyfunction!(find_emergency_route, m)?)?;
    m.add_function(wrap_pyfunction!(nearest_hospital_route, m)?)?;

    m.add_class::<PySpanningTreeResult>()?;
    m.add_function(wrap_pyfunction!(build_minimum_network, m)?)?;

    m.add_class::<PyTransitNetwork>()?;
    m.add_class::<PyTransitPlan>()?;
    m.add_function(wrap_pyfunction!(py_load_transit_network, m)?)?;
    m.add_function(wrap_pyfunction!(allocate_buses, m)?)?;

    m.add_class::<PySignalPlan>()?;
    m.add_function(wrap_pyfunction!(optimize_signals, m)?)?;
    m.add_function(wrap_pyfunction!(optimize_intersection, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
