use metroflow_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::errors::{as_json, to_py_err};
use crate::model::PyRoadNetwork;

/// Minimum spanning forest chosen by `build_minimum_network`
#[gen_stub_pyclass]
#[pyclass(name = "SpanningTreeResult")]
pub struct PySpanningTreeResult {
    pub(crate) inner: SpanningTreeResult,
}

#[gen_stub_pymethods]
#[pymethods]
impl PySpanningTreeResult {
    /// Selected roads as ``(from, to)`` pairs, in selection order
    #[getter]
    fn roads(&self) -> Vec<(String, String)> {
        self.inner
            .selected
            .iter()
            .map(|road| (road.from.clone(), road.to.clone()))
            .collect()
    }

    #[getter]
    fn total_adjusted_cost(&self) -> f64 {
        self.inner.total_adjusted_cost
    }

    #[getter]
    fn total_base_cost(&self) -> f64 {
        self.inner.total_base_cost
    }

    #[getter]
    fn new_roads(&self) -> usize {
        self.inner.new_roads
    }

    #[getter]
    fn existing_roads(&self) -> usize {
        self.inner.existing_roads
    }

    #[getter]
    fn unreachable_nodes(&self) -> Vec<String> {
        self.inner.unreachable_nodes.clone()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn as_json(&self) -> PyResult<String> {
        as_json(&self.inner, "spanning tree")
    }

    fn __repr__(&self) -> String {
        format!(
            "SpanningTreeResult({} roads, {} new, {} components, cost {:.1})",
            self.inner.selected.len(),
            self.inner.new_roads,
            self.inner.components,
            self.inner.total_adjusted_cost
        )
    }
}

/// Cheapest road set connecting the network, with priority discounts
///
/// Parameters
/// ----------
/// network : RoadNetwork
/// include_new_roads : bool, default=True
///     Consider construction candidates alongside existing roads
/// hospital_priority : bool, default=True
///     Discount roads touching a hospital
/// population_priority : bool, default=True
///     Discount roads touching populous neighborhoods
/// require_connected : bool, default=False
///     Raise instead of returning a spanning forest
///
/// Returns
/// -------
/// SpanningTreeResult
///
/// Raises
/// ------
/// RuntimeError
///     If ``require_connected`` is set and some node stays unreachable
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (
    network,
    include_new_roads = true,
    hospital_priority = true,
    population_priority = true,
    require_connected = false
))]
pub fn build_minimum_network(
    py: Python<'_>,
    network: &PyRoadNetwork,
    include_new_roads: bool,
    hospital_priority: bool,
    population_priority: bool,
    require_connected: bool,
) -> PyResult<PySpanningTreeResult> {
    let options = DesignOptions {
        include_new_roads,
        hospital_priority,
        population_priority,
    };

    let result = py.detach(|| {
        let result = OptimizationEngine::new(&network.network).minimum_network(&options)?;
        if require_connected {
            result.require_connected()
        } else {
            Ok(result)
        }
    });

    result
        .map(|inner| PySpanningTreeResult { inner })
        .map_err(|e| to_py_err("Network design failed", e))
}
