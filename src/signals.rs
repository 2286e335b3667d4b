use metroflow_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::errors::{as_json, to_py_err};
use crate::model::PyRoadNetwork;

/// Green-time plan for one intersection
#[gen_stub_pyclass]
#[pyclass(name = "SignalPlan")]
pub struct PySignalPlan {
    pub(crate) inner: SignalPlan,
}

#[gen_stub_pymethods]
#[pymethods]
impl PySignalPlan {
    #[getter]
    fn intersection_id(&self) -> String {
        self.inner.intersection_id.clone()
    }

    /// ``(phase, green_seconds)`` in input order
    #[getter]
    fn greens(&self) -> Vec<(String, u32)> {
        self.inner
            .phases
            .iter()
            .map(|timing| (timing.phase.clone(), timing.green_seconds))
            .collect()
    }

    #[getter]
    fn cycle_length(&self) -> u32 {
        self.inner.cycle_length
    }

    #[getter]
    fn average_wait_seconds(&self) -> f64 {
        self.inner.average_wait_seconds
    }

    #[getter]
    fn improvement_pct(&self) -> f64 {
        self.inner.improvement_pct
    }

    #[getter]
    fn violations(&self) -> Vec<String> {
        self.inner
            .violations
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn as_json(&self) -> PyResult<String> {
        as_json(&self.inner, "signal plan")
    }

    fn __repr__(&self) -> String {
        format!(
            "SignalPlan({}, {} phases, cycle {}s)",
            self.inner.intersection_id,
            self.inner.phases.len(),
            self.inner.cycle_length
        )
    }
}

fn signal_options(
    max_cycle_length: u32,
    priority: &str,
    min_green_time: u32,
    max_green_time: Option<u32>,
) -> PyResult<SignalOptions> {
    let priority = priority
        .parse::<PriorityMode>()
        .map_err(|e| to_py_err("Invalid option", e))?;
    Ok(SignalOptions {
        max_cycle_length,
        priority,
        min_green_time,
        max_green_time,
    })
}

/// Split a signal cycle between phases in proportion to their flows
///
/// Parameters
/// ----------
/// intersection_id : str
/// flows : list[tuple[str, float]]
///     ``(phase, vehicles per hour)`` for each phase
/// max_cycle_length : int, default=120
///     The greens always sum to exactly this many seconds
/// priority : str, default="minimize_average_delay"
///     One of minimize_average_delay, prioritize_high_traffic, balance_wait_times
/// min_green_time : int, default=10
/// max_green_time : int, optional
///
/// Returns
/// -------
/// SignalPlan
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (
    intersection_id,
    flows,
    max_cycle_length = 120,
    priority = "minimize_average_delay",
    min_green_time = 10,
    max_green_time = None
))]
pub fn optimize_signals(
    intersection_id: &str,
    flows: Vec<(String, f64)>,
    max_cycle_length: u32,
    priority: &str,
    min_green_time: u32,
    max_green_time: Option<u32>,
) -> PyResult<PySignalPlan> {
    let options = signal_options(max_cycle_length, priority, min_green_time, max_green_time)?;
    let flows = flows
        .into_iter()
        .map(|(phase, flow)| PhaseFlow { phase, flow })
        .collect::<Vec<_>>();

    let plan = metroflow_core::signals::optimize_signals(
        &Intersection::new(intersection_id),
        &flows,
        &options,
        &Interrupt::none(),
    )
    .map_err(|e| to_py_err("Signal optimization failed", e))?;
    Ok(PySignalPlan { inner: plan })
}

/// Plan the signal at a network node from the traffic on its roads
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (
    network,
    node,
    time_window = "morning_peak",
    max_cycle_length = 120,
    priority = "minimize_average_delay",
    min_green_time = 10,
    max_green_time = None
))]
pub fn optimize_intersection(
    network: &PyRoadNetwork,
    node: &str,
    time_window: &str,
    max_cycle_length: u32,
    priority: &str,
    min_green_time: u32,
    max_green_time: Option<u32>,
) -> PyResult<PySignalPlan> {
    let options = signal_options(max_cycle_length, priority, min_green_time, max_green_time)?;
    let window = time_window
        .parse::<TimeWindow>()
        .map_err(|e| to_py_err("Invalid option", e))?;

    let plan = OptimizationEngine::new(&network.network)
        .optimize_intersection(node, window, &options)
        .map_err(|e| to_py_err("Signal optimization failed", e))?;
    Ok(PySignalPlan { inner: plan })
}
