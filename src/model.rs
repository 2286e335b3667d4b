use std::path::PathBuf;

use geo::Point;
use metroflow_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::errors::to_py_err;

/// RoadNetwork
///
/// Immutable snapshot of the metropolitan road network: neighborhoods,
/// facilities, existing roads, optional construction candidates and the
/// per-time-window congestion of every road.
///
/// Every optimisation function takes a network as its first argument; the
/// network itself is never modified, so one instance can be shared freely.
///
/// Example:
///
/// .. code-block:: python
///
///     network = create_road_network("neighborhoods.csv", "facilities.csv", "roads.csv")
///     route = find_shortest_path(network, "1", "F9", time_window="evening_peak")
#[gen_stub_pyclass]
#[pyclass(name = "RoadNetwork")]
pub struct PyRoadNetwork {
    pub(crate) network: RoadNetwork,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyRoadNetwork {
    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    pub fn road_count(&self) -> usize {
        self.network.road_count()
    }

    /// Ids of all nodes, neighborhoods first
    pub fn node_ids(&self) -> Vec<String> {
        self.network.nodes().map(|(_, node)| node.id.clone()).collect()
    }

    /// Id of the node closest to the given coordinates
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<String> {
        self.network
            .nearest_node(&Point::new(lon, lat))
            .map(|index| self.network.node(index).id.clone())
    }

    /// A copy of the network slowed down by weather
    ///
    /// Parameters
    /// ----------
    /// speed_reduction : float
    ///     Fraction of speed lost on every road, in ``[0, 1)``
    pub fn with_weather(&self, speed_reduction: f64) -> PyResult<PyRoadNetwork> {
        let network = self
            .network
            .with_weather(WeatherImpact { speed_reduction })
            .map_err(|e| to_py_err("Failed to apply weather", e))?;
        Ok(PyRoadNetwork { network })
    }

    fn __repr__(&self) -> String {
        format!(
            "RoadNetwork with {} nodes and {} roads",
            self.network.node_count(),
            self.network.road_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Create a road network from record files
///
/// Record files may be CSV or JSON (an array of records). Every record is
/// validated; a malformed or inconsistent record aborts the load.
///
/// Parameters
/// ----------
/// neighborhoods_path : str
///     Neighborhood records: id, name, population, lat, lon
/// facilities_path : str
///     Facility records: id, name, type, lat, lon
/// roads_path : str
///     Existing roads: from, to, distance, capacity, condition (1-5), one_way
/// potential_roads_path : str, optional
///     Construction candidates: from, to, distance, capacity, cost
/// traffic_path : str, optional
///     Traffic per road and time window: from, to, window, flow or multiplier
/// include_potential_roads : bool, default=False
///     Add construction candidates to the graph as non-existing roads
///
/// Returns
/// -------
/// RoadNetwork
///
/// Raises
/// ------
/// ValueError
///     If a record is invalid (unknown node, non-positive distance, ...)
/// RuntimeError
///     If a file cannot be read or parsed
#[gen_stub_pyfunction]
#[pyfunction(name = "create_road_network")]
#[pyo3(signature = (
    neighborhoods_path,
    facilities_path,
    roads_path,
    potential_roads_path = None,
    traffic_path = None,
    include_potential_roads = false
))]
pub fn py_create_road_network(
    neighborhoods_path: &str,
    facilities_path: &str,
    roads_path: &str,
    potential_roads_path: Option<&str>,
    traffic_path: Option<&str>,
    include_potential_roads: bool,
) -> PyResult<PyRoadNetwork> {
    let config = NetworkConfig {
        neighborhoods_path: PathBuf::from(neighborhoods_path),
        facilities_path: PathBuf::from(facilities_path),
        roads_path: PathBuf::from(roads_path),
        potential_roads_path: potential_roads_path.map(PathBuf::from),
        traffic_path: traffic_path.map(PathBuf::from),
        include_potential_roads,
    };

    let network = create_road_network(&config)
        .map_err(|e| to_py_err("Failed to create road network", e))?;
    Ok(PyRoadNetwork { network })
}
