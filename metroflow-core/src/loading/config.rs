use std::path::PathBuf;

use serde::Deserialize;

/// Locations of the record files a road network is assembled from
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub neighborhoods_path: PathBuf,
    pub facilities_path: PathBuf,
    pub roads_path: PathBuf,
    #[serde(default)]
    pub potential_roads_path: Option<PathBuf>,
    #[serde(default)]
    pub traffic_path: Option<PathBuf>,
    /// Add potential roads to the graph as non-existing edges
    #[serde(default)]
    pub include_potential_roads: bool,
}

impl NetworkConfig {
    pub(crate) fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.neighborhoods_path, &self.facilities_path, &self.roads_path]
            .into_iter()
            .chain(self.potential_roads_path.iter())
            .chain(self.traffic_path.iter())
    }
}
