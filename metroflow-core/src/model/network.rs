//! Weighted, time-varying road network

use geo::{Distance, Haversine, Point};
use hashbrown::HashMap;
use log::debug;
use petgraph::Direction as EdgeDirection;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{Direction, FacilityKind, Node, Road, RoadId};
use super::traffic::{CostMode, TimeWindow, VehicleType, WeatherImpact, free_flow_speed};
use crate::{Error, MIN_CONGESTION_FACTOR};

pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Immutable snapshot of the road network.
///
/// Nodes live in a `petgraph` arena and are addressed by dense [`NodeIndex`]
/// values; each graph edge carries the [`RoadId`] of the road it traverses.
/// A two-way road produces one graph edge per direction, a one-way road only
/// the forward one. There is no mutation path after construction.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    graph: DiGraph<Node, RoadId>,
    roads: Vec<Road>,
    ids: HashMap<String, NodeIndex>,
    /// Congestion factor per road and time window
    congestion: Vec<[f64; 4]>,
    /// Observed vehicle flow per road and time window, when known
    flows: Vec<Option<[f64; 4]>>,
    rtree: RTree<IndexedPoint>,
    /// Lower bound on `road distance / straight-line distance` over all roads
    detour_floor: f64,
}

impl RoadNetwork {
    /// Assembles a network from already validated parts.
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        mut roads: Vec<Road>,
        congestion: Vec<[f64; 4]>,
        flows: Vec<Option<[f64; 4]>>,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), roads.len() * 2);
        let mut ids = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let id = node.id.clone();
            let index = graph.add_node(node);
            ids.insert(id, index);
        }

        for (position, road) in roads.iter_mut().enumerate() {
            road.id = RoadId(position);
            graph.add_edge(road.from, road.to, road.id);
            if road.direction == Direction::TwoWay {
                graph.add_edge(road.to, road.from, road.id);
            }
        }

        let rtree = RTree::bulk_load(
            graph
                .node_indices()
                .map(|index| {
                    let location = graph[index].location;
                    IndexedPoint::new([location.x(), location.y()], index)
                })
                .collect(),
        );

        let detour_floor = roads
            .iter()
            .filter_map(|road| {
                let straight = straight_line_km(graph[road.from].location, graph[road.to].location);
                (straight > 1e-9).then(|| road.distance / straight)
            })
            .fold(1.0_f64, f64::min);

        debug!(
            "Road network assembled: {} nodes, {} roads, detour floor {detour_floor:.4}",
            graph.node_count(),
            roads.len()
        );

        Self {
            graph,
            roads,
            ids,
            congestion,
            flows,
            rtree,
            detour_floor,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.0]
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Resolves an external node id
    pub fn node_index(&self, id: &str) -> Result<NodeIndex, Error> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    /// Traversable neighbours of `node` together with the road leading there.
    /// One-way roads only appear from their origin.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, &Road)> + '_ {
        self.graph
            .edges(node)
            .map(move |edge| (edge.target(), &self.roads[edge.weight().0]))
    }

    /// Road traversable from `from` to `to`, if any
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&Road> {
        self.graph
            .find_edge(from, to)
            .map(|edge| &self.roads[self.graph[edge].0])
    }

    /// Every road touching `node`, regardless of direction, in id order
    pub fn incident_roads(&self, node: NodeIndex) -> Vec<&Road> {
        let mut ids: Vec<RoadId> = self
            .graph
            .edges_directed(node, EdgeDirection::Outgoing)
            .chain(self.graph.edges_directed(node, EdgeDirection::Incoming))
            .map(|edge| *edge.weight())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|id| self.road(id)).collect()
    }

    /// Facilities of the given subtype
    pub fn facilities(&self, kind: FacilityKind) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&index| self.graph[index].is_facility(kind))
    }

    /// Nearest node to an arbitrary location (x = longitude, y = latitude)
    pub fn nearest_node(&self, location: &Point<f64>) -> Option<NodeIndex> {
        self.rtree
            .nearest_neighbor(&[location.x(), location.y()])
            .map(|point| point.data)
    }

    pub fn congestion_factor(&self, road: RoadId, window: TimeWindow) -> f64 {
        self.congestion[road.0][window.index()]
    }

    pub fn traffic_flow(&self, road: RoadId, window: TimeWindow) -> Option<f64> {
        self.flows[road.0].map(|flows| flows[window.index()])
    }

    /// Uncongested traversal time in minutes
    pub fn base_time(&self, road: RoadId) -> f64 {
        let road = self.road(road);
        road.distance / free_flow_speed(road.condition.rating()) * 60.0
    }

    /// Traversal time in minutes: `base_time / congestion_factor`
    pub fn travel_time(&self, road: RoadId, window: TimeWindow) -> f64 {
        self.base_time(road) / self.congestion_factor(road, window)
    }

    /// Edge weight for a private car
    pub fn weight(&self, road: RoadId, window: TimeWindow, mode: CostMode) -> f64 {
        self.vehicle_weight(road, window, mode, VehicleType::Car)
    }

    /// Edge weight with the vehicle's speed and congestion adjustments applied
    pub fn vehicle_weight(
        &self,
        road: RoadId,
        window: TimeWindow,
        mode: CostMode,
        vehicle: VehicleType,
    ) -> f64 {
        let distance = self.road(road).distance;
        mode.combine(distance, self.vehicle_time(road, window, vehicle))
    }

    /// Traversal time in minutes for the given vehicle
    pub fn vehicle_time(&self, road: RoadId, window: TimeWindow, vehicle: VehicleType) -> f64 {
        let condition = self.road(road).condition.rating();
        let congestion = vehicle.effective_congestion(self.congestion_factor(road, window));
        self.base_time(road) / (vehicle.speed_factor(condition) * congestion)
    }

    /// Great-circle distance between two nodes in kilometres
    pub fn straight_line_km(&self, a: NodeIndex, b: NodeIndex) -> f64 {
        straight_line_km(self.graph[a].location, self.graph[b].location)
    }

    /// Lower bound on the cost of any path from `node` to `target`.
    ///
    /// Road lengths are at least `detour_floor` times the straight-line
    /// distance of their endpoints, and no vehicle exceeds
    /// `free_flow_speed(5) × max_speed_factor`, so the bound never
    /// overestimates and satisfies the triangle inequality edge by edge.
    pub fn cost_lower_bound(
        &self,
        node: NodeIndex,
        target: NodeIndex,
        mode: CostMode,
        vehicle: VehicleType,
    ) -> f64 {
        let distance = self.straight_line_km(node, target) * self.detour_floor;
        let max_speed = free_flow_speed(5) * vehicle.max_speed_factor();
        mode.combine(distance, distance / max_speed * 60.0)
    }

    /// A new snapshot with every congestion factor scaled by the weather's
    /// speed loss. `self` is left untouched.
    pub fn with_weather(&self, impact: WeatherImpact) -> Result<RoadNetwork, Error> {
        if !(0.0..1.0).contains(&impact.speed_reduction) {
            return Err(Error::invalid(format!(
                "speed reduction must be within [0, 1), got {}",
                impact.speed_reduction
            )));
        }
        let keep = 1.0 - impact.speed_reduction;
        let mut network = self.clone();
        for factors in &mut network.congestion {
            for factor in factors.iter_mut() {
                *factor = (*factor * keep).max(MIN_CONGESTION_FACTOR);
            }
        }
        Ok(network)
    }
}

fn straight_line_km(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b) / 1000.0
}
