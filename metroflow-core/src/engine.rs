//! Facade bundling a network snapshot with a cancellation signal

use crate::design::{DesignOptions, SpanningTreeResult, build_minimum_network};
use crate::model::{FacilityKind, RoadNetwork, TimeWindow};
use crate::routing::{
    EmergencyQuery, Route, RouteQuery, compare_time_windows, find_emergency_route,
    find_shortest_path, route_to_nearest_facility,
};
use crate::signals::{
    Intersection, PhaseFlow, SignalOptions, SignalPlan, approach_flows, optimize_network_signals,
    optimize_signals,
};
use crate::transit::{TransitNetwork, TransitOptions, TransitPlan, allocate_buses};
use crate::{Error, Interrupt};

/// Runs every optimisation against one immutable [`RoadNetwork`].
///
/// The engine holds no state of its own beyond the borrowed snapshot and the
/// interrupt, so one network can back any number of engines on any number of
/// threads.
#[derive(Debug, Clone)]
pub struct OptimizationEngine<'a> {
    network: &'a RoadNetwork,
    interrupt: Interrupt,
}

impl<'a> OptimizationEngine<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self {
            network,
            interrupt: Interrupt::none(),
        }
    }

    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn network(&self) -> &'a RoadNetwork {
        self.network
    }

    pub fn shortest_path(
        &self,
        origin: &str,
        destination: &str,
        query: &RouteQuery,
    ) -> Result<Route, Error> {
        find_shortest_path(self.network, origin, destination, query, &self.interrupt)
    }

    pub fn compare_time_windows(
        &self,
        origin: &str,
        destination: &str,
        query: &RouteQuery,
    ) -> Vec<(TimeWindow, Result<Route, Error>)> {
        compare_time_windows(self.network, origin, destination, query, &self.interrupt)
    }

    pub fn emergency_route(
        &self,
        origin: &str,
        destination: &str,
        query: &EmergencyQuery,
    ) -> Result<Route, Error> {
        find_emergency_route(self.network, origin, destination, query, &self.interrupt)
    }

    pub fn nearest_facility(
        &self,
        origin: &str,
        kind: FacilityKind,
        query: &EmergencyQuery,
    ) -> Result<Route, Error> {
        route_to_nearest_facility(self.network, origin, kind, query, &self.interrupt)
    }

    pub fn minimum_network(&self, options: &DesignOptions) -> Result<SpanningTreeResult, Error> {
        build_minimum_network(self.network, options, &self.interrupt)
    }

    pub fn allocate_buses(
        &self,
        transit: &TransitNetwork,
        options: &TransitOptions,
    ) -> Result<TransitPlan, Error> {
        allocate_buses(transit, options, &self.interrupt)
    }

    pub fn optimize_signals(
        &self,
        intersection: &Intersection,
        flows: &[PhaseFlow],
        options: &SignalOptions,
    ) -> Result<SignalPlan, Error> {
        optimize_signals(intersection, flows, options, &self.interrupt)
    }

    /// Plans the signal at a network node from its approach flows
    pub fn optimize_intersection(
        &self,
        node: &str,
        window: TimeWindow,
        options: &SignalOptions,
    ) -> Result<SignalPlan, Error> {
        let flows = approach_flows(self.network, node, window)?;
        let index = self.network.node_index(node)?;
        let node = self.network.node(index);
        let intersection = Intersection {
            id: node.id.clone(),
            name: node.name.clone(),
        };
        optimize_signals(&intersection, &flows, options, &self.interrupt)
    }

    pub fn optimize_network_signals(
        &self,
        window: TimeWindow,
        options: &SignalOptions,
    ) -> Result<Vec<SignalPlan>, Error> {
        optimize_network_signals(self.network, window, options, &self.interrupt)
    }
}
