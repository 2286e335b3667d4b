use log::{debug, warn};
use petgraph::graph::NodeIndex;

use super::dijkstra::best_first;
use super::{EmergencyQuery, Route};
use crate::model::{FacilityKind, RoadNetwork};
use crate::{Error, Interrupt};

/// A* search for emergency dispatch.
///
/// Roads rated below `query.min_condition` are never expanded. The heuristic
/// is [`RoadNetwork::cost_lower_bound`] for the query's vehicle, which never
/// overestimates the remaining cost, so the result matches a Dijkstra run
/// with [`EmergencyQuery::as_route_query`] while settling at most as many
/// nodes.
///
/// # Errors
///
/// [`Error::NotFound`] if no path respects the condition constraint; the
/// caller may retry with a relaxed `min_condition`.
pub fn find_emergency_route(
    network: &RoadNetwork,
    origin: &str,
    destination: &str,
    query: &EmergencyQuery,
    interrupt: &Interrupt,
) -> Result<Route, Error> {
    let source = network.node_index(origin)?;
    let target = network.node_index(destination)?;

    astar(network, source, target, query, interrupt)?.ok_or_else(|| Error::NotFound {
        origin: origin.to_string(),
        destination: destination.to_string(),
    })
}

fn astar(
    network: &RoadNetwork,
    source: NodeIndex,
    target: NodeIndex,
    query: &EmergencyQuery,
    interrupt: &Interrupt,
) -> Result<Option<Route>, Error> {
    let route_query = query.as_route_query();
    let heuristic =
        |node: NodeIndex| network.cost_lower_bound(node, target, query.cost_mode, query.vehicle);

    let Some(outcome) = best_first(network, source, target, &route_query, heuristic, interrupt)?
    else {
        return Ok(None);
    };

    debug!(
        "A* {} -> {} (min condition {}): cost {:.3}, {} nodes expanded",
        network.node(source).id,
        network.node(target).id,
        query.min_condition.rating(),
        outcome.cost,
        outcome.expanded
    );

    Ok(Some(Route::assemble(
        network,
        source,
        &outcome.hops,
        outcome.cost,
        &route_query,
        outcome.expanded,
    )))
}

/// Routes from `origin` to the cheapest reachable facility of `kind`.
///
/// Equal costs go to the facility with the lower node index.
pub fn route_to_nearest_facility(
    network: &RoadNetwork,
    origin: &str,
    kind: FacilityKind,
    query: &EmergencyQuery,
    interrupt: &Interrupt,
) -> Result<Route, Error> {
    let source = network.node_index(origin)?;
    let candidates: Vec<NodeIndex> = network.facilities(kind).collect();
    if candidates.is_empty() {
        warn!("No facility of type {kind:?} in the network");
    }

    let mut best: Option<Route> = None;
    for facility in candidates {
        let Some(route) = astar(network, source, facility, query, interrupt)? else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|current| route.total_cost < current.total_cost)
        {
            best = Some(route);
        }
    }

    best.ok_or_else(|| Error::NotFound {
        origin: origin.to_string(),
        destination: format!("any {kind:?} facility"),
    })
}
