use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use log::debug;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use super::state::State;
use super::{Route, RouteQuery};
use crate::model::{RoadId, RoadNetwork, TimeWindow};
use crate::{Error, Interrupt};

/// Settled path found by [`best_first`]
pub(super) struct SearchOutcome {
    pub(super) cost: f64,
    /// `(node, road used to reach it)` from the first hop to the target
    pub(super) hops: Vec<(NodeIndex, RoadId)>,
    pub(super) expanded: usize,
}

/// Best-first search shared by Dijkstra (`heuristic ≡ 0`) and A*.
///
/// The frontier pops the lowest `cost + heuristic`, ties go to the lower
/// node index. Every pop checks the interrupt. All bookkeeping is local to
/// the call, so repeated invocations never share state.
pub(super) fn best_first<H>(
    network: &RoadNetwork,
    origin: NodeIndex,
    target: NodeIndex,
    query: &RouteQuery,
    heuristic: H,
    interrupt: &Interrupt,
) -> Result<Option<SearchOutcome>, Error>
where
    H: Fn(NodeIndex) -> f64,
{
    let node_count = network.node_count();
    let mut best = vec![f64::INFINITY; node_count];
    let mut predecessor: Vec<Option<(NodeIndex, RoadId)>> = vec![None; node_count];
    let mut settled = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::new();
    let mut expanded = 0;

    best[origin.index()] = 0.0;
    heap.push(State {
        priority: heuristic(origin),
        cost: 0.0,
        node: origin,
    });

    while let Some(State { cost, node, .. }) = heap.pop() {
        interrupt.check()?;

        // Skip stale entries
        if settled.contains(node.index()) || cost > best[node.index()] {
            continue;
        }
        settled.insert(node.index());
        expanded += 1;

        if node == target {
            return Ok(Some(SearchOutcome {
                cost,
                hops: unwind(&predecessor, origin, target),
                expanded,
            }));
        }

        for (next, road) in network.neighbors(node) {
            if settled.contains(next.index()) || !query.admits(road) {
                continue;
            }
            let next_cost = cost + query.cost(network, road);
            if next_cost < best[next.index()] {
                best[next.index()] = next_cost;
                predecessor[next.index()] = Some((node, road.id));
                heap.push(State {
                    priority: next_cost + heuristic(next),
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    Ok(None)
}

fn unwind(
    predecessor: &[Option<(NodeIndex, RoadId)>],
    origin: NodeIndex,
    target: NodeIndex,
) -> Vec<(NodeIndex, RoadId)> {
    let mut hops = Vec::new();
    let mut current = target;
    while current != origin {
        match predecessor[current.index()] {
            Some((previous, road)) => {
                hops.push((current, road));
                current = previous;
            }
            None => break,
        }
    }
    hops.reverse();
    hops
}

/// Time-dependent Dijkstra between two nodes
///
/// # Errors
///
/// [`Error::UnknownNode`] for unknown ids, [`Error::NotFound`] if the
/// destination cannot be reached under the query's filters, and
/// [`Error::Cancelled`]/[`Error::Timeout`] if interrupted
pub fn find_shortest_path(
    network: &RoadNetwork,
    origin: &str,
    destination: &str,
    query: &RouteQuery,
    interrupt: &Interrupt,
) -> Result<Route, Error> {
    let source = network.node_index(origin)?;
    let target = network.node_index(destination)?;

    let outcome = best_first(network, source, target, query, |_| 0.0, interrupt)?.ok_or_else(
        || Error::NotFound {
            origin: origin.to_string(),
            destination: destination.to_string(),
        },
    )?;

    debug!(
        "Dijkstra {origin} -> {destination} ({}): cost {:.3}, {} nodes expanded",
        query.time_window, outcome.cost, outcome.expanded
    );

    Ok(Route::assemble(
        network,
        source,
        &outcome.hops,
        outcome.cost,
        query,
        outcome.expanded,
    ))
}

/// Runs the same query once per time window so callers can compare how the
/// route varies through the day. Each run is an independent invocation.
pub fn compare_time_windows(
    network: &RoadNetwork,
    origin: &str,
    destination: &str,
    query: &RouteQuery,
    interrupt: &Interrupt,
) -> Vec<(TimeWindow, Result<Route, Error>)> {
    TimeWindow::ALL
        .par_iter()
        .map(|&window| {
            let query = query.in_window(window);
            (
                window,
                find_shortest_path(network, origin, destination, &query, interrupt),
            )
        })
        .collect()
}
