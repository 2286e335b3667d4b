use std::cmp::Reverse;

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, warn};
use petgraph::unionfind::UnionFind;

use super::{
    DesignOptions, HOSPITAL_BONUS, MAINTENANCE_COST_PER_KM, MAX_POPULATION_BONUS,
    MIN_ADJUSTED_COST, SelectedRoad, SpanningTreeResult,
};
use crate::model::{FacilityKind, Road, RoadNetwork, RoadStatus};
use crate::{Error, Interrupt};

/// Cost of keeping a road in the network: the construction cost of a
/// candidate, or `distance · (6 − condition) · MAINTENANCE_COST_PER_KM` for
/// an existing road.
pub fn base_cost(road: &Road) -> f64 {
    match road.construction_cost {
        Some(cost) if !road.is_existing() => cost,
        _ => {
            road.distance * f64::from(6 - road.condition.rating()) * MAINTENANCE_COST_PER_KM
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Candidate<'a> {
    pub(super) road: &'a Road,
    pub(super) base: f64,
    pub(super) adjusted: f64,
}

/// Eligible roads with their adjusted costs, in Kruskal order: ascending
/// adjusted cost, then base cost, then road id.
pub(super) fn candidates<'a>(
    network: &'a RoadNetwork,
    options: &DesignOptions,
) -> Vec<Candidate<'a>> {
    let population = population_scores(network);
    let is_hospital = |index| network.node(index).is_facility(FacilityKind::Hospital);

    network
        .roads()
        .iter()
        .filter(|road| road.is_existing() || options.include_new_roads)
        .map(|road| {
            let base = base_cost(road);
            let mut bonus = 0.0;
            if options.hospital_priority && (is_hospital(road.from) || is_hospital(road.to)) {
                bonus += HOSPITAL_BONUS;
            }
            if options.population_priority {
                let score = population[road.from.index()].max(population[road.to.index()]);
                bonus += MAX_POPULATION_BONUS * score;
            }
            Candidate {
                road,
                base,
                adjusted: (base * (1.0 - bonus)).max(MIN_ADJUSTED_COST),
            }
        })
        .sorted_by(|a, b| {
            a.adjusted
                .total_cmp(&b.adjusted)
                .then(a.base.total_cmp(&b.base))
                .then(a.road.id.cmp(&b.road.id))
        })
        .collect()
}

/// `(n − rank) / n` for neighborhoods ranked by descending population,
/// 0 for facilities
fn population_scores(network: &RoadNetwork) -> Vec<f64> {
    let mut scores = vec![0.0; network.node_count()];
    let ranked: Vec<_> = network
        .nodes()
        .filter_map(|(index, node)| node.population.map(|population| (index, population)))
        .sorted_by_key(|&(index, population)| (Reverse(population), index))
        .collect();

    let count = ranked.len() as f64;
    for (rank, (index, _)) in ranked.into_iter().enumerate() {
        scores[index.index()] = (count - rank as f64) / count;
    }
    scores
}

/// Kruskal's algorithm over the eligible roads, treated as undirected.
///
/// The selection is a minimum spanning forest under the adjusted-cost metric.
/// Nodes the eligible roads cannot reach are listed in
/// [`SpanningTreeResult::unreachable_nodes`] rather than failing the call.
pub fn build_minimum_network(
    network: &RoadNetwork,
    options: &DesignOptions,
    interrupt: &Interrupt,
) -> Result<SpanningTreeResult, Error> {
    let candidates = candidates(network, options);
    let mut forest = UnionFind::<usize>::new(network.node_count());
    let mut selected = Vec::with_capacity(network.node_count().saturating_sub(1));

    for candidate in &candidates {
        interrupt.check()?;
        let road = candidate.road;
        if forest.union(road.from.index(), road.to.index()) {
            selected.push(SelectedRoad {
                road: road.id,
                from: network.node(road.from).id.clone(),
                to: network.node(road.to).id.clone(),
                distance_km: road.distance,
                status: road.status,
                base_cost: candidate.base,
                adjusted_cost: candidate.adjusted,
            });
        }
    }

    // component label -> (size, lowest member index)
    let labels = forest.into_labeling();
    let mut components: HashMap<usize, (usize, usize)> = HashMap::new();
    for (index, &label) in labels.iter().enumerate() {
        let entry = components.entry(label).or_insert((0, index));
        entry.0 += 1;
    }
    let main = components
        .iter()
        .max_by_key(|&(_, &(size, lowest))| (size, Reverse(lowest)))
        .map(|(&label, _)| label);

    let mut unreachable_nodes = Vec::new();
    let mut connected_hospitals = 0;
    for (index, node) in network.nodes() {
        if Some(labels[index.index()]) == main {
            if node.is_facility(FacilityKind::Hospital) {
                connected_hospitals += 1;
            }
        } else {
            unreachable_nodes.push(node.id.clone());
        }
    }

    let new_roads = selected
        .iter()
        .filter(|s| s.status == RoadStatus::Potential)
        .count();
    let result = SpanningTreeResult {
        total_adjusted_cost: selected.iter().map(|s| s.adjusted_cost).sum(),
        total_base_cost: selected.iter().map(|s| s.base_cost).sum(),
        new_roads,
        existing_roads: selected.len() - new_roads,
        components: components.len(),
        selected,
        unreachable_nodes,
        connected_hospitals,
    };

    debug!(
        "Minimum network: {} of {} eligible roads selected ({} new), adjusted cost {:.2}",
        result.selected.len(),
        candidates.len(),
        result.new_roads,
        result.total_adjusted_cost
    );
    if !result.is_connected() {
        warn!(
            "Eligible roads leave {} node(s) outside the main component",
            result.unreachable_nodes.len()
        );
    }
    Ok(result)
}
