use log::info;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use super::{Intersection, PhaseFlow, SignalOptions, SignalPlan, optimize_signals};
use crate::model::{Direction, Road, RoadNetwork, TimeWindow};
use crate::{Error, Interrupt};

/// Nodes with fewer incident roads are not treated as signalised intersections
pub const MIN_APPROACHES: usize = 3;

/// Vehicle flow on a road in a window: the observed flow when available,
/// otherwise the flow implied by its congestion factor through the inverse
/// BPR relation.
fn road_flow(network: &RoadNetwork, road: &Road, window: TimeWindow) -> f64 {
    network.traffic_flow(road.id, window).unwrap_or_else(|| {
        let factor = network.congestion_factor(road.id, window);
        road.capacity * ((1.0 / factor - 1.0) / 0.15).max(0.0).powf(0.25)
    })
}

/// One phase per incident road: inbound flow plus outbound flow scaled by
/// the window's outbound ratio. One-way roads only count in the direction
/// they can be driven.
pub fn approach_flows(
    network: &RoadNetwork,
    node: &str,
    window: TimeWindow,
) -> Result<Vec<PhaseFlow>, Error> {
    let index = network.node_index(node)?;
    Ok(phases_at(network, index, window))
}

fn phases_at(network: &RoadNetwork, index: NodeIndex, window: TimeWindow) -> Vec<PhaseFlow> {
    network
        .incident_roads(index)
        .into_iter()
        .map(|road| {
            let flow = road_flow(network, road, window);
            let two_way = road.direction == Direction::TwoWay;
            let inbound = if two_way || road.to == index { flow } else { 0.0 };
            let outbound = if two_way || road.from == index {
                flow * window.outbound_ratio()
            } else {
                0.0
            };
            let neighbor = &network.node(road.other_end(index)).id;
            PhaseFlow::new(&format!("{}-{neighbor}", road.id), inbound + outbound)
        })
        .collect()
}

/// Optimises every node with at least [`MIN_APPROACHES`] incident roads.
///
/// Intersections are independent, so they are planned in parallel; the
/// result is in node order.
pub fn optimize_network_signals(
    network: &RoadNetwork,
    window: TimeWindow,
    options: &SignalOptions,
    interrupt: &Interrupt,
) -> Result<Vec<SignalPlan>, Error> {
    let intersections: Vec<NodeIndex> = network
        .nodes()
        .map(|(index, _)| index)
        .filter(|&index| network.incident_roads(index).len() >= MIN_APPROACHES)
        .collect();
    info!(
        "Optimising signals at {} intersections for {window}",
        intersections.len()
    );

    intersections
        .par_iter()
        .map(|&index| {
            let node = network.node(index);
            let intersection = Intersection {
                id: node.id.clone(),
                name: node.name.clone(),
            };
            optimize_signals(
                &intersection,
                &phases_at(network, index, window),
                options,
                interrupt,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::build_road_network;
    use crate::loading::records::{NeighborhoodRecord, NetworkRecords, RoadRecord, TrafficRecord};

    fn junction() -> RoadNetwork {
        let records = NetworkRecords {
            neighborhoods: vec![
                NeighborhoodRecord::new("centre", 100_000, 30.00, 31.00),
                NeighborhoodRecord::new("north", 50_000, 30.01, 31.00),
                NeighborhoodRecord::new("east", 50_000, 30.00, 31.01),
                NeighborhoodRecord::new("south", 50_000, 29.99, 31.00),
            ],
            roads: vec![
                RoadRecord::two_way("centre", "north", 1.2, 3000.0, 4),
                RoadRecord::two_way("centre", "east", 1.2, 2000.0, 4),
                RoadRecord::two_way("south", "centre", 1.2, 2000.0, 3).one_way(),
            ],
            traffic: vec![
                TrafficRecord {
                    from: "centre".into(),
                    to: "north".into(),
                    window: TimeWindow::MorningPeak,
                    flow: Some(1000.0),
                    multiplier: None,
                },
                TrafficRecord {
                    from: "south".into(),
                    to: "centre".into(),
                    window: TimeWindow::MorningPeak,
                    flow: Some(500.0),
                    multiplier: None,
                },
            ],
            ..Default::default()
        };
        build_road_network(records, false).unwrap()
    }

    #[test]
    fn approach_flows_follow_window_ratio() {
        let network = junction();
        let phases = approach_flows(&network, "centre", TimeWindow::MorningPeak).unwrap();
        assert_eq!(phases.len(), 3);
        // Two-way: 1000 in + 600 out
        assert!((phases[0].flow - 1600.0).abs() < 1e-9);
        // No traffic record and free flow
        assert_eq!(phases[1].flow, 0.0);
        // One-way into the junction: inbound only
        assert!((phases[2].flow - 500.0).abs() < 1e-9);
    }

    #[test]
    fn only_junctions_are_signalised() {
        let network = junction();
        let plans = optimize_network_signals(
            &network,
            TimeWindow::MorningPeak,
            &SignalOptions::default(),
            &Interrupt::none(),
        )
        .unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].intersection_id, "centre");
        assert_eq!(
            plans[0].phases.iter().map(|p| p.green_seconds).sum::<u32>(),
            120
        );
    }

    #[test]
    fn unknown_node_is_reported() {
        let network = junction();
        assert!(matches!(
            approach_flows(&network, "west", TimeWindow::Night),
            Err(Error::UnknownNode(_))
        ));
    }
}
