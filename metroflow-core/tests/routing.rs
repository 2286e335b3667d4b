//! Integration tests for shortest-path and emergency routing.
//!
//! Covers the four-node grid scenario, brute-force optimality of Dijkstra on
//! small random graphs and A*/Dijkstra agreement.

use metroflow_core::loading::records::{NeighborhoodRecord, RoadRecord};
use metroflow_core::loading::{NetworkRecords, build_road_network};
use metroflow_core::prelude::*;
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

/// A(0,0) B(0,1) C(1,1) D(1,0) with a poor diagonal A–C of the given length
fn grid(diagonal: f64) -> RoadNetwork {
    let records = NetworkRecords {
        neighborhoods: vec![
            NeighborhoodRecord::new("A", 1_000, 0.0, 0.0),
            NeighborhoodRecord::new("B", 1_000, 0.0, 1.0),
            NeighborhoodRecord::new("C", 1_000, 1.0, 1.0),
            NeighborhoodRecord::new("D", 1_000, 1.0, 0.0),
        ],
        roads: vec![
            RoadRecord::two_way("A", "B", 1.0, 1000.0, 5),
            RoadRecord::two_way("B", "C", 1.0, 1000.0, 5),
            RoadRecord::two_way("A", "C", diagonal, 1000.0, 2),
            RoadRecord::two_way("C", "D", 1.0, 1000.0, 5),
        ],
        ..NetworkRecords::default()
    };
    build_road_network(records, false).unwrap()
}

fn distance_query() -> RouteQuery {
    RouteQuery::default().with_cost_mode(CostMode::Distance)
}

/// Two to eight neighborhoods scattered over a few kilometres, joined by
/// random roads of random condition; some of them one-way.
fn random_network(rng: &mut StdRng) -> RoadNetwork {
    let nodes = rng.gen_range(2..=8);
    let neighborhoods = (0..nodes)
        .map(|i| {
            let lat = 30.0 + rng.gen_range(0.0..0.05);
            let lon = 31.2 + rng.gen_range(0.0..0.05);
            NeighborhoodRecord::new(&i.to_string(), 10_000, lat, lon)
        })
        .collect::<Vec<_>>();

    let mut roads = Vec::new();
    for a in 0..nodes {
        for b in (a + 1)..nodes {
            if !rng.gen_bool(0.45) {
                continue;
            }
            let distance = rng.gen_range(6.0..15.0);
            let capacity = rng.gen_range(500.0..3000.0);
            let condition = rng.gen_range(1..=5);
            let road =
                RoadRecord::two_way(&a.to_string(), &b.to_string(), distance, capacity, condition);
            roads.push(if rng.gen_bool(0.2) { road.one_way() } else { road });
        }
    }

    build_road_network(
        NetworkRecords {
            neighborhoods,
            roads,
            ..NetworkRecords::default()
        },
        false,
    )
    .unwrap()
}

/// Cheapest simple path by exhaustive enumeration
fn brute_force(
    network: &RoadNetwork,
    origin: &str,
    target: &str,
    query: &RouteQuery,
) -> Option<f64> {
    fn walk(
        network: &RoadNetwork,
        node: NodeIndex,
        target: NodeIndex,
        cost: f64,
        query: &RouteQuery,
        visited: &mut [bool],
        best: &mut Option<f64>,
    ) {
        if node == target {
            if best.is_none_or(|b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        visited[node.index()] = true;
        for (next, road) in network.neighbors(node) {
            if visited[next.index()] || road.condition < query.min_condition || !road.is_existing()
            {
                continue;
            }
            let step =
                network.vehicle_weight(road.id, query.time_window, query.cost_mode, query.vehicle);
            walk(network, next, target, cost + step, query, visited, best);
        }
        visited[node.index()] = false;
    }

    let origin = network.node_index(origin).unwrap();
    let target = network.node_index(target).unwrap();
    let mut visited = vec![false; network.node_count()];
    let mut best = None;
    walk(network, origin, target, 0.0, query, &mut visited, &mut best);
    best
}

// ── Grid scenario ──────────────────────────────────────────────────────

#[test]
fn dijkstra_takes_the_two_good_roads() {
    let network = grid(3.0);
    let route = find_shortest_path(&network, "A", "C", &distance_query(), &Interrupt::none()).unwrap();

    assert_eq!(route.nodes, ["A", "B", "C"]);
    assert!((route.total_distance_km - 2.0).abs() < 1e-12);
    assert!((route.total_cost - 2.0).abs() < 1e-12);
}

#[test]
fn astar_excludes_poor_roads() {
    let network = grid(3.0);
    let query = EmergencyQuery {
        cost_mode: CostMode::Distance,
        ..EmergencyQuery::default()
    }
    .with_min_condition(Condition::new(3).unwrap());

    let route = find_emergency_route(&network, "A", "C", &query, &Interrupt::none()).unwrap();
    assert_eq!(route.nodes, ["A", "B", "C"]);
}

#[test]
fn condition_constraint_changes_the_answer() {
    // A short but poor diagonal wins a flat search and is refused by dispatch
    let network = grid(1.5);

    let flat = find_shortest_path(&network, "A", "C", &distance_query(), &Interrupt::none()).unwrap();
    assert_eq!(flat.nodes, ["A", "C"]);

    let query = EmergencyQuery {
        cost_mode: CostMode::Distance,
        ..EmergencyQuery::default()
    }
    .with_min_condition(Condition::new(3).unwrap());
    let constrained = find_emergency_route(&network, "A", "C", &query, &Interrupt::none()).unwrap();
    assert_eq!(constrained.nodes, ["A", "B", "C"]);
    assert!(constrained.segments.iter().all(|segment| segment.condition >= 3));
}

#[test]
fn route_totals_add_up() {
    let network = grid(3.0);
    let route = find_shortest_path(&network, "A", "D", &RouteQuery::default(), &Interrupt::none()).unwrap();

    let time: f64 = route.segments.iter().map(|s| s.time_minutes).sum();
    let distance: f64 = route.segments.iter().map(|s| s.distance_km).sum();
    assert!((route.total_time_minutes - time).abs() < 1e-9);
    assert!((route.total_distance_km - distance).abs() < 1e-9);
    assert_eq!(route.segments.len() + 1, route.nodes.len());
}

#[test]
fn route_emissions_cover_every_segment() {
    let network = grid(3.0);
    let route = find_shortest_path(&network, "A", "D", &RouteQuery::default(), &Interrupt::none()).unwrap();
    let report = route.emissions(&VehicleMix::default()).unwrap();

    assert_eq!(report.segments.len(), route.segments.len());
    let co2: f64 = report.segments.iter().map(|s| s.emissions.co2).sum();
    assert!((report.total.co2 - co2).abs() < 1e-9);
    // Blended CO2 factors lie between 245 and 289 g/km for the default mix
    assert!(report.total.co2 >= 245.0 * route.total_distance_km - 1e-9);
    assert!(report.total.co2 <= 289.0 * route.total_distance_km + 1e-9);
}

#[test]
fn unknown_node_is_rejected() {
    let network = grid(3.0);
    let result = find_shortest_path(&network, "A", "Z", &RouteQuery::default(), &Interrupt::none());
    assert!(matches!(result, Err(Error::UnknownNode(id)) if id == "Z"));
}

#[test]
fn every_window_is_compared() {
    let network = grid(3.0);
    let results = compare_time_windows(&network, "A", "D", &RouteQuery::default(), &Interrupt::none());

    let windows = results.iter().map(|(window, _)| *window).collect::<Vec<_>>();
    assert_eq!(windows, TimeWindow::ALL);
    for (window, result) in results {
        assert_eq!(result.unwrap().time_window, window);
    }
}

// ── Optimality ─────────────────────────────────────────────────────────

#[test]
fn dijkstra_matches_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(7);
    let modes = [CostMode::Distance, CostMode::Time, CostMode::Blended];

    for _ in 0..60 {
        let network = random_network(&mut rng);
        let last = network.node_count() - 1;
        let query = RouteQuery {
            cost_mode: modes[rng.gen_range(0..modes.len())],
            min_condition: Condition::new(rng.gen_range(1..=3)).unwrap(),
            ..RouteQuery::default()
        };
        let (origin, target) = ("0".to_string(), last.to_string());

        let expected = brute_force(&network, &origin, &target, &query);
        let found = find_shortest_path(&network, &origin, &target, &query, &Interrupt::none());
        match (expected, found) {
            (Some(cost), Ok(route)) => assert!((route.total_cost - cost).abs() < 1e-9),
            (None, Err(Error::NotFound { .. })) => {}
            (expected, found) => panic!("expected {expected:?}, got {found:?}"),
        }
    }
}

#[test]
fn astar_agrees_with_dijkstra_and_settles_fewer_nodes() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..60 {
        let network = random_network(&mut rng);
        let last = (network.node_count() - 1).to_string();
        let query = EmergencyQuery::default()
            .with_min_condition(Condition::new(rng.gen_range(1..=3)).unwrap());

        let astar = find_emergency_route(&network, "0", &last, &query, &Interrupt::none());
        let dijkstra = find_shortest_path(
            &network,
            "0",
            &last,
            &query.as_route_query(),
            &Interrupt::none(),
        );

        match (astar, dijkstra) {
            (Ok(a), Ok(d)) => {
                assert!((a.total_cost - d.total_cost).abs() < 1e-9);
                assert!(a.nodes_expanded <= d.nodes_expanded);
            }
            (Err(Error::NotFound { .. }), Err(Error::NotFound { .. })) => {}
            (a, d) => panic!("A* returned {a:?}, Dijkstra returned {d:?}"),
        }
    }
}
