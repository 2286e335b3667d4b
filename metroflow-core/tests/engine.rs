//! Cancellation and deadline handling through the engine facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use metroflow_core::loading::records::{FacilityRecord, NeighborhoodRecord, RoadRecord};
use metroflow_core::loading::{NetworkRecords, build_road_network};
use metroflow_core::prelude::*;
use metroflow_core::transit::{BusRoute, WaitingCurve};

fn corridor() -> RoadNetwork {
    let records = NetworkRecords {
        neighborhoods: vec![
            NeighborhoodRecord::new("west", 80_000, 30.00, 31.20),
            NeighborhoodRecord::new("centre", 120_000, 30.00, 31.25),
            NeighborhoodRecord::new("east", 60_000, 30.00, 31.30),
        ],
        facilities: vec![FacilityRecord::new("clinic", FacilityKind::Hospital, 30.01, 31.30)],
        roads: vec![
            RoadRecord::two_way("west", "centre", 5.0, 2000.0, 4),
            RoadRecord::two_way("centre", "east", 5.0, 2000.0, 4),
            RoadRecord::two_way("east", "clinic", 1.2, 800.0, 3),
        ],
        ..NetworkRecords::default()
    };
    build_road_network(records, false).unwrap()
}

fn transit() -> TransitNetwork {
    TransitNetwork {
        bus_routes: vec![
            BusRoute::new("A", 20_000, WaitingCurve::Headway { round_trip_minutes: 60.0 }),
            BusRoute::new("B", 10_000, WaitingCurve::Headway { round_trip_minutes: 40.0 }),
        ],
        ..TransitNetwork::default()
    }
}

#[test]
fn engine_runs_without_interrupt() {
    let network = corridor();
    let engine = OptimizationEngine::new(&network);

    let route = engine
        .shortest_path("west", "east", &RouteQuery::default())
        .unwrap();
    assert_eq!(route.nodes, ["west", "centre", "east"]);

    let plan = engine
        .allocate_buses(&transit(), &TransitOptions::default())
        .unwrap();
    assert!(plan.violations.is_empty());
}

#[test]
fn raised_flag_cancels_every_algorithm() {
    let network = corridor();
    let flag = Arc::new(AtomicBool::new(false));
    let interrupt = Interrupt::none().cancelled_by(Arc::clone(&flag));
    let engine = OptimizationEngine::new(&network).with_interrupt(interrupt);
    flag.store(true, Ordering::Relaxed);

    assert!(matches!(
        engine.shortest_path("west", "east", &RouteQuery::default()),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine.emergency_route("west", "clinic", &EmergencyQuery::default()),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine.minimum_network(&DesignOptions::default()),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine.allocate_buses(&transit(), &TransitOptions::default()),
        Err(Error::Cancelled)
    ));
}

#[test]
fn elapsed_deadline_times_out() {
    let network = corridor();
    let engine =
        OptimizationEngine::new(&network).with_interrupt(Interrupt::with_deadline(Instant::now()));

    assert!(matches!(
        engine.nearest_facility("west", FacilityKind::Hospital, &EmergencyQuery::default()),
        Err(Error::Timeout)
    ));
    for (_, result) in engine.compare_time_windows("west", "east", &RouteQuery::default()) {
        assert!(matches!(result, Err(Error::Timeout)));
    }
}

#[test]
fn generous_deadline_does_not_fire() {
    let network = corridor();
    let engine = OptimizationEngine::new(&network)
        .with_interrupt(Interrupt::with_timeout(Duration::from_secs(60)));

    let route = engine
        .emergency_route("west", "clinic", &EmergencyQuery::default())
        .unwrap();
    assert_eq!(route.destination, "clinic");
}
