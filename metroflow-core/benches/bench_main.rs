//! Criterion benchmarks on a synthetic city grid.
//!
//! Run with: cargo bench -p metroflow_core

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use metroflow_core::loading::records::{
    FacilityRecord, NeighborhoodRecord, PotentialRoadRecord, RoadRecord,
};
use metroflow_core::loading::{NetworkRecords, build_road_network};
use metroflow_core::prelude::*;
use metroflow_core::transit::{BusRoute, WaitingCurve};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SPACING_DEG: f64 = 0.01;

fn id(x: usize, y: usize) -> String {
    format!("{x}_{y}")
}

/// `side × side` neighborhoods on a lattice, a hospital in each corner and
/// a sprinkling of diagonal construction candidates
fn grid_network(side: usize) -> RoadNetwork {
    let mut rng = StdRng::seed_from_u64(42);
    let mut records = NetworkRecords::default();

    for x in 0..side {
        for y in 0..side {
            records.neighborhoods.push(NeighborhoodRecord::new(
                &id(x, y),
                rng.gen_range(10_000..400_000),
                30.0 + y as f64 * SPACING_DEG,
                31.0 + x as f64 * SPACING_DEG,
            ));
            if x + 1 < side {
                records.roads.push(RoadRecord::two_way(
                    &id(x, y),
                    &id(x + 1, y),
                    rng.gen_range(1.0..1.6),
                    rng.gen_range(800.0..3500.0),
                    rng.gen_range(1..=5),
                ));
            }
            if y + 1 < side {
                records.roads.push(RoadRecord::two_way(
                    &id(x, y),
                    &id(x, y + 1),
                    rng.gen_range(1.0..1.6),
                    rng.gen_range(800.0..3500.0),
                    rng.gen_range(1..=5),
                ));
            }
            if x + 1 < side && y + 1 < side && rng.gen_bool(0.1) {
                records.potential_roads.push(PotentialRoadRecord::new(
                    &id(x, y),
                    &id(x + 1, y + 1),
                    rng.gen_range(1.5..2.2),
                    2500.0,
                    rng.gen_range(50.0..400.0),
                ));
            }
        }
    }

    for (n, (x, y)) in [(0, 0), (side - 1, 0), (0, side - 1), (side - 1, side - 1)]
        .into_iter()
        .enumerate()
    {
        let hospital = format!("H{n}");
        records.facilities.push(FacilityRecord::new(
            &hospital,
            FacilityKind::Hospital,
            30.0 + y as f64 * SPACING_DEG + 0.002,
            31.0 + x as f64 * SPACING_DEG + 0.002,
        ));
        records
            .roads
            .push(RoadRecord::two_way(&id(x, y), &hospital, 0.4, 1200.0, 5));
    }

    build_road_network(records, true).unwrap()
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");

    for side in [10, 30, 60] {
        let network = grid_network(side);
        let origin = id(side / 2, 0);
        let destination = id(side / 2, side - 1);
        let query = RouteQuery::default();
        let emergency = EmergencyQuery::default();

        group.bench_with_input(BenchmarkId::new("dijkstra", side), &network, |b, network| {
            b.iter(|| {
                find_shortest_path(
                    black_box(network),
                    &origin,
                    &destination,
                    &query,
                    &Interrupt::none(),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("astar", side), &network, |b, network| {
            b.iter(|| {
                find_emergency_route(
                    black_box(network),
                    &origin,
                    &destination,
                    &emergency,
                    &Interrupt::none(),
                )
            });
        });
        group.bench_with_input(
            BenchmarkId::new("nearest_hospital", side),
            &network,
            |b, network| {
                b.iter(|| {
                    route_to_nearest_facility(
                        black_box(network),
                        &origin,
                        FacilityKind::Hospital,
                        &emergency,
                        &Interrupt::none(),
                    )
                });
            },
        );
    }
    group.finish();
}

fn bench_design(c: &mut Criterion) {
    let network = grid_network(40);
    let options = DesignOptions::default();
    c.bench_function("minimum_network_40", |b| {
        b.iter(|| build_minimum_network(black_box(&network), &options, &Interrupt::none()));
    });
}

fn bench_transit(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let bus_routes = (0..15)
        .map(|i| {
            BusRoute::new(
                &format!("R{i}"),
                rng.gen_range(5_000..60_000),
                WaitingCurve::Headway {
                    round_trip_minutes: rng.gen_range(40.0..120.0),
                },
            )
        })
        .collect();
    let transit = TransitNetwork {
        bus_routes,
        ..TransitNetwork::default()
    };
    let options = TransitOptions {
        total_buses: 120,
        ..TransitOptions::default()
    };

    c.bench_function("allocate_buses_15x120", |b| {
        b.iter(|| allocate_buses(black_box(&transit), &options, &Interrupt::none()));
    });
}

fn bench_signals(c: &mut Criterion) {
    let network = grid_network(30);
    let options = SignalOptions::default();
    c.bench_function("network_signals_30", |b| {
        b.iter(|| {
            optimize_network_signals(
                black_box(&network),
                TimeWindow::EveningPeak,
                &options,
                &Interrupt::none(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_routing,
    bench_design,
    bench_transit,
    bench_signals
);
criterion_main!(benches);
