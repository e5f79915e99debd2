//! Performance benchmarks for hub_core using Criterion.rs.

use bevy_ecs::prelude::Entity;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hub_core::clock::{ONE_HOUR_MS, ONE_MIN_MS};
use hub_core::dispatch::{match_pending, order_pending, PendingRequest};
use hub_core::ecs::RequestId;
use hub_core::fleet::FleetRegistry;
use hub_core::scenario::ScenarioParams;
use hub_core::simulation::Simulation;

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 10, 20.0),
        ("medium", 25, 100.0),
        ("large", 200, 600.0),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, fleet, rate) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(fleet, rate),
            |b, &(fleet, rate)| {
                b.iter(|| {
                    let params = ScenarioParams::default()
                        .with_seed(42)
                        .with_fleet_size(fleet)
                        .with_arrival_rate(rate);
                    let Ok(mut sim) = Simulation::new(&params) else {
                        return;
                    };
                    black_box(sim.run_until(ONE_HOUR_MS));
                });
            },
        );
    }
    group.finish();
}

fn bench_dispatch_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_pass");
    for backlog in [10usize, 100, 1_000] {
        let pending: Vec<PendingRequest> = (0..backlog)
            .map(|i| PendingRequest {
                entity: Entity::from_raw(i as u32),
                id: RequestId(i as u64),
                created_at: (backlog - i) as u64 * ONE_MIN_MS,
                pickup_distance: 1.5,
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(backlog), &pending, |b, pending| {
            b.iter(|| {
                let mut fleet = FleetRegistry::default();
                for _ in 0..100 {
                    fleet.add_vehicle(25.0 / 3600.0, 0);
                }
                let mut queue = pending.clone();
                order_pending(&mut queue);
                black_box(match_pending(&mut fleet, 0, &queue, |_| true));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_simulation_run, bench_dispatch_pass);
criterion_main!(benches);
