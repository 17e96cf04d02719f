//! Benchmarks for a full simulation tick under both neighbour policies.
//!
//! Run with: `cargo bench --bench tick`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fishtank::prelude::*;

fn flock(count: usize, policy: NeighborPolicy) -> Simulation {
    let config = FlockConfig::default().with_neighbors(policy).with_perception_radius(8.0);
    let mut sim = Simulation::new(config).unwrap();
    let mut population = PopulationController::new(
        PopulationConfig::default()
            .with_target(count)
            .with_groups(4)
            .with_spawn_radius(40.0),
    )
    .unwrap();
    sim.apply_population(&mut population);
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(20);

    for count in [250, 1_000, 2_000] {
        for (name, policy) in [("sorted", NeighborPolicy::Sorted), ("octree", NeighborPolicy::Octree)] {
            // The sorted policy is quadratic; keep it to the small flocks.
            if policy == NeighborPolicy::Sorted && count > 1_000 {
                continue;
            }
            let mut sim = flock(count, policy);
            group.bench_with_input(BenchmarkId::new(name, count), &count, |b, _| {
                b.iter(|| sim.tick(1.0 / 60.0, Some(Vec3::new(0.0, 0.0, 50.0))).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
