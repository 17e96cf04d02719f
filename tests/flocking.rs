//! Integration tests for the flocking core.
//!
//! These exercise the public API end to end: octree properties, rule
//! outputs for hand-placed agents, and whole-tick behaviour.

use fishtank::neighborhood::{indexed_neighbors, sorted_neighbors};
use fishtank::octree::{Cube, Octree, MAX_DEPTH, MAX_OCCUPANTS};
use fishtank::prelude::*;
use fishtank::rules::{steer, SteeringContext};
use fishtank::{BoidView, OctreeError, SimulationError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn scattered(count: usize, half: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            )
        })
        .collect()
}

fn views(positions: &[Vec3], group: u32) -> Vec<BoidView> {
    positions
        .iter()
        .map(|&position| BoidView { position, heading: FORWARD, group })
        .collect()
}

fn index_of(snapshot: &[BoidView]) -> Octree<usize> {
    let mut tree = Octree::new(Cube::enclosing(snapshot.iter().map(|v| v.position)));
    for (i, v) in snapshot.iter().enumerate() {
        tree.add(i, v.position).unwrap();
    }
    tree
}

fn only(weights: impl FnOnce(&mut RuleWeights)) -> RuleWeights {
    let mut w = RuleWeights {
        cohesion: 0.0,
        separation: 0.0,
        alignment: 0.0,
        centering: 0.0,
        avoidance: 0.0,
    };
    weights(&mut w);
    w
}

// ============================================================================
// Octree
// ============================================================================

#[test]
fn test_octree_leaves_contain_capacity_and_count() {
    for (seed, count) in [(1, 10), (2, 11), (3, 500), (4, 5_000)] {
        let points = scattered(count, 64.0, seed);
        let snapshot = views(&points, 0);
        let tree = index_of(&snapshot);

        let mut total = 0;
        for (cube, occupants) in tree.leaves() {
            assert!(occupants.len() <= MAX_OCCUPANTS);
            for o in occupants {
                assert!(cube.contains(o.position));
            }
            total += occupants.len();
        }
        assert_eq!(total, count);
        assert_eq!(tree.len(), count);
        assert!(tree.depth() < MAX_DEPTH);
    }
}

#[test]
fn test_radius_query_is_sound() {
    let points = scattered(4_000, 40.0, 99);
    let tree = index_of(&views(&points, 0));
    let mut rng = SmallRng::seed_from_u64(100);

    for _ in 0..100 {
        let center = Vec3::new(
            rng.gen_range(-45.0..45.0),
            rng.gen_range(-45.0..45.0),
            rng.gen_range(-45.0..45.0),
        );
        let radius = rng.gen_range(0.5..30.0);
        let found = tree.radius_search(center, radius);

        let mut hit = vec![false; points.len()];
        for i in found {
            assert!(points[i].distance(center) <= radius + 1e-4);
            assert!(!hit[i], "reported twice");
            hit[i] = true;
        }
        for (i, p) in points.iter().enumerate() {
            if p.distance(center) <= radius {
                assert!(hit[i], "missed point {} at distance {}", i, p.distance(center));
            }
        }
    }
}

#[test]
fn test_out_of_root_insert_is_an_error() {
    let mut tree = Octree::new(Cube::new(Vec3::ZERO, 10.0));
    let err = tree.add(0usize, Vec3::new(0.0, 6.0, 0.0)).unwrap_err();
    assert!(matches!(err, OctreeError::OutOfBounds { .. }));
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn test_cohesion_scenario_two_agents() {
    let config = FlockConfig::default().with_group_size(10).with_perception_radius(20.0);
    let snapshot = views(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], 0);
    let tree = index_of(&snapshot);
    let mut neighbors = Vec::new();

    let expected = [Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)];
    for (subject, want) in expected.iter().enumerate() {
        indexed_neighbors(&snapshot, &tree, subject, config.query_radius(), &mut neighbors);
        let ctx = SteeringContext { subject: snapshot[subject], neighbors: &neighbors, avoid: None, config: &config };
        assert_eq!(Rule::Cohesion.contribution(&ctx), *want);
    }
}

#[test]
fn test_separation_pushes_each_away_by_overlap() {
    let config = FlockConfig::default().with_min_boid_distance(3.0);
    let a = Vec3::new(1.0, 1.0, 1.0);
    let b = a + Vec3::new(0.6, 0.0, 0.8); // 1.0 apart
    let snapshot = views(&[a, b], 0);
    let mut neighbors = Vec::new();

    for (me, other) in [(0, 1), (1, 0)] {
        sorted_neighbors(&snapshot, me, &mut neighbors);
        let ctx = SteeringContext { subject: snapshot[me], neighbors: &neighbors, avoid: None, config: &config };
        let push = Rule::Separation.contribution(&ctx);

        let away = (snapshot[me].position - snapshot[other].position).normalize();
        assert!((push.length() - 2.0).abs() < 1e-5);
        assert!(push.normalize().abs_diff_eq(away, 1e-5));
    }
}

#[test]
fn test_neighbor_lists_exclude_self() {
    let points = scattered(300, 10.0, 5);
    let snapshot = views(&points, 0);
    let tree = index_of(&snapshot);
    let (mut sorted, mut indexed) = (Vec::new(), Vec::new());

    for subject in 0..snapshot.len() {
        sorted_neighbors(&snapshot, subject, &mut sorted);
        indexed_neighbors(&snapshot, &tree, subject, 4.0, &mut indexed);
        assert!(sorted.iter().all(|n| n.index != subject));
        assert!(indexed.iter().all(|n| n.index != subject));
        assert_eq!(sorted.len(), snapshot.len() - 1);
        assert!(indexed.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
}

#[test]
fn test_small_steering_is_ignored() {
    let config = FlockConfig::default();
    let snapshot = views(&[Vec3::new(0.0, 0.0, 0.1)], 0);
    let ctx = SteeringContext { subject: snapshot[0], neighbors: &[], avoid: None, config: &config };
    // centering only: 0.05 * 0.1 is under the epsilon
    assert!(steer(&ctx).length() < config.steer_epsilon);

    let mut sim = Simulation::new(config)
        .unwrap()
        .with_agents(vec![Agent::new(snapshot[0].position, Quat::IDENTITY, 0, 0.0)]);
    let stats = sim.tick(0.1, None).unwrap();
    assert_eq!(stats.steered, 0);
    assert_eq!(sim.agents()[0].orientation, Quat::IDENTITY);
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn test_lone_agent_scenario() {
    let config = FlockConfig::default().with_cruise_speed(5.0).with_time_scale(1.0);
    let mut sim = Simulation::new(config)
        .unwrap()
        .with_agents(vec![Agent::new(Vec3::ZERO, Quat::IDENTITY, 0, 0.3)]);

    sim.tick(1.0, None).unwrap();
    let agent = sim.agents()[0];
    assert_eq!(agent.orientation, Quat::IDENTITY);
    assert_eq!(agent.position, FORWARD * 5.0);
    assert_eq!(agent.phase(), 0.3);
    assert_eq!(agent.group(), 0);
}

#[test]
fn test_cohesion_brings_pair_together() {
    let config = FlockConfig::default()
        .with_weights(only(|w| w.cohesion = 1.0))
        .with_min_boid_distance(0.0)
        .with_cruise_speed(2.0)
        .with_turn_rate(2.0);
    let start = [Vec3::new(-10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)];
    let mut sim = Simulation::new(config).unwrap().with_agents(
        start.iter().map(|&p| Agent::new(p, Quat::IDENTITY, 0, 0.0)).collect(),
    );

    let spread = |sim: &Simulation| {
        let centroid = sim.centroid().unwrap();
        sim.agents().iter().map(|a| a.position.distance(centroid)).fold(0.0, f32::max)
    };
    let initial = spread(&sim);
    let mut closest = initial;
    for _ in 0..200 {
        sim.tick(0.05, None).unwrap();
        let now = spread(&sim);
        assert!(now <= initial + 1e-3, "drifted apart: {now}");
        closest = closest.min(now);
    }
    assert!(closest < initial * 0.5);
}

#[test]
fn test_agents_keep_clear_of_camera() {
    let config = FlockConfig::default()
        .with_weights(only(|w| w.avoidance = 1.0))
        .with_min_camera_distance(10.0)
        .with_turn_rate(5.0)
        .with_cruise_speed(1.0);
    let camera = Vec3::new(0.0, 0.0, -4.0);
    // Heading straight at the camera.
    let mut sim = Simulation::new(config)
        .unwrap()
        .with_agents(vec![Agent::new(Vec3::ZERO, Quat::IDENTITY, 0, 0.0)]);

    for _ in 0..20 {
        sim.tick(0.1, Some(camera)).unwrap();
    }
    assert!(sim.agents()[0].position.distance(camera) > 4.0);
    assert!(sim.agents()[0].heading().z > 0.0);
}

#[test]
fn test_tick_is_order_independent() {
    let mut population = PopulationController::new(
        PopulationConfig::default().with_target(120).with_groups(3).with_spawn_radius(15.0),
    )
    .unwrap();
    let mut agents = Vec::new();
    population.reconcile(&mut agents, 5.0);

    let mut forward = Simulation::new(FlockConfig::default()).unwrap().with_agents(agents.clone());
    let mut reversed_agents = agents;
    reversed_agents.reverse();
    let mut reversed = Simulation::new(FlockConfig::default()).unwrap().with_agents(reversed_agents);

    forward.tick(0.02, None).unwrap();
    reversed.tick(0.02, None).unwrap();

    let mut back: Vec<Agent> = reversed.agents().to_vec();
    back.reverse();
    for (a, b) in forward.agents().iter().zip(&back) {
        assert!(a.position.abs_diff_eq(b.position, 1e-5));
        assert!(a.orientation.abs_diff_eq(b.orientation, 1e-5));
    }
}

#[test]
fn test_corrupt_position_abandons_tick() {
    let agents = vec![
        Agent::new(Vec3::ZERO, Quat::IDENTITY, 0, 0.0),
        Agent::new(Vec3::new(f32::NAN, 0.0, 0.0), Quat::IDENTITY, 0, 0.0),
    ];
    let mut sim = Simulation::new(FlockConfig::default()).unwrap().with_agents(agents);

    let err = sim.tick(0.1, None).unwrap_err();
    assert!(matches!(err, SimulationError::Octree(OctreeError::OutOfBounds { .. })));
    assert_eq!(sim.agents()[0].position, Vec3::ZERO);
    assert_eq!(sim.ticks(), 0);
}

#[test]
fn test_tight_clusters_far_from_origin_tick() {
    let cases = [
        (Vec3::new(50.0, 0.0, 0.0), 0.1),
        (Vec3::new(200.0, 0.0, 0.0), 0.01),
        (Vec3::new(1000.0, 3.0, -2.0), 1e-2),
        (Vec3::new(1000.0, 3.0, -2.0), 1.0),
    ];
    for (case, (center, spread)) in cases.into_iter().enumerate() {
        for trial in 0..10 {
            let seed = (case * 100 + trial) as u64;
            let agents: Vec<Agent> = scattered(200, spread, seed)
                .into_iter()
                .enumerate()
                .map(|(i, p)| Agent::new(center + p, Quat::IDENTITY, (i % 3) as u32, 0.0))
                .collect();
            let mut sim = Simulation::new(FlockConfig::default()).unwrap().with_agents(agents);

            for _ in 0..3 {
                let stats = sim.tick(1.0 / 60.0, None).unwrap();
                assert_eq!(stats.agents, 200);
            }
            assert_eq!(sim.ticks(), 3);
        }
    }
}

#[test]
fn test_ulp_spaced_agents_tick() {
    let agents: Vec<Agent> = (0..12)
        .map(|i| Agent::new(Vec3::new(1000.0 + i as f32 * 6.1e-5, 3.0, -2.0), Quat::IDENTITY, 0, 0.0))
        .collect();
    let mut sim = Simulation::new(FlockConfig::default()).unwrap().with_agents(agents);
    let stats = sim.tick(0.1, None).unwrap();
    assert_eq!(stats.agents, 12);
    assert!(stats.octree_nodes > 1);
}

#[test]
fn test_population_changes_between_ticks() {
    let mut sim = Simulation::new(FlockConfig::default()).unwrap();
    let mut population = PopulationController::new(PopulationConfig::default().with_target(50)).unwrap();

    sim.apply_population(&mut population);
    let stats = sim.tick(0.016, None).unwrap();
    assert_eq!(stats.agents, 50);

    population.set_target(20);
    sim.apply_population(&mut population);
    let stats = sim.tick(0.016, None).unwrap();
    assert_eq!(stats.agents, 20);
    assert!(stats.octree_nodes >= 1);
}
