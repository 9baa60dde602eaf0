//! GPU integration tests for the tick pipeline.
//!
//! These exercise the real compute kernels on whatever adapter is present.
//! On machines with no GPU they skip (the CPU-side math is covered by unit
//! tests and the kernels by naga validation).

use murmuration::prelude::*;
use murmuration::WORKGROUP_SIZE;

const DT: f32 = 1.0 / 60.0;

fn gpu() -> Option<GpuContext> {
    match GpuContext::new_blocking() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

/// 256 boids spread widely enough that the default grid never overflows.
fn spread_config() -> FlockConfig {
    FlockConfig::default()
        .with_agent_count(WORKGROUP_SIZE)
        .with_cell_capacity(WORKGROUP_SIZE)
        .with_spawn(14.0, 0.1, 99)
}

/// A 256-boid lattice with 4-unit spacing: every pairwise distance exceeds
/// the default rule radii, so no boid has any neighbor.
fn isolated_lattice() -> Vec<Boid> {
    let mut boids = Vec::new();
    for z in 0..4 {
        for y in 0..8 {
            for x in 0..8 {
                boids.push(Boid::new(
                    Vec3::new(
                        x as f32 * 4.0 - 14.0,
                        y as f32 * 4.0 - 14.0,
                        z as f32 * 4.0 - 6.0,
                    ),
                    Vec3::ZERO,
                ));
            }
        }
    }
    boids
}

#[test]
fn test_grid_rebuild_is_deterministic() {
    let Some(ctx) = gpu() else { return };

    let mut run = || {
        let mut sim = FlockSim::new(&ctx.device, spread_config()).unwrap();
        sim.tick(&ctx.device, &ctx.queue, DT);
        sim.read_grid(&ctx.device, &ctx.queue).unwrap()
    };

    let a = run();
    let b = run();

    assert_eq!(a.counts, b.counts);
    for cell in 0..a.spec.cell_count() {
        let mut bucket_a = a.bucket(cell).to_vec();
        let mut bucket_b = b.bucket(cell).to_vec();
        bucket_a.sort_unstable();
        bucket_b.sort_unstable();
        assert_eq!(bucket_a, bucket_b, "cell {cell} differs");
    }
}

#[test]
fn test_every_agent_lands_in_exactly_one_bucket() {
    let Some(ctx) = gpu() else { return };

    let mut sim = FlockSim::new(&ctx.device, spread_config()).unwrap();
    sim.tick(&ctx.device, &ctx.queue, DT);
    let grid = sim.read_grid(&ctx.device, &ctx.queue).unwrap();

    assert!(!grid.overflowed());

    let mut seen: Vec<u32> = (0..grid.spec.cell_count())
        .flat_map(|cell| grid.bucket(cell).to_vec())
        .collect();
    seen.sort_unstable();
    let expected: Vec<u32> = (0..WORKGROUP_SIZE).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_zero_neighbors_zero_force() {
    let Some(ctx) = gpu() else { return };

    let config = FlockConfig::default()
        .with_agent_count(WORKGROUP_SIZE)
        .with_cell_capacity(WORKGROUP_SIZE);
    let mut sim = FlockSim::with_boids(&ctx.device, config, &isolated_lattice()).unwrap();
    sim.tick(&ctx.device, &ctx.queue, DT);

    let forces = sim.read_forces(&ctx.device, &ctx.queue).unwrap();
    for (i, force) in forces.iter().enumerate() {
        assert!(
            force.length() < 1e-5,
            "boid {i} has force {force:?} with no neighbors in radius"
        );
    }
}

#[test]
fn test_separation_forces_point_apart() {
    let Some(ctx) = gpu() else { return };

    // Isolate separation: zero out the other rule weights.
    let rules = RuleSet {
        cohesion: RuleParam::new(2.0, 0.0),
        alignment: RuleParam::new(2.0, 0.0),
        separation: RuleParam::new(1.0, 3.0),
    };
    let config = FlockConfig::default()
        .with_agent_count(WORKGROUP_SIZE)
        .with_cell_capacity(WORKGROUP_SIZE)
        .with_rules(rules);

    // Boids 0 and 1 are a close pair; everyone else is far away.
    let mut boids = isolated_lattice();
    boids[0] = Boid::new(Vec3::new(0.3, 1.0, 0.0), Vec3::ZERO);
    boids[1] = Boid::new(Vec3::new(-0.3, 1.0, 0.0), Vec3::ZERO);

    let mut sim = FlockSim::with_boids(&ctx.device, config, &boids).unwrap();
    sim.tick(&ctx.device, &ctx.queue, DT);

    let forces = sim.read_forces(&ctx.device, &ctx.queue).unwrap();
    let axis = Vec3::X; // line connecting the pair

    assert!(forces[0].dot(axis) > 0.0, "boid 0 should be pushed +x");
    assert!(forces[1].dot(axis) < 0.0, "boid 1 should be pushed -x");
    assert!(
        (forces[0] + forces[1]).length() < 1e-4,
        "pair forces should be equal and opposite, got {:?} and {:?}",
        forces[0],
        forces[1]
    );
}

#[test]
fn test_speed_never_exceeds_cap() {
    let Some(ctx) = gpu() else { return };

    let mut sim = FlockSim::new(&ctx.device, FlockConfig::default().with_agent_count(WORKGROUP_SIZE))
        .unwrap();
    for _ in 0..100 {
        sim.tick(&ctx.device, &ctx.queue, DT);
    }

    let boids = sim.read_boids(&ctx.device, &ctx.queue).unwrap();
    let max_speed = sim.config().max_speed;
    for (i, boid) in boids.iter().enumerate() {
        assert!(
            boid.velocity.length() <= max_speed * 1.0001,
            "boid {i} at speed {} exceeds cap {}",
            boid.velocity.length(),
            max_speed
        );
    }
}

#[test]
fn test_steering_delta_never_exceeds_max_force() {
    let Some(ctx) = gpu() else { return };

    let mut sim = FlockSim::new(&ctx.device, FlockConfig::default().with_agent_count(WORKGROUP_SIZE))
        .unwrap();
    let mut previous = sim.read_boids(&ctx.device, &ctx.queue).unwrap();
    let max_force = sim.config().max_force;

    for _ in 0..20 {
        sim.tick(&ctx.device, &ctx.queue, DT);
        let current = sim.read_boids(&ctx.device, &ctx.queue).unwrap();
        for (i, (before, after)) in previous.iter().zip(&current).enumerate() {
            let delta = (after.velocity - before.velocity).length();
            assert!(
                delta <= max_force * 1.0001,
                "boid {i} velocity changed by {delta} in one tick, cap is {max_force}"
            );
        }
        previous = current;
    }
}

#[test]
fn test_flock_stays_contained() {
    let Some(ctx) = gpu() else { return };

    // Spec scenario: 256 boids seeded in a unit sphere, 16-unit half-extents,
    // 100 ticks at 1/60. No boid may end up further than one tick's maximum
    // displacement past the wall.
    let config = FlockConfig::default().with_agent_count(WORKGROUP_SIZE);
    let half = config.wall.half_extents;
    let max_speed = config.max_speed;
    let mut sim = FlockSim::new(&ctx.device, config).unwrap();

    for _ in 0..100 {
        sim.tick(&ctx.device, &ctx.queue, DT);
    }

    let bound = half + Vec3::splat(max_speed * DT + 1e-4);
    let boids = sim.read_boids(&ctx.device, &ctx.queue).unwrap();
    for (i, boid) in boids.iter().enumerate() {
        let p = boid.position.abs();
        assert!(
            p.x <= bound.x && p.y <= bound.y && p.z <= bound.z,
            "boid {i} escaped to {:?}",
            boid.position
        );
    }
}

#[test]
fn test_seed_length_mismatch_is_rejected() {
    let Some(ctx) = gpu() else { return };

    let config = FlockConfig::default().with_agent_count(WORKGROUP_SIZE);
    let boids = vec![Boid::new(Vec3::ZERO, Vec3::ZERO); 10];
    match FlockSim::with_boids(&ctx.device, config, &boids) {
        Err(FlockError::Config(ConfigError::SeedLength { expected, got })) => {
            assert_eq!(expected, WORKGROUP_SIZE);
            assert_eq!(got, 10);
        }
        Err(other) => panic!("expected SeedLength error, got {other:?}"),
        Ok(_) => panic!("expected SeedLength error, got a simulation"),
    }
}
