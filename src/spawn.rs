//! Initial flock seeding.
//!
//! New simulations start with agents at random positions inside a bounded
//! sphere and small random velocities. The RNG is seeded from the
//! configuration so the same seed always produces the same flock.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

use crate::boid::Boid;

/// Deterministic spawn helper over a seeded RNG.
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random point inside a sphere of the given radius, centered at origin.
    pub fn in_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = self.rng.gen_range(0.0..PI);
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();

        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    }

    /// Seed a flock: positions inside a sphere of `position_radius` around
    /// `center`, velocities inside a sphere of `speed`.
    pub fn flock(&mut self, count: u32, center: Vec3, position_radius: f32, speed: f32) -> Vec<Boid> {
        (0..count)
            .map(|_| Boid {
                position: center + self.in_sphere(position_radius),
                velocity: self.in_sphere(speed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_sphere_stays_inside() {
        let mut spawner = Spawner::new(42);
        for _ in 0..1000 {
            assert!(spawner.in_sphere(2.5).length() <= 2.5 + 1e-5);
        }
    }

    #[test]
    fn test_same_seed_same_flock() {
        let a = Spawner::new(7).flock(64, Vec3::ZERO, 1.0, 0.1);
        let b = Spawner::new(7).flock(64, Vec3::ZERO, 1.0, 0.1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flock_len_and_speed() {
        let flock = Spawner::new(0).flock(128, Vec3::splat(3.0), 1.0, 0.1);
        assert_eq!(flock.len(), 128);
        for boid in &flock {
            assert!((boid.position - Vec3::splat(3.0)).length() <= 1.0 + 1e-5);
            assert!(boid.velocity.length() <= 0.1 + 1e-6);
        }
    }
}
