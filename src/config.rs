//! Simulation configuration.
//!
//! One [`FlockConfig`] fully describes a simulation: population size, grid
//! shape, wall geometry, per-rule radii and weights, and the speed/force
//! caps. Defaults reproduce the classic tuning this engine grew out of: a
//! 32-unit wall box on an 8×8×8 grid, cohesion and alignment reaching 2
//! units, separation reaching 1 unit at triple weight.
//!
//! Configs are plain data. Build one with the chainable `with_*` setters,
//! validate happens inside [`FlockSim::new`](crate::FlockSim::new) before
//! any GPU buffer is created.

use glam::{UVec3, Vec3};

use crate::error::ConfigError;
use crate::grid::GridSpec;
use crate::WORKGROUP_SIZE;

/// Radius and weight of one flocking rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleParam {
    /// Neighborhood radius in world units.
    pub radius: f32,
    /// Strength of the rule's contribution to the steering force.
    pub weight: f32,
}

impl RuleParam {
    pub fn new(radius: f32, weight: f32) -> Self {
        Self { radius, weight }
    }
}

/// The three classic flocking rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleSet {
    pub cohesion: RuleParam,
    pub alignment: RuleParam,
    pub separation: RuleParam,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            cohesion: RuleParam::new(2.0, 1.0),
            alignment: RuleParam::new(2.0, 1.0),
            separation: RuleParam::new(1.0, 3.0),
        }
    }
}

impl RuleSet {
    /// Largest of the three rule radii; bounds the neighbor cell scan.
    pub fn max_radius(&self) -> f32 {
        self.cohesion
            .radius
            .max(self.alignment.radius)
            .max(self.separation.radius)
    }
}

/// Geometry and strength of the wall that keeps the flock bounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallParam {
    /// Scale of the restoring force applied per unit of overshoot.
    pub avoid_weight: f32,
    /// Center of the wall box.
    pub center: Vec3,
    /// Half-extents of the wall box per axis.
    pub half_extents: Vec3,
}

impl Default for WallParam {
    fn default() -> Self {
        Self {
            avoid_weight: 10.0,
            center: Vec3::ZERO,
            half_extents: Vec3::splat(16.0),
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug)]
pub struct FlockConfig {
    /// Number of agents. Must be a non-zero multiple of [`WORKGROUP_SIZE`]
    /// and never changes for the lifetime of a simulation.
    pub agent_count: u32,
    pub grid: GridSpec,
    pub rules: RuleSet,
    pub wall: WallParam,
    /// Velocity magnitude cap.
    pub max_speed: f32,
    /// Per-tick steering delta magnitude cap.
    pub max_force: f32,
    /// Radius of the sphere initial positions are drawn from.
    pub spawn_radius: f32,
    /// Scale of initial velocities.
    pub spawn_speed: f32,
    /// Seed for the spawn RNG; same seed, same initial flock.
    pub spawn_seed: u64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            agent_count: WORKGROUP_SIZE * 64,
            grid: GridSpec::default(),
            rules: RuleSet::default(),
            wall: WallParam::default(),
            max_speed: 5.0,
            max_force: 0.5,
            spawn_radius: 1.0,
            spawn_speed: 0.1,
            spawn_seed: 0,
        }
    }
}

impl FlockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of agents.
    pub fn with_agent_count(mut self, count: u32) -> Self {
        self.agent_count = count;
        self
    }

    /// Set the grid dimensions.
    pub fn with_grid_dims(mut self, dims: UVec3) -> Self {
        self.grid.dims = dims;
        self
    }

    /// Set the per-cell slot capacity.
    pub fn with_cell_capacity(mut self, capacity: u32) -> Self {
        self.grid.cell_capacity = capacity;
        self
    }

    /// Set the three flocking rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Set the wall geometry and avoidance weight.
    pub fn with_wall(mut self, wall: WallParam) -> Self {
        self.wall = wall;
        self
    }

    /// Set the velocity and steering caps.
    pub fn with_limits(mut self, max_speed: f32, max_force: f32) -> Self {
        self.max_speed = max_speed;
        self.max_force = max_force;
        self
    }

    /// Set the spawn sphere radius, initial speed scale, and RNG seed.
    pub fn with_spawn(mut self, radius: f32, speed: f32, seed: u64) -> Self {
        self.spawn_radius = radius;
        self.spawn_speed = speed;
        self.spawn_seed = seed;
        self
    }

    /// Check the configuration. Called by the driver before any buffer is
    /// allocated; a failure here leaves nothing behind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 || self.agent_count % WORKGROUP_SIZE != 0 {
            return Err(ConfigError::AgentCount(self.agent_count));
        }
        if self.grid.dims.cmpeq(UVec3::ZERO).any() {
            return Err(ConfigError::GridDims(self.grid.dims));
        }
        if self.grid.cell_capacity == 0 {
            return Err(ConfigError::CellCapacity);
        }
        if self.wall.half_extents.cmple(Vec3::ZERO).any() {
            return Err(ConfigError::WallExtents(self.wall.half_extents));
        }
        for rule in [self.rules.cohesion, self.rules.alignment, self.rules.separation] {
            if rule.radius < 0.0 {
                return Err(ConfigError::NegativeRadius(rule.radius));
            }
        }
        if self.max_speed <= 0.0 {
            return Err(ConfigError::SpeedLimit(self.max_speed));
        }
        if self.max_force <= 0.0 {
            return Err(ConfigError::ForceLimit(self.max_force));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(FlockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_agent_count_must_be_workgroup_multiple() {
        let config = FlockConfig::default().with_agent_count(100);
        assert!(matches!(config.validate(), Err(ConfigError::AgentCount(100))));

        let config = FlockConfig::default().with_agent_count(0);
        assert!(matches!(config.validate(), Err(ConfigError::AgentCount(0))));

        let config = FlockConfig::default().with_agent_count(WORKGROUP_SIZE * 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_grid_dims_must_be_positive() {
        let config = FlockConfig::default().with_grid_dims(UVec3::new(8, 0, 8));
        assert!(matches!(config.validate(), Err(ConfigError::GridDims(_))));
    }

    #[test]
    fn test_cell_capacity_must_be_positive() {
        let config = FlockConfig::default().with_cell_capacity(0);
        assert!(matches!(config.validate(), Err(ConfigError::CellCapacity)));
    }

    #[test]
    fn test_wall_extents_must_be_positive() {
        let config = FlockConfig::default().with_wall(WallParam {
            half_extents: Vec3::new(16.0, -1.0, 16.0),
            ..WallParam::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::WallExtents(_))));
    }

    #[test]
    fn test_limits_must_be_positive() {
        let config = FlockConfig::default().with_limits(0.0, 0.5);
        assert!(matches!(config.validate(), Err(ConfigError::SpeedLimit(_))));

        let config = FlockConfig::default().with_limits(5.0, -0.5);
        assert!(matches!(config.validate(), Err(ConfigError::ForceLimit(_))));
    }

    #[test]
    fn test_max_radius() {
        let rules = RuleSet::default();
        assert_eq!(rules.max_radius(), 2.0);
    }
}
