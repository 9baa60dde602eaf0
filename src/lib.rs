//! # Murmuration
//!
//! Grid-accelerated GPU flocking (boids) simulations.
//!
//! A fixed population of agents lives in flat GPU buffers. Every tick runs
//! three data-parallel stages in strict order:
//!
//! 1. **Grid** — each agent is binned into a uniform 3D grid over the wall
//!    volume (fixed per-cell capacity, one atomic counter per cell).
//! 2. **Force** — each agent scans only the grid cells that can contain
//!    in-radius neighbors and accumulates cohesion, alignment, separation,
//!    and wall-avoidance steering.
//! 3. **Integrate** — the steering delta is capped by `max_force`, speed by
//!    `max_speed`, and positions advance by the host-supplied `delta_time`.
//!
//! The agent buffer doubles as an instance vertex buffer, so a
//! [`FlockRenderer`] draws the whole flock in one instanced draw call.
//!
//! ## Quick Start
//!
//! ```ignore
//! use murmuration::prelude::*;
//!
//! let gpu = pollster::block_on(GpuContext::new())?;
//! let config = FlockConfig::default().with_agent_count(4096);
//! let mut sim = FlockSim::new(&gpu.device, config)?;
//!
//! // In your frame loop:
//! sim.tick(&gpu.device, &gpu.queue, 1.0 / 60.0);
//! let boids = sim.read_boids(&gpu.device, &gpu.queue)?;
//! ```
//!
//! Run the windowed demo with: `cargo run --example flock`
//!
//! ## Tuning
//!
//! Rule radii, weights, and the wall box are live-tunable between ticks via
//! [`FlockSim::set_rules`] / [`FlockSim::set_wall`] / [`FlockSim::set_limits`].
//! A grid cell that fills past its capacity silently drops the excess for
//! that tick; hosts seeing persistent overflow (via
//! [`FlockSim::read_grid`]) should raise
//! [`GridSpec::cell_capacity`] or use more, smaller cells.

pub mod boid;
pub mod config;
pub mod error;
pub mod gpu;
pub mod grid;
pub mod kernels;
pub mod render;
pub mod sim;
pub mod spawn;
pub mod time;

pub use boid::{Boid, BoidGpu};
pub use bytemuck;
pub use config::{FlockConfig, RuleParam, RuleSet, WallParam};
pub use error::{ConfigError, FlockError, GpuError};
pub use glam::{UVec3, Vec3};
pub use gpu::GpuContext;
pub use grid::{GridSnapshot, GridSpec};
pub use render::{Camera, FlockRenderer};
pub use sim::FlockSim;
pub use spawn::Spawner;

/// Width of one compute work-group; the agent count must be a multiple of
/// this. Matches the `@workgroup_size` of every kernel.
pub const WORKGROUP_SIZE: u32 = 256;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::boid::Boid;
    pub use crate::config::{FlockConfig, RuleParam, RuleSet, WallParam};
    pub use crate::error::{ConfigError, FlockError, GpuError};
    pub use crate::gpu::GpuContext;
    pub use crate::grid::GridSpec;
    pub use crate::render::{Camera, FlockRenderer};
    pub use crate::sim::FlockSim;
    pub use crate::spawn::Spawner;
    pub use crate::time::Time;
    pub use crate::{UVec3, Vec3};
}
