//! The simulation driver.
//!
//! [`FlockSim`] owns every buffer and pipeline of the tick pipeline and runs
//! the three stages in strict order: grid build, neighbor force evaluation,
//! integration. Each stage's storage writes are visible to the next because
//! all passes are recorded into one command encoder and wgpu orders them.
//!
//! The spec-level lifecycle (`Uninitialized → Ready → Tick* → Released`) is
//! carried by ownership: a constructed `FlockSim` is `Ready`, `tick` advances
//! it, and dropping it releases all GPU resources. Nothing can run after
//! release because the value no longer exists.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::boid::{Boid, BoidGpu};
use crate::config::{FlockConfig, RuleSet, WallParam};
use crate::error::{ConfigError, FlockError, GpuError};
use crate::gpu::read_buffer;
use crate::grid::GridSnapshot;
use crate::kernels;
use crate::spawn::Spawner;
use crate::WORKGROUP_SIZE;

/// Uniform parameter block. Layout must stay in sync with
/// [`kernels::SIM_PARAMS_WGSL`].
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SimParamsGpu {
    wall_center: [f32; 3],
    agent_count: u32,
    wall_half_extents: [f32; 3],
    cell_capacity: u32,
    grid_dims: [u32; 3],
    _pad0: u32,
    cohesion_radius: f32,
    cohesion_weight: f32,
    alignment_radius: f32,
    alignment_weight: f32,
    separation_radius: f32,
    separation_weight: f32,
    avoid_weight: f32,
    max_speed: f32,
    max_force: f32,
    delta_time: f32,
    _pad1: f32,
    _pad2: f32,
}

/// A running flocking simulation.
pub struct FlockSim {
    config: FlockConfig,

    boid_buffer: wgpu::Buffer,
    force_buffer: wgpu::Buffer,
    cell_count_buffer: wgpu::Buffer,
    cell_slot_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,

    clear_pipeline: wgpu::ComputePipeline,
    grid_pipeline: wgpu::ComputePipeline,
    force_pipeline: wgpu::ComputePipeline,
    integrate_pipeline: wgpu::ComputePipeline,

    clear_bind_group: wgpu::BindGroup,
    grid_bind_group: wgpu::BindGroup,
    force_bind_group: wgpu::BindGroup,
    integrate_bind_group: wgpu::BindGroup,
}

impl FlockSim {
    /// Create a simulation seeded from the configuration's spawn parameters:
    /// random positions inside a sphere, small random velocities.
    pub fn new(device: &wgpu::Device, config: FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;
        let boids = Spawner::new(config.spawn_seed).flock(
            config.agent_count,
            config.wall.center,
            config.spawn_radius,
            config.spawn_speed,
        );
        Self::with_boids(device, config, &boids)
    }

    /// Create a simulation from a host-provided initial flock. `boids` must
    /// have exactly `config.agent_count` entries.
    pub fn with_boids(
        device: &wgpu::Device,
        config: FlockConfig,
        boids: &[Boid],
    ) -> Result<Self, FlockError> {
        config.validate()?;
        if boids.len() != config.agent_count as usize {
            return Err(ConfigError::SeedLength {
                expected: config.agent_count,
                got: boids.len(),
            }
            .into());
        }

        let cell_count = config.grid.cell_count();
        if config.grid.slot_count() < config.agent_count as u64 {
            log::warn!(
                "grid can hold {} agents but {} are configured; overflow is guaranteed",
                config.grid.slot_count(),
                config.agent_count
            );
        }

        let gpu_boids: Vec<BoidGpu> = boids.iter().map(|b| b.to_gpu()).collect();
        let boid_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Boid Buffer"),
            contents: bytemuck::cast_slice(&gpu_boids),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_SRC,
        });

        let force_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Force Buffer"),
            size: config.agent_count as u64 * 16,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let cell_count_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Count Buffer"),
            size: cell_count as u64 * std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let cell_slot_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Slot Buffer"),
            size: config.grid.slot_count() * std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sim Params"),
            contents: bytemuck::bytes_of(&gpu_params(&config, 0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let clear_pipeline =
            create_compute_pipeline(device, &kernels::clear_source(), "Clear Pipeline");
        let grid_pipeline =
            create_compute_pipeline(device, &kernels::grid_source(), "Grid Pipeline");
        let force_pipeline =
            create_compute_pipeline(device, &kernels::force_source(), "Force Pipeline");
        let integrate_pipeline =
            create_compute_pipeline(device, &kernels::integrate_source(), "Integrate Pipeline");

        let clear_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Clear Bind Group"),
            layout: &clear_pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: cell_count_buffer.as_entire_binding(),
            }],
        });

        let grid_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Grid Bind Group"),
            layout: &grid_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: boid_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: cell_count_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: cell_slot_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: params_buffer.as_entire_binding() },
            ],
        });

        let force_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Force Bind Group"),
            layout: &force_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: boid_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: cell_count_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: cell_slot_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: force_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: params_buffer.as_entire_binding() },
            ],
        });

        let integrate_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Integrate Bind Group"),
            layout: &integrate_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: boid_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: force_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: params_buffer.as_entire_binding() },
            ],
        });

        log::debug!(
            "flock sim ready: {} agents, {}x{}x{} grid, capacity {}",
            config.agent_count,
            config.grid.dims.x,
            config.grid.dims.y,
            config.grid.dims.z,
            config.grid.cell_capacity
        );

        Ok(Self {
            config,
            boid_buffer,
            force_buffer,
            cell_count_buffer,
            cell_slot_buffer,
            params_buffer,
            clear_pipeline,
            grid_pipeline,
            force_pipeline,
            integrate_pipeline,
            clear_bind_group,
            grid_bind_group,
            force_bind_group,
            integrate_bind_group,
        })
    }

    /// Advance the simulation by one tick of `delta_time` seconds.
    ///
    /// Records grid clear/build, force evaluation, and integration into one
    /// command encoder and submits it. Submissions execute in order, so the
    /// next tick cannot begin on the GPU before this one has committed.
    pub fn tick(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, delta_time: f32) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&gpu_params(&self.config, delta_time)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Flock Tick"),
        });

        let agent_groups = self.config.agent_count.div_ceil(WORKGROUP_SIZE);
        let cell_groups = self.config.grid.cell_count().div_ceil(WORKGROUP_SIZE);

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Grid Clear"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.clear_pipeline);
            pass.set_bind_group(0, &self.clear_bind_group, &[]);
            pass.dispatch_workgroups(cell_groups, 1, 1);
        }

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Grid Build"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.grid_pipeline);
            pass.set_bind_group(0, &self.grid_bind_group, &[]);
            pass.dispatch_workgroups(agent_groups, 1, 1);
        }

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Force"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.force_pipeline);
            pass.set_bind_group(0, &self.force_bind_group, &[]);
            pass.dispatch_workgroups(agent_groups, 1, 1);
        }

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Integrate"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.integrate_pipeline);
            pass.set_bind_group(0, &self.integrate_bind_group, &[]);
            pass.dispatch_workgroups(agent_groups, 1, 1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Number of agents. Fixed for the lifetime of the simulation; the
    /// renderer sizes its instance draws from this.
    pub fn agent_count(&self) -> u32 {
        self.config.agent_count
    }

    /// The active configuration.
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// The agent buffer (32-byte stride: position at 0, velocity at 16).
    /// Valid to read between ticks; the renderer binds it as an instance
    /// vertex buffer.
    pub fn boid_buffer(&self) -> &wgpu::Buffer {
        &self.boid_buffer
    }

    /// Replace the flocking rules; takes effect on the next tick.
    pub fn set_rules(&mut self, rules: RuleSet) -> Result<(), ConfigError> {
        for rule in [rules.cohesion, rules.alignment, rules.separation] {
            if rule.radius < 0.0 {
                return Err(ConfigError::NegativeRadius(rule.radius));
            }
        }
        self.config.rules = rules;
        Ok(())
    }

    /// Replace the wall geometry; takes effect on the next tick. The grid
    /// adapts automatically since cell sizes are derived from the wall box.
    pub fn set_wall(&mut self, wall: WallParam) -> Result<(), ConfigError> {
        if wall.half_extents.cmple(Vec3::ZERO).any() {
            return Err(ConfigError::WallExtents(wall.half_extents));
        }
        self.config.wall = wall;
        Ok(())
    }

    /// Replace the speed and steering caps; takes effect on the next tick.
    pub fn set_limits(&mut self, max_speed: f32, max_force: f32) -> Result<(), ConfigError> {
        if max_speed <= 0.0 {
            return Err(ConfigError::SpeedLimit(max_speed));
        }
        if max_force <= 0.0 {
            return Err(ConfigError::ForceLimit(max_force));
        }
        self.config.max_speed = max_speed;
        self.config.max_force = max_force;
        Ok(())
    }

    /// Read the current flock back to the host. Blocks on the GPU.
    pub fn read_boids(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Boid>, GpuError> {
        let bytes = read_buffer(
            device,
            queue,
            &self.boid_buffer,
            self.config.agent_count as u64 * std::mem::size_of::<BoidGpu>() as u64,
        )?;
        let gpu: &[BoidGpu] = bytemuck::cast_slice(&bytes);
        Ok(gpu.iter().map(Boid::from_gpu).collect())
    }

    /// Read the force buffer written by the latest tick. Blocks on the GPU.
    pub fn read_forces(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Vec3>, GpuError> {
        let bytes = read_buffer(
            device,
            queue,
            &self.force_buffer,
            self.config.agent_count as u64 * 16,
        )?;
        let rows: &[[f32; 4]] = bytemuck::cast_slice(&bytes);
        Ok(rows.iter().map(|r| Vec3::new(r[0], r[1], r[2])).collect())
    }

    /// Read the grid built by the latest tick. Blocks on the GPU.
    ///
    /// Mostly a diagnostic: hosts watching for persistent
    /// [`overflow`](GridSnapshot::overflowed) should raise the cell capacity
    /// or shrink the cells.
    pub fn read_grid(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<GridSnapshot, GpuError> {
        let count_bytes = read_buffer(
            device,
            queue,
            &self.cell_count_buffer,
            self.config.grid.cell_count() as u64 * 4,
        )?;
        let slot_bytes = read_buffer(
            device,
            queue,
            &self.cell_slot_buffer,
            self.config.grid.slot_count() * 4,
        )?;
        Ok(GridSnapshot {
            counts: bytemuck::cast_slice(&count_bytes).to_vec(),
            slots: bytemuck::cast_slice(&slot_bytes).to_vec(),
            spec: self.config.grid,
        })
    }
}

fn gpu_params(config: &FlockConfig, delta_time: f32) -> SimParamsGpu {
    SimParamsGpu {
        wall_center: config.wall.center.to_array(),
        agent_count: config.agent_count,
        wall_half_extents: config.wall.half_extents.to_array(),
        cell_capacity: config.grid.cell_capacity,
        grid_dims: config.grid.dims.to_array(),
        _pad0: 0,
        cohesion_radius: config.rules.cohesion.radius,
        cohesion_weight: config.rules.cohesion.weight,
        alignment_radius: config.rules.alignment.radius,
        alignment_weight: config.rules.alignment.weight,
        separation_radius: config.rules.separation.radius,
        separation_weight: config.rules.separation.weight,
        avoid_weight: config.wall.avoid_weight,
        max_speed: config.max_speed,
        max_force: config.max_force,
        delta_time,
        _pad1: 0.0,
        _pad2: 0.0,
    }
}

fn create_compute_pipeline(
    device: &wgpu::Device,
    source: &str,
    label: &str,
) -> wgpu::ComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: None, // Auto layout
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_block_matches_wgsl_layout() {
        // 3 vec4-sized rows + 12 scalars = 96 bytes, uniform-aligned.
        assert_eq!(std::mem::size_of::<SimParamsGpu>(), 96);
        assert_eq!(std::mem::offset_of!(SimParamsGpu, wall_half_extents), 16);
        assert_eq!(std::mem::offset_of!(SimParamsGpu, grid_dims), 32);
        assert_eq!(std::mem::offset_of!(SimParamsGpu, cohesion_radius), 48);
        assert_eq!(std::mem::offset_of!(SimParamsGpu, delta_time), 84);
    }
}
