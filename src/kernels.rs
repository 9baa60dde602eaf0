//! WGSL sources for the per-tick compute pipeline.
//!
//! One tick runs four dispatches in strict order, each consuming the
//! previous stage's freshly written buffers:
//!
//! 1. `clear`     — reset every cell's occupancy counter (one thread per cell)
//! 2. `grid`      — bin every agent into its cell (one thread per agent)
//! 3. `force`     — accumulate steering forces from grid-bounded neighbors
//! 4. `integrate` — apply the capped steering delta and advance positions
//!
//! The per-cell `atomicAdd` in the grid build is the only synchronization
//! primitive in the whole pipeline. Sources are composed from shared
//! fragments so the cell math exists exactly once; the Rust mirrors live in
//! [`crate::grid`].

use crate::boid::BOID_WGSL;

/// Uniform parameter block shared by every kernel.
///
/// Layout must stay in sync with `SimParamsGpu` in `sim.rs`.
pub const SIM_PARAMS_WGSL: &str = r#"
struct SimParams {
    wall_center: vec3<f32>,
    agent_count: u32,
    wall_half_extents: vec3<f32>,
    cell_capacity: u32,
    grid_dims: vec3<u32>,
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
};
"#;

/// Cell math shared by the grid and force kernels. Positions outside the
/// wall volume clamp to boundary cells; flattening is row-major.
const CELL_MATH_WGSL: &str = r#"
fn cell_size() -> vec3<f32> {
    return (params.wall_half_extents * 2.0) / vec3<f32>(params.grid_dims);
}

fn cell_coord(pos: vec3<f32>) -> vec3<u32> {
    let rel = (pos - params.wall_center + params.wall_half_extents) / cell_size();
    let top = vec3<f32>(params.grid_dims) - vec3<f32>(1.0);
    return vec3<u32>(clamp(rel, vec3<f32>(0.0), top));
}

fn cell_index(cell: vec3<u32>) -> u32 {
    return cell.x + cell.y * params.grid_dims.x + cell.z * params.grid_dims.x * params.grid_dims.y;
}
"#;

/// Vector helpers. Both return zero-safe results so degenerate inputs
/// (empty neighborhoods, coincident agents) contribute nothing instead of
/// producing NaNs.
const VEC_HELPERS_WGSL: &str = r#"
fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len_sq = dot(v, v);
    if len_sq > 1e-12 {
        return v / sqrt(len_sq);
    }
    return vec3<f32>(0.0);
}

fn limit(v: vec3<f32>, max_len: f32) -> vec3<f32> {
    let len_sq = dot(v, v);
    if len_sq > max_len * max_len && len_sq > 1e-12 {
        return v * (max_len / sqrt(len_sq));
    }
    return v;
}
"#;

const CLEAR_BODY_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read_write> cell_counts: array<atomic<u32>>;

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let index = global_id.x;
    if index < arrayLength(&cell_counts) {
        atomicStore(&cell_counts[index], 0u);
    }
}
"#;

const GRID_BODY_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read> boids: array<Boid>;
@group(0) @binding(1) var<storage, read_write> cell_counts: array<atomic<u32>>;
@group(0) @binding(2) var<storage, read_write> cell_slots: array<u32>;
@group(0) @binding(3) var<uniform> params: SimParams;

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let index = global_id.x;
    if index >= params.agent_count {
        return;
    }

    let cell = cell_index(cell_coord(boids[index].position));
    let slot = atomicAdd(&cell_counts[cell], 1u);
    // Insertions past the cell's capacity are dropped for this tick; the
    // counter still records the attempt so hosts can observe overflow.
    if slot < params.cell_capacity {
        cell_slots[cell * params.cell_capacity + slot] = index;
    }
}
"#;

const FORCE_BODY_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read> boids: array<Boid>;
@group(0) @binding(1) var<storage, read> cell_counts: array<u32>;
@group(0) @binding(2) var<storage, read> cell_slots: array<u32>;
@group(0) @binding(3) var<storage, read_write> forces: array<vec3<f32>>;
@group(0) @binding(4) var<uniform> params: SimParams;

fn avoid_walls(pos: vec3<f32>) -> vec3<f32> {
    let rel = pos - params.wall_center;
    let overshoot = abs(rel) - params.wall_half_extents;
    let outside = overshoot > vec3<f32>(0.0);
    // Restoring force proportional to how far past the wall the agent is.
    let restoring = -sign(rel) * overshoot * params.avoid_weight;
    return select(vec3<f32>(0.0), restoring, outside);
}

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let index = global_id.x;
    if index >= params.agent_count {
        return;
    }

    let pos = boids[index].position;

    let cohesion_sq = params.cohesion_radius * params.cohesion_radius;
    let alignment_sq = params.alignment_radius * params.alignment_radius;
    let separation_sq = params.separation_radius * params.separation_radius;

    var cohesion_sum = vec3<f32>(0.0);
    var alignment_sum = vec3<f32>(0.0);
    var separation_sum = vec3<f32>(0.0);
    var cohesion_count = 0u;
    var alignment_count = 0u;
    var separation_count = 0u;

    // Scan the block of cells that can contain any in-radius neighbor.
    let max_radius = max(params.cohesion_radius, max(params.alignment_radius, params.separation_radius));
    let span = vec3<i32>(ceil(vec3<f32>(max_radius) / cell_size()));
    let home = vec3<i32>(cell_coord(pos));
    let lo = max(home - span, vec3<i32>(0));
    let hi = min(home + span, vec3<i32>(params.grid_dims) - vec3<i32>(1));

    for (var z = lo.z; z <= hi.z; z++) {
        for (var y = lo.y; y <= hi.y; y++) {
            for (var x = lo.x; x <= hi.x; x++) {
                let cell = cell_index(vec3<u32>(vec3<i32>(x, y, z)));
                let occupancy = min(cell_counts[cell], params.cell_capacity);
                for (var slot = 0u; slot < occupancy; slot++) {
                    let other = cell_slots[cell * params.cell_capacity + slot];
                    if other == index {
                        continue;
                    }
                    let other_pos = boids[other].position;
                    let offset = other_pos - pos;
                    let dist_sq = dot(offset, offset);
                    if dist_sq < cohesion_sq {
                        cohesion_sum += other_pos;
                        cohesion_count += 1u;
                    }
                    if dist_sq < alignment_sq {
                        alignment_sum += boids[other].velocity;
                        alignment_count += 1u;
                    }
                    if dist_sq < separation_sq && dist_sq > 1e-8 {
                        separation_sum -= offset / dist_sq;
                        separation_count += 1u;
                    }
                }
            }
        }
    }

    var force = vec3<f32>(0.0);
    if cohesion_count > 0u {
        let center = cohesion_sum / f32(cohesion_count);
        force += safe_normalize(center - pos) * params.cohesion_weight;
    }
    if alignment_count > 0u {
        force += safe_normalize(alignment_sum / f32(alignment_count)) * params.alignment_weight;
    }
    if separation_count > 0u {
        force += safe_normalize(separation_sum) * params.separation_weight;
    }
    force += avoid_walls(pos);

    forces[index] = force;
}
"#;

const INTEGRATE_BODY_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read_write> boids: array<Boid>;
@group(0) @binding(1) var<storage, read> forces: array<vec3<f32>>;
@group(0) @binding(2) var<uniform> params: SimParams;

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let index = global_id.x;
    if index >= params.agent_count {
        return;
    }

    var b = boids[index];
    // Speed-cap the desired velocity first, then cap the actual steering
    // delta, so a capped speed can never hide an unbounded turn.
    let desired = limit(b.velocity + forces[index], params.max_speed);
    let steer = limit(desired - b.velocity, params.max_force);
    b.velocity = limit(b.velocity + steer, params.max_speed);
    b.position += b.velocity * params.delta_time;
    boids[index] = b;
}
"#;

/// Source for the cell-counter clear pass.
pub fn clear_source() -> String {
    CLEAR_BODY_WGSL.to_string()
}

/// Source for the grid build pass.
pub fn grid_source() -> String {
    format!("{BOID_WGSL}\n{SIM_PARAMS_WGSL}\n{CELL_MATH_WGSL}\n{GRID_BODY_WGSL}")
}

/// Source for the neighbor force pass.
pub fn force_source() -> String {
    format!("{BOID_WGSL}\n{SIM_PARAMS_WGSL}\n{CELL_MATH_WGSL}\n{VEC_HELPERS_WGSL}\n{FORCE_BODY_WGSL}")
}

/// Source for the integration pass.
pub fn integrate_source() -> String {
    format!("{BOID_WGSL}\n{SIM_PARAMS_WGSL}\n{VEC_HELPERS_WGSL}\n{INTEGRATE_BODY_WGSL}")
}
