//! Uniform spatial grid over the wall volume.
//!
//! The grid is a fixed `W × H × D` lattice covering the wall box. Per tick it
//! is rebuilt from scratch on the GPU into an arena-style pair of buffers:
//! one atomic occupancy counter per cell, plus a flat slot table indexed
//! `cell * capacity + slot`. This module holds the host-side description and
//! CPU mirrors of the kernel's cell math, so hosts and tests can size buffers
//! and interpret readbacks without touching the GPU.

use glam::{UVec3, Vec3};

use crate::config::WallParam;

/// Dimensions and per-cell capacity of the spatial grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpec {
    /// Number of cells per axis.
    pub dims: UVec3,
    /// Fixed number of agent slots per cell. Agents hashing into a full cell
    /// are dropped from neighbor consideration for that tick only.
    pub cell_capacity: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            dims: UVec3::splat(8),
            cell_capacity: 64,
        }
    }
}

impl GridSpec {
    pub fn new(dims: UVec3, cell_capacity: u32) -> Self {
        Self { dims, cell_capacity }
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> u32 {
        self.dims.x * self.dims.y * self.dims.z
    }

    /// Total number of entries in the slot table.
    pub fn slot_count(&self) -> u64 {
        self.cell_count() as u64 * self.cell_capacity as u64
    }

    /// World-unit size of one cell along each axis.
    pub fn cell_size(&self, wall: &WallParam) -> Vec3 {
        (wall.half_extents * 2.0) / self.dims.as_vec3()
    }

    /// Cell coordinate for a position. Positions outside the wall volume are
    /// clamped to the nearest boundary cell rather than dropped, so an agent
    /// that momentarily escapes keeps participating until wall avoidance
    /// pulls it back.
    ///
    /// Mirrors `cell_coord` in the WGSL kernels exactly.
    pub fn cell_coord(&self, wall: &WallParam, position: Vec3) -> UVec3 {
        let rel = (position - wall.center + wall.half_extents) / self.cell_size(wall);
        let top = self.dims.as_vec3() - Vec3::ONE;
        rel.clamp(Vec3::ZERO, top).as_uvec3()
    }

    /// Row-major flattening of a cell coordinate into `[0, cell_count)`.
    ///
    /// Mirrors `cell_index` in the WGSL kernels exactly.
    pub fn cell_index(&self, cell: UVec3) -> u32 {
        cell.x + cell.y * self.dims.x + cell.z * self.dims.x * self.dims.y
    }

    /// Number of cells to scan outward from an agent's own cell, per axis,
    /// so that every agent within `radius` is guaranteed to be visited.
    /// A radius larger than one cell width widens the block beyond 3×3×3.
    pub fn scan_span(&self, wall: &WallParam, radius: f32) -> UVec3 {
        let cs = self.cell_size(wall);
        UVec3::new(
            (radius / cs.x).ceil() as u32,
            (radius / cs.y).ceil() as u32,
            (radius / cs.z).ceil() as u32,
        )
    }
}

/// A host-side copy of the grid buffers, produced by
/// [`FlockSim::read_grid`](crate::FlockSim::read_grid).
///
/// `counts` holds the raw occupancy counters; a counter larger than the cell
/// capacity records how many insertions were attempted, of which only the
/// first `capacity` landed in the slot table.
#[derive(Clone, Debug)]
pub struct GridSnapshot {
    pub counts: Vec<u32>,
    pub slots: Vec<u32>,
    pub spec: GridSpec,
}

impl GridSnapshot {
    /// Agent indices stored in a cell's bucket this tick.
    pub fn bucket(&self, cell: u32) -> &[u32] {
        let capacity = self.spec.cell_capacity;
        let occupancy = self.counts[cell as usize].min(capacity) as usize;
        let start = cell as usize * capacity as usize;
        &self.slots[start..start + occupancy]
    }

    /// Whether any cell attempted more insertions than its capacity.
    pub fn overflowed(&self) -> bool {
        self.counts.iter().any(|&c| c > self.spec.cell_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> WallParam {
        WallParam {
            avoid_weight: 10.0,
            center: Vec3::ZERO,
            half_extents: Vec3::splat(16.0),
        }
    }

    #[test]
    fn test_cell_size() {
        let spec = GridSpec::default();
        assert_eq!(spec.cell_size(&wall()), Vec3::splat(4.0));
    }

    #[test]
    fn test_cell_index_row_major() {
        let spec = GridSpec::default();
        assert_eq!(spec.cell_index(UVec3::new(0, 0, 0)), 0);
        assert_eq!(spec.cell_index(UVec3::new(1, 0, 0)), 1);
        assert_eq!(spec.cell_index(UVec3::new(0, 1, 0)), 8);
        assert_eq!(spec.cell_index(UVec3::new(0, 0, 1)), 64);
        assert_eq!(spec.cell_index(UVec3::new(7, 7, 7)), 511);
    }

    #[test]
    fn test_cell_ids_in_range_for_arbitrary_positions() {
        let spec = GridSpec::default();
        let wall = wall();
        // Includes positions far outside the wall volume.
        let mut x = -200.0_f32;
        while x < 200.0 {
            let p = Vec3::new(x, x * 0.5, -x * 1.3);
            let id = spec.cell_index(spec.cell_coord(&wall, p));
            assert!(id < spec.cell_count());
            x += 7.3;
        }
    }

    #[test]
    fn test_out_of_volume_positions_clamp_to_boundary_cells() {
        let spec = GridSpec::default();
        let wall = wall();
        assert_eq!(
            spec.cell_coord(&wall, Vec3::new(100.0, 100.0, 100.0)),
            UVec3::new(7, 7, 7)
        );
        assert_eq!(
            spec.cell_coord(&wall, Vec3::new(-100.0, 0.0, 0.0)),
            UVec3::new(0, 4, 4)
        );
    }

    #[test]
    fn test_translation_reproducible() {
        let spec = GridSpec::default();
        let wall_a = wall();
        let shift = Vec3::new(31.0, -4.5, 12.25);
        let wall_b = WallParam {
            center: wall_a.center + shift,
            ..wall_a
        };
        let mut checked = 0;
        for i in 0..64 {
            let p = Vec3::new(i as f32 * 0.41 - 13.0, (i % 9) as f32 - 3.5, i as f32 * -0.23);
            // Samples sitting on a cell boundary may flip cells from float
            // rounding alone; the invariant holds everywhere else.
            let rel = (p - wall_a.center + wall_a.half_extents) / spec.cell_size(&wall_a);
            if rel.to_array().iter().any(|v| (v - v.round()).abs() < 1e-3) {
                continue;
            }
            assert_eq!(
                spec.cell_coord(&wall_a, p),
                spec.cell_coord(&wall_b, p + shift)
            );
            checked += 1;
        }
        assert!(checked > 32);
    }

    #[test]
    fn test_scan_span_matches_radius() {
        let spec = GridSpec::default();
        let wall = wall();
        // Default tuning: radius 2 against 4-unit cells is the 3x3x3 block.
        assert_eq!(spec.scan_span(&wall, 2.0), UVec3::splat(1));
        // A radius wider than one cell expands the block.
        assert_eq!(spec.scan_span(&wall, 5.0), UVec3::splat(2));
    }

    #[test]
    fn test_snapshot_bucket_clamps_overflowed_counts() {
        let spec = GridSpec::new(UVec3::new(2, 1, 1), 2);
        let snapshot = GridSnapshot {
            counts: vec![5, 1],
            slots: vec![3, 9, 4, 0],
            spec,
        };
        assert_eq!(snapshot.bucket(0), &[3, 9]);
        assert_eq!(snapshot.bucket(1), &[4]);
        assert!(snapshot.overflowed());
    }
}
