//! The agent data model.
//!
//! A boid is a position and a velocity; its index in the flat agent array is
//! its only identity. [`BoidGpu`] is the `#[repr(C)]` mirror uploaded to the
//! GPU, padded so the struct matches WGSL storage-buffer layout exactly
//! (vec3 fields are 16-byte aligned, giving a 32-byte stride).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One simulated agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boid {
    /// Position in world units.
    pub position: Vec3,
    /// Velocity in world units per second.
    pub velocity: Vec3,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// Convert to the GPU representation.
    pub fn to_gpu(&self) -> BoidGpu {
        BoidGpu {
            position: self.position.to_array(),
            _pad0: 0.0,
            velocity: self.velocity.to_array(),
            _pad1: 0.0,
        }
    }

    /// Convert back from the GPU representation (used by readbacks).
    pub fn from_gpu(gpu: &BoidGpu) -> Self {
        Self {
            position: Vec3::from_array(gpu.position),
            velocity: Vec3::from_array(gpu.velocity),
        }
    }
}

/// GPU-side representation of a [`Boid`].
///
/// Layout must stay in sync with [`BOID_WGSL`]: `position` at offset 0,
/// `velocity` at offset 16, total size 32 bytes. The renderer relies on
/// these offsets when it binds the agent buffer as an instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BoidGpu {
    pub position: [f32; 3],
    _pad0: f32,
    pub velocity: [f32; 3],
    _pad1: f32,
}

/// WGSL declaration matching [`BoidGpu`].
pub const BOID_WGSL: &str = r#"
struct Boid {
    position: vec3<f32>,
    velocity: vec3<f32>,
};
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_size_multiple_of_16() {
        assert_eq!(std::mem::size_of::<BoidGpu>(), 32);
    }

    #[test]
    fn test_gpu_struct_field_offsets() {
        // The renderer's instance attributes point at these offsets.
        assert_eq!(std::mem::offset_of!(BoidGpu, position), 0);
        assert_eq!(std::mem::offset_of!(BoidGpu, velocity), 16);
    }

    #[test]
    fn test_gpu_struct_is_pod() {
        fn assert_pod<T: bytemuck::Pod>() {}
        assert_pod::<BoidGpu>();
    }

    #[test]
    fn test_round_trip() {
        let boid = Boid::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.5, 0.25, 4.0));
        assert_eq!(Boid::from_gpu(&boid.to_gpu()), boid);
    }
}
