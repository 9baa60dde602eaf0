//! Error types for murmuration.
//!
//! Configuration and GPU-resource failures abort initialization and surface
//! here; per-tick numerical edge cases (empty neighborhoods, coincident
//! agents, full grid cells) are absorbed inside the kernels and never become
//! errors.

use std::fmt;

use glam::{UVec3, Vec3};

/// Errors detected while validating a [`FlockConfig`](crate::FlockConfig).
///
/// All of these are fatal at initialization time and are reported before any
/// GPU buffer is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Agent count is zero or not a multiple of the work-group width.
    AgentCount(u32),
    /// A grid dimension is zero.
    GridDims(UVec3),
    /// Per-cell slot capacity is zero.
    CellCapacity,
    /// A wall half-extent is zero or negative.
    WallExtents(Vec3),
    /// A rule radius is negative.
    NegativeRadius(f32),
    /// Maximum speed is zero or negative.
    SpeedLimit(f32),
    /// Maximum steering force is zero or negative.
    ForceLimit(f32),
    /// A host-provided seed flock does not match the configured agent count.
    SeedLength { expected: u32, got: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::AgentCount(n) => write!(
                f,
                "agent count {} must be a non-zero multiple of {}",
                n,
                crate::WORKGROUP_SIZE
            ),
            ConfigError::GridDims(dims) => {
                write!(f, "grid dimensions {:?} must all be positive", dims)
            }
            ConfigError::CellCapacity => write!(f, "cell capacity must be positive"),
            ConfigError::WallExtents(e) => {
                write!(f, "wall half-extents {:?} must all be positive", e)
            }
            ConfigError::NegativeRadius(r) => write!(f, "rule radius {} must not be negative", r),
            ConfigError::SpeedLimit(s) => write!(f, "max speed {} must be positive", s),
            ConfigError::ForceLimit(s) => write!(f, "max force {} must be positive", s),
            ConfigError::SeedLength { expected, got } => write!(
                f,
                "seed flock has {} boids but the configuration expects {}",
                got, expected
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when talking to the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map a buffer for reading.
    BufferMapping(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Top-level error returned by the simulation driver.
#[derive(Debug)]
pub enum FlockError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// GPU initialization or readback failed.
    Gpu(GpuError),
}

impl fmt::Display for FlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlockError::Config(e) => write!(f, "invalid configuration: {}", e),
            FlockError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for FlockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlockError::Config(e) => Some(e),
            FlockError::Gpu(e) => Some(e),
        }
    }
}

impl From<ConfigError> for FlockError {
    fn from(e: ConfigError) -> Self {
        FlockError::Config(e)
    }
}

impl From<GpuError> for FlockError {
    fn from(e: GpuError) -> Self {
        FlockError::Gpu(e)
    }
}
