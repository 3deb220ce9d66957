/// Shared configuration for the geometry construction and ingestion pipeline

pub mod coordinate_system;

pub use coordinate_system::{COORDINATE_TRANSFORM, remap_axes};

/// Longest bounding-box diagonal of a normalized point cloud (world units)
pub const NORMALIZED_EXTENT: f64 = 100.0;

/// Chunk size for the parallel bounds reduction over decoded points
pub const BOUNDS_CHUNK_SIZE: usize = 25_000;

/// Flat placeholder colour assigned to generated terrain before texturing
pub const TERRAIN_PLACEHOLDER_COLOUR: [f32; 3] = [0.5, 0.5, 0.5];

/// Point count reported to progress bars between redraws
pub const PROGRESS_UPDATE_INTERVAL: usize = 10_000;
