//! Decoded point sets and the global normalization transform.

use constants::{BOUNDS_CHUNK_SIZE, NORMALIZED_EXTENT, remap_axes};
use rayon::prelude::*;

use crate::bounds::CloudBounds;
use crate::error::{CloudError, CloudResult};
use crate::math::Vec3;
use crate::mesh::Mesh;

/// A flat sequence of decoded 3D points, no connectivity.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub points: Vec<[f64; 3]>,
}

impl PointCloud {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounding box, reduced over parallel chunks.
    pub fn bounds(&self) -> CloudBounds {
        self.points
            .par_chunks(BOUNDS_CHUNK_SIZE)
            .map(|chunk| {
                let mut local_bounds = CloudBounds::new();
                for &[x, y, z] in chunk {
                    local_bounds.update(x, y, z);
                }
                local_bounds
            })
            .reduce_with(CloudBounds::merge)
            .unwrap_or_default()
    }

    /// Apply the fixed global normalization transform in place:
    /// translate by the bounding-box centre, uniformly rescale so the
    /// longest diagonal spans [`NORMALIZED_EXTENT`] units, then remap the
    /// survey's Z-up axes into the display's Y-up convention.
    ///
    /// The convention is deliberately not configurable. Returns the
    /// pre-transform bounds.
    pub fn normalize(&mut self) -> CloudResult<CloudBounds> {
        if self.points.is_empty() {
            return Err(CloudError::EmptyCloud);
        }

        let bounds = self.bounds();
        let (cx, cy, cz) = bounds.center();
        let diagonal = bounds.diagonal();
        // A cloud of coincident points has nothing to rescale.
        let scale = if diagonal > 0.0 {
            NORMALIZED_EXTENT / diagonal
        } else {
            1.0
        };

        for point in &mut self.points {
            let x = (point[0] - cx) * scale;
            let y = (point[1] - cy) * scale;
            let z = (point[2] - cz) * scale;
            let (x, y, z) = remap_axes(x, y, z);
            *point = [x, y, z];
        }

        Ok(bounds)
    }

    /// Hand the positions off as a point-only mesh.
    pub fn into_mesh(self) -> Mesh {
        let positions = self
            .points
            .into_iter()
            .map(|[x, y, z]| Vec3::new(x as f32, y as f32, z as f32))
            .collect();
        Mesh::from_points(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn normalization_hits_target_diagonal_and_origin() {
        let mut cloud = PointCloud::new(vec![
            [10.0, 20.0, 30.0],
            [14.0, 20.0, 30.0],
            [10.0, 23.0, 30.0],
            [14.0, 23.0, 42.0],
        ]);
        cloud.normalize().unwrap();

        let bounds = cloud.bounds();
        assert!((bounds.diagonal() - NORMALIZED_EXTENT).abs() < EPSILON);

        let (cx, cy, cz) = bounds.center();
        assert!(cx.abs() < EPSILON);
        assert!(cy.abs() < EPSILON);
        assert!(cz.abs() < EPSILON);
    }

    #[test]
    fn up_axis_is_remapped() {
        // Two points separated purely along survey Z.
        let mut cloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 10.0]]);
        cloud.normalize().unwrap();

        let high = cloud.points[1];
        let low = cloud.points[0];
        // Elevation must land on display Y, with X untouched.
        assert!(high[1] > low[1]);
        assert!((high[0] - low[0]).abs() < EPSILON);
        assert!((high[2] - low[2]).abs() < EPSILON);
        assert!((high[1] - low[1] - NORMALIZED_EXTENT).abs() < EPSILON);
    }

    #[test]
    fn remap_flips_depth_sign() {
        // Survey +Y should become display -Z.
        let mut cloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [0.0, 10.0, 0.0]]);
        cloud.normalize().unwrap();

        assert!(cloud.points[1][2] < cloud.points[0][2]);
    }

    #[test]
    fn empty_cloud_is_fatal() {
        let mut cloud = PointCloud::default();
        assert!(matches!(cloud.normalize(), Err(CloudError::EmptyCloud)));
    }

    #[test]
    fn coincident_points_skip_rescale() {
        let mut cloud = PointCloud::new(vec![[5.0, 5.0, 5.0], [5.0, 5.0, 5.0]]);
        cloud.normalize().unwrap();

        // Recentred to the origin, no division by the zero diagonal.
        for point in &cloud.points {
            assert!(point.iter().all(|c| c.abs() < EPSILON));
        }
    }

    #[test]
    fn into_mesh_moves_positions_only() {
        let cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]]);
        let mesh = cloud.into_mesh();

        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions[0], Vec3::new(1.0, 2.0, 3.0));
        assert!(mesh.indices.is_empty());
        assert!(mesh.normals.is_empty());
    }
}
