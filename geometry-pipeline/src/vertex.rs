//! Per-triangle vertex model and tangent-space computation.

use crate::error::{MeshError, MeshResult};
use crate::math::{Vec2, Vec3};

/// A single mesh corner while a triangle is being built.
///
/// `normal`, `tangent` and `bitangent` are accumulators: the mesh builder
/// sums them across every face that merges into the same vertex slot and
/// renormalizes once at finalization. The merged vertex's index lives in
/// the builder's dedup map, not here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
    pub color: Vec3,
}

impl Vertex {
    /// Vertex at a position with every other attribute zeroed.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Three vertices with significant winding order.
///
/// Winding defines the face normal direction; no operation on a triangle
/// reorders its corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
}

impl Triangle {
    pub const fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self { a, b, c }
    }

    /// Shift all three positions by an offset.
    pub fn translate(&mut self, offset: Vec3) {
        self.a.position += offset;
        self.b.position += offset;
        self.c.position += offset;
    }

    /// Uniform colour on all three vertices.
    pub fn set_color(&mut self, color: Vec3) {
        self.a.color = color;
        self.b.color = color;
        self.c.color = color;
    }

    /// Assign UVs proportionally to a reference planar extent, merging the
    /// triangle into a single texture face.
    ///
    /// Each vertex's UV becomes `position.xy / extent`. Valid only when all
    /// positions lie within `[0, extent]`; violating that produces
    /// out-of-range UVs, not an error.
    pub fn merge_face(&mut self, extent: f32) {
        self.a.uv = self.a.position.xy() / extent;
        self.b.uv = self.b.position.xy() / extent;
        self.c.uv = self.c.position.xy() / extent;
    }

    /// Solve the tangent frame from edge vectors and UV deltas, writing the
    /// unnormalized tangent, bitangent and face normal to all three
    /// vertices.
    ///
    /// Normalization happens once per merged vertex at mesh finalization,
    /// never here. Colinear texture coordinates make the 2×2 system
    /// singular and are rejected as [`MeshError::DegenerateUv`].
    pub fn compute_tangent_space(&mut self) -> MeshResult<()> {
        let edge_ab = self.b.position - self.a.position;
        let edge_ac = self.c.position - self.a.position;
        let delta_uv1 = self.b.uv - self.a.uv;
        let delta_uv2 = self.c.uv - self.a.uv;

        let det = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        if det == 0.0 {
            return Err(MeshError::DegenerateUv);
        }

        let tangent = (edge_ab * delta_uv2.y - edge_ac * delta_uv1.y) / det;
        let bitangent = (edge_ac * delta_uv1.x - edge_ab * delta_uv2.x) / det;
        let normal = edge_ab.cross(edge_ac);

        for vertex in [&mut self.a, &mut self.b, &mut self.c] {
            vertex.tangent = tangent;
            vertex.bitangent = bitangent;
            vertex.normal = normal;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn unit_right_triangle() -> Triangle {
        let mut a = Vertex::at(Vec3::new(0.0, 0.0, 0.0));
        let mut b = Vertex::at(Vec3::new(1.0, 0.0, 0.0));
        let mut c = Vertex::at(Vec3::new(0.0, 1.0, 0.0));
        a.uv = Vec2::new(0.0, 0.0);
        b.uv = Vec2::new(1.0, 0.0);
        c.uv = Vec2::new(0.0, 1.0);
        Triangle::new(a, b, c)
    }

    #[test]
    fn tangent_space_of_axis_aligned_triangle() {
        let mut tri = unit_right_triangle();
        tri.compute_tangent_space().unwrap();

        // UVs follow the XY axes exactly, so tangent = +X, bitangent = +Y.
        assert!((tri.a.tangent.x - 1.0).abs() < EPSILON);
        assert!(tri.a.tangent.y.abs() < EPSILON);
        assert!((tri.a.bitangent.y - 1.0).abs() < EPSILON);
        // Face normal is the unnormalized cross product, +Z here.
        assert_eq!(tri.a.normal, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tri.b.normal, tri.a.normal);
        assert_eq!(tri.c.normal, tri.a.normal);
    }

    #[test]
    fn colinear_uvs_are_rejected() {
        let mut tri = unit_right_triangle();
        tri.a.uv = Vec2::new(0.0, 0.0);
        tri.b.uv = Vec2::new(1.0, 0.0);
        tri.c.uv = Vec2::new(2.0, 0.0);

        assert!(matches!(
            tri.compute_tangent_space(),
            Err(MeshError::DegenerateUv)
        ));
        // The guard rejects before any NaN can reach the accumulators.
        assert_eq!(tri.a.tangent, Vec3::ZERO);
    }

    #[test]
    fn merge_face_scales_positions_into_uv_space() {
        let mut tri = unit_right_triangle();
        tri.translate(Vec3::new(1.0, 1.0, 0.0));
        tri.merge_face(4.0);

        assert_eq!(tri.a.uv, Vec2::new(0.25, 0.25));
        assert_eq!(tri.b.uv, Vec2::new(0.5, 0.25));
        assert_eq!(tri.c.uv, Vec2::new(0.25, 0.5));
    }

    #[test]
    fn translate_moves_all_corners() {
        let mut tri = unit_right_triangle();
        tri.translate(Vec3::new(-2.0, 3.0, 1.0));
        assert_eq!(tri.a.position, Vec3::new(-2.0, 3.0, 1.0));
        assert_eq!(tri.b.position, Vec3::new(-1.0, 3.0, 1.0));
        assert_eq!(tri.c.position, Vec3::new(-2.0, 4.0, 1.0));
    }

    #[test]
    fn set_color_is_uniform() {
        let mut tri = unit_right_triangle();
        tri.set_color(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(tri.a.color, tri.b.color);
        assert_eq!(tri.b.color, tri.c.color);
    }
}
