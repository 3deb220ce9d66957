//! Procedural terrain grid generation.

use constants::TERRAIN_PLACEHOLDER_COLOUR;

use crate::error::MeshResult;
use crate::math::{Vec2, Vec3};
use crate::mesh::{Mesh, MeshBuilder};
use crate::vertex::{Triangle, Vertex};

/// Generate a `columns × rows` terrain grid centred at the origin.
///
/// One quad per unit cell, split into two triangles with fixed winding:
/// `(top-left, bottom-left, top-right)` then
/// `(bottom-left, bottom-right, top-right)`. UVs are assigned over the
/// full grid extent before the centering translate, so the whole grid maps
/// once across the texture instead of tiling per cell. The reference
/// extent for non-square grids is the longer side, keeping every position
/// inside `merge_face`'s `[0, extent]` precondition.
pub fn generate(columns: u32, rows: u32) -> MeshResult<Mesh> {
    let extent = columns.max(rows) as f32;
    let centering = Vec3::new(-(columns as f32) / 2.0, -(rows as f32) / 2.0, 0.0);
    let color = Vec3::new(
        TERRAIN_PLACEHOLDER_COLOUR[0],
        TERRAIN_PLACEHOLDER_COLOUR[1],
        TERRAIN_PLACEHOLDER_COLOUR[2],
    );

    let mut builder = MeshBuilder::with_capacity((columns * rows * 2) as usize);

    for row in 0..rows {
        for column in 0..columns {
            let x = column as f32;
            let y = row as f32;

            let top_left = Vertex::at(Vec3::new(x, y + 1.0, 0.0));
            let bottom_left = Vertex::at(Vec3::new(x, y, 0.0));
            let top_right = Vertex::at(Vec3::new(x + 1.0, y + 1.0, 0.0));
            let bottom_right = Vertex::at(Vec3::new(x + 1.0, y, 0.0));

            let mut upper = Triangle::new(top_left, bottom_left, top_right);
            let mut lower = Triangle::new(bottom_left, bottom_right, top_right);

            for triangle in [&mut upper, &mut lower] {
                // UVs first: merge_face reads raw grid positions, which
                // start at [0, extent] only before the centering shift.
                triangle.merge_face(extent);
                triangle.translate(centering);
                triangle.compute_tangent_space()?;
                triangle.set_color(color);
                builder.insert(triangle);
            }
        }
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn grid_dedups_to_lattice_points() {
        let mesh = generate(2, 2).unwrap();

        // A flat grid merges every shared corner: (columns+1) * (rows+1)
        // unique vertices, 6 indices per cell.
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.indices.len(), 24);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn cell_triangles_share_a_hemisphere() {
        let mesh = generate(3, 2).unwrap();

        let face_normal = |corners: &[u32]| {
            let a = mesh.positions[corners[0] as usize];
            let b = mesh.positions[corners[1] as usize];
            let c = mesh.positions[corners[2] as usize];
            (b - a).cross(c - a)
        };

        for cell in mesh.indices.chunks(6) {
            // Both triangles of a cell must face the same way.
            assert!(face_normal(&cell[0..3]).dot(face_normal(&cell[3..6])) > 0.0);
        }
    }

    #[test]
    fn finalized_normals_are_unit_up() {
        let mesh = generate(4, 4).unwrap();
        for normal in &mesh.normals {
            assert!((normal.length() - 1.0).abs() < EPSILON);
            assert!((normal.z - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn uvs_cover_unit_square_before_centering() {
        let mesh = generate(2, 2).unwrap();
        for uv in &mesh.texture_coordinates {
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
        // Full-extent mapping: the far lattice corner reaches uv (1, 1).
        assert!(
            mesh.texture_coordinates
                .iter()
                .any(|uv| (uv.x - 1.0).abs() < EPSILON && (uv.y - 1.0).abs() < EPSILON)
        );
    }

    #[test]
    fn grid_is_centred_at_origin() {
        let mesh = generate(4, 2).unwrap();
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in &mesh.positions {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        assert!((min_x + max_x).abs() < EPSILON);
        assert!((min_y + max_y).abs() < EPSILON);
        assert!((max_x - 2.0).abs() < EPSILON);
        assert!((max_y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn non_square_grid_uvs_stay_in_precondition_range() {
        let mesh = generate(8, 2).unwrap();
        for uv in &mesh.texture_coordinates {
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
    }
}
