//! Indexed mesh construction with vertex deduplication and smooth
//! attribute accumulation.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::math::{Vec2, Vec3, hash_f32_slice};
use crate::vertex::{Triangle, Vertex};

/// Composite dedup key: the raw bit patterns of (position, normal, uv).
///
/// Comparison is exact on bits, never epsilon-based. Two corners computed
/// with even slightly different floating-point normals occupy different
/// slots; that fragility is part of the contract, not something to paper
/// over with approximate matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VertexKey {
    bits: [u32; 8],
}

impl VertexKey {
    fn new(vertex: &Vertex) -> Self {
        Self {
            bits: [
                vertex.position.x.to_bits(),
                vertex.position.y.to_bits(),
                vertex.position.z.to_bits(),
                vertex.normal.x.to_bits(),
                vertex.normal.y.to_bits(),
                vertex.normal.z.to_bits(),
                vertex.uv.x.to_bits(),
                vertex.uv.y.to_bits(),
            ],
        }
    }
}

impl Hash for VertexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let floats: [f32; 8] = self.bits.map(f32::from_bits);
        state.write_u64(hash_f32_slice(&floats));
    }
}

/// Finished mesh: parallel attribute sequences plus an index sequence,
/// ready for direct upload as vertex/element buffers.
///
/// Invariant: every parallel sequence has the same length, and every entry
/// of `indices` is a valid position in that range.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    pub texture_coordinates: Vec<Vec2>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of unique vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles described by the index sequence.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Point-only mesh: positions filled, no connectivity.
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self {
            positions: points,
            ..Self::default()
        }
    }

    /// Position buffer as raw bytes for vertex-buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal buffer as raw bytes for vertex-buffer upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Index buffer as raw bytes for element-buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Builds an indexed mesh from a stream of triangles.
///
/// Each inserted corner either matches an existing `(position, normal, uv)`
/// key, in which case its normal/tangent/bitangent are added into the
/// stored slot, or it is promoted to a new slot with the next sequential
/// index. Call [`MeshBuilder::finish`] exactly once when every triangle has
/// been inserted; taking the builder by value makes a second finalization
/// or a post-finalize insert unrepresentable.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    dedup: HashMap<VertexKey, u32>,
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with attribute capacity preallocated for `triangles` faces.
    pub fn with_capacity(triangles: usize) -> Self {
        let corners = triangles * 3;
        Self {
            dedup: HashMap::with_capacity(corners),
            mesh: Mesh {
                positions: Vec::with_capacity(corners),
                normals: Vec::with_capacity(corners),
                tangents: Vec::with_capacity(corners),
                bitangents: Vec::with_capacity(corners),
                texture_coordinates: Vec::with_capacity(corners),
                colors: Vec::with_capacity(corners),
                indices: Vec::with_capacity(corners),
            },
        }
    }

    /// Insert one triangle, deduplicating each corner.
    pub fn insert(&mut self, triangle: &Triangle) {
        self.insert_vertex(&triangle.a);
        self.insert_vertex(&triangle.b);
        self.insert_vertex(&triangle.c);
    }

    fn insert_vertex(&mut self, vertex: &Vertex) {
        let key = VertexKey::new(vertex);

        if let Some(&index) = self.dedup.get(&key) {
            // Smooth-shading merge: accumulate the frame, leave the slot's
            // colour and uv untouched.
            let slot = index as usize;
            self.mesh.normals[slot] += vertex.normal;
            self.mesh.tangents[slot] += vertex.tangent;
            self.mesh.bitangents[slot] += vertex.bitangent;
            self.mesh.indices.push(index);
            return;
        }

        let index = self.mesh.positions.len() as u32;
        self.dedup.insert(key, index);
        self.mesh.positions.push(vertex.position);
        self.mesh.normals.push(vertex.normal);
        self.mesh.tangents.push(vertex.tangent);
        self.mesh.bitangents.push(vertex.bitangent);
        self.mesh.texture_coordinates.push(vertex.uv);
        self.mesh.colors.push(vertex.color);
        self.mesh.indices.push(index);
    }

    /// Unique vertices promoted so far.
    pub fn vertex_count(&self) -> usize {
        self.mesh.positions.len()
    }

    /// Renormalize every accumulated frame vector once and hand out the
    /// mesh. The dedup map is scratch state and dies here.
    pub fn finish(mut self) -> Mesh {
        for normal in &mut self.mesh.normals {
            *normal = normal.normalize();
        }
        for tangent in &mut self.mesh.tangents {
            *tangent = tangent.normalize();
        }
        for bitangent in &mut self.mesh.bitangents {
            *bitangent = bitangent.normalize();
        }
        self.mesh
    }
}
