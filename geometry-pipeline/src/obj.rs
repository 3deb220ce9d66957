//! Text model importer.
//!
//! Parses the line-oriented OBJ-style format: `v` position, `vn` normal,
//! `vt` texture coordinate and `f` face lines, whitespace tokenized, with
//! 1-based cross references. Face tokens take the `pos/uv/normal` or
//! `pos//normal` form. Every face with three or more references is
//! fan-triangulated; a quad splits into `(0,1,2)` and `(0,2,3)`.
//!
//! File-provided normals are authoritative: they form the dedup key and
//! accumulate across faces that share them. Tangent and bitangent
//! accumulators stay zero through import and pass through finalization
//! unchanged.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{MeshError, MeshResult};
use crate::math::{Vec2, Vec3};
use crate::mesh::{Mesh, MeshBuilder};
use crate::vertex::{Triangle, Vertex};

/// Default colour for imported vertices; models carry no colour data.
const IMPORT_COLOUR: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Load a text model from disk.
pub fn load_model<P: AsRef<Path>>(path: P) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MeshError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MeshError::Io(e)
        }
    })?;

    parse_model(BufReader::new(file))
}

/// Parse a text model from any buffered reader.
pub fn parse_model<R: BufRead>(reader: R) -> MeshResult<Mesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut builder = MeshBuilder::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_index + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => positions.push(parse_vec3(&mut tokens, line_number)?),
            Some("vn") => normals.push(parse_vec3(&mut tokens, line_number)?),
            Some("vt") => uvs.push(parse_vec2(&mut tokens, line_number)?),
            Some("f") => {
                let corners = parse_face(tokens, line_number, &positions, &normals, &uvs)?;
                for triangle in fan_triangulate(&corners) {
                    builder.insert(&triangle);
                }
            }
            // Comments, object names, smoothing groups and material
            // references are not mesh data.
            _ => {}
        }
    }

    Ok(builder.finish())
}

fn parse_float<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> MeshResult<f32> {
    let token = tokens.next().ok_or_else(|| MeshError::MalformedLine {
        line,
        message: "missing numeric token".to_string(),
    })?;
    token.parse().map_err(|_| MeshError::MalformedLine {
        line,
        message: format!("invalid number {token:?}"),
    })
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> MeshResult<Vec3> {
    Ok(Vec3::new(
        parse_float(tokens, line)?,
        parse_float(tokens, line)?,
        parse_float(tokens, line)?,
    ))
}

fn parse_vec2<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> MeshResult<Vec2> {
    Ok(Vec2::new(
        parse_float(tokens, line)?,
        parse_float(tokens, line)?,
    ))
}

/// Resolve a 1-based cross reference into an attribute table.
fn dereference<T: Copy>(
    table: &[T],
    token: &str,
    table_name: &'static str,
    line: usize,
) -> MeshResult<T> {
    let index: usize = token.parse().map_err(|_| MeshError::MalformedLine {
        line,
        message: format!("invalid {table_name} reference {token:?}"),
    })?;

    if index == 0 || index > table.len() {
        return Err(MeshError::IndexOutOfRange {
            line,
            table: table_name,
            index,
            len: table.len(),
        });
    }

    Ok(table[index - 1])
}

/// Parse every `pos/uv/normal` or `pos//normal` token on a face line into
/// resolved vertices.
fn parse_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
    positions: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
) -> MeshResult<Vec<Vertex>> {
    let mut corners = Vec::new();

    for token in tokens {
        let mut parts = token.split('/');

        let position_token = parts.next().unwrap_or_default();
        let uv_token = parts.next();
        let normal_token = parts.next();

        let mut vertex = Vertex::at(dereference(positions, position_token, "position", line)?);
        vertex.color = IMPORT_COLOUR;

        if let Some(uv_token) = uv_token
            && !uv_token.is_empty()
        {
            vertex.uv = dereference(uvs, uv_token, "texture coordinate", line)?;
        }

        if let Some(normal_token) = normal_token
            && !normal_token.is_empty()
        {
            vertex.normal = dereference(normals, normal_token, "normal", line)?;
        }

        corners.push(vertex);
    }

    if corners.len() < 3 {
        return Err(MeshError::FaceTooShort {
            line,
            count: corners.len(),
        });
    }

    Ok(corners)
}

/// Fan triangulation anchored at the first corner: `(0, i, i+1)`.
/// A quad produces exactly the `(0,1,2)` / `(0,2,3)` split.
fn fan_triangulate(corners: &[Vertex]) -> impl Iterator<Item = Triangle> + '_ {
    corners
        .windows(2)
        .skip(1)
        .map(|pair| Triangle::new(corners[0], pair[0], pair[1]))
}
