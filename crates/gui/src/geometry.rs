//! STL geometry decoding for the preview.
//!
//! The input is the template text (one char per byte), so both ASCII and
//! binary files arrive through the same path and are handed to `stl_io`.
//! Its ASCII reader accepts nothing but geometry records, so directive
//! comments and any other non-geometry lines are dropped first.

use std::io::Cursor;

use glam::Vec3;
use thiserror::Error;

use stl_template::model_text;

use crate::viewport::mesh::{face_normal, MeshData};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Lines kept for the ASCII reader, by first keyword
const GEOMETRY_KEYWORDS: [&str; 5] = ["facet", "outer", "vertex", "endloop", "endfacet"];

/// Why a model could not be turned into a mesh
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("binary STL is shorter than its 80-byte header and triangle count ({0} bytes)")]
    MissingHeader(usize),
    #[error("binary STL is truncated: {triangles} triangles need {expected} bytes, got {actual}")]
    Truncated {
        triangles: usize,
        expected: usize,
        actual: usize,
    },
    #[error("STL decode failed: {0}")]
    Decode(#[from] std::io::Error),
    #[error("model contains no facets")]
    NoFacets,
}

/// Decode STL text into a flat-shaded triangle mesh
pub fn parse_stl(text: &str) -> Result<MeshData, GeometryError> {
    let bytes = model_text::encode(text);
    let input = if is_binary(text, &bytes) {
        binary_input(bytes)?
    } else {
        geometry_records(text).into_bytes()
    };

    let stl = stl_io::read_stl(&mut Cursor::new(input))?;
    tracing::debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mesh = to_mesh_data(&stl);
    if mesh.is_empty() {
        return Err(GeometryError::NoFacets);
    }
    Ok(mesh)
}

/// A file whose size matches its triangle count is binary even when the
/// header happens to start with `solid`.
fn is_binary(text: &str, bytes: &[u8]) -> bool {
    let exact = triangle_count(bytes).and_then(expected_len) == Some(bytes.len());
    exact || !model_text::is_ascii_stl(text)
}

fn expected_len(triangles: usize) -> Option<usize> {
    triangles
        .checked_mul(RECORD_LEN)?
        .checked_add(HEADER_LEN + 4)
}

fn triangle_count(bytes: &[u8]) -> Option<usize> {
    let raw: [u8; 4] = bytes.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw) as usize)
}

/// Check the record count against the length, then blank the header so
/// `stl_io` cannot sniff a `solid` prefix in it.
fn binary_input(mut bytes: Vec<u8>) -> Result<Vec<u8>, GeometryError> {
    let triangles = triangle_count(&bytes).ok_or(GeometryError::MissingHeader(bytes.len()))?;
    let expected = expected_len(triangles).unwrap_or(usize::MAX);
    if bytes.len() < expected {
        return Err(GeometryError::Truncated {
            triangles,
            expected,
            actual: bytes.len(),
        });
    }
    bytes[..HEADER_LEN].fill(0);
    Ok(bytes)
}

/// Rebuild an ASCII solid from the facet records alone, keywords lower-cased
fn geometry_records(text: &str) -> String {
    let mut out = String::from("solid model\n");
    for line in text.lines().map(str::trim) {
        let keyword = line.split_whitespace().next().unwrap_or_default();
        if GEOMETRY_KEYWORDS
            .iter()
            .any(|k| keyword.eq_ignore_ascii_case(k))
        {
            out.push_str(&line.to_ascii_lowercase());
            out.push('\n');
        }
    }
    out.push_str("endsolid model\n");
    out
}

fn to_mesh_data(stl: &stl_io::IndexedMesh) -> MeshData {
    let mut mesh = MeshData::new();
    let corner = |i: usize| stl.vertices.get(i).map(|v| Vec3::from_array(v.0));
    for face in &stl.faces {
        let [i, j, k] = face.vertices;
        let (Some(a), Some(b), Some(c)) = (corner(i), corner(j), corner(k)) else {
            tracing::warn!("Skipping facet with out-of-range vertex index");
            continue;
        };
        push_facet(&mut mesh, [a, b, c], Vec3::from_array(face.normal.0));
    }
    mesh
}

/// Use the stored normal when present, otherwise derive it from the winding
fn push_facet(mesh: &mut MeshData, [a, b, c]: [Vec3; 3], normal: Vec3) {
    let n = match normal.try_normalize() {
        Some(n) => n,
        None => face_normal(a, b, c),
    };
    mesh.push_triangle(a, b, c, n);
}
