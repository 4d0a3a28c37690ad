//! Checks on meshes handed to the renderer.
//!
//! Model and text meshes are both centered on their bounding box before
//! upload, carry unit normals and contain no zero-area triangles. The scene
//! refuses a mesh only when it cannot be drawn at all (see
//! [`check_drawable`]); [`preview_mesh_issues`] reports everything.

use glam::Vec3;
use thiserror::Error;

use crate::viewport::bounds::Aabb;
use crate::viewport::mesh::{face_normal, MeshData};

const NORMAL_TOLERANCE: f32 = 1e-3;
/// Relative to the largest bounding-box extent
const CENTER_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshIssue {
    #[error("mesh has no triangles")]
    Empty,
    #[error("index {index} points past the last of {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
    #[error("vertex {0} has a non-finite position")]
    NonFinite(usize),
    #[error("vertex {0} normal is not unit length")]
    BadNormal(usize),
    #[error("triangle {0} has zero area")]
    Degenerate(usize),
    #[error("bounding box center {0} is not at the origin")]
    OffCenter(Vec3),
}

/// A mesh the renderer can index and the camera can bound
pub fn check_drawable(mesh: &MeshData) -> Result<(), MeshIssue> {
    if mesh.is_empty() {
        return Err(MeshIssue::Empty);
    }
    let vertices = mesh.vertex_count();
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertices) {
        return Err(MeshIssue::IndexOutOfRange { index, vertices });
    }
    match (0..vertices).find(|&i| !mesh.position(i).is_finite()) {
        Some(vertex) => Err(MeshIssue::NonFinite(vertex)),
        None => Ok(()),
    }
}

/// Every way `mesh` falls short of a centered preview mesh
pub fn preview_mesh_issues(mesh: &MeshData) -> Vec<MeshIssue> {
    if let Err(issue) = check_drawable(mesh) {
        return vec![issue];
    }

    let mut issues: Vec<MeshIssue> = (0..mesh.vertex_count())
        .filter(|&i| (mesh.normal(i).length() - 1.0).abs() > NORMAL_TOLERANCE)
        .map(MeshIssue::BadNormal)
        .collect();

    issues.extend(
        mesh.indices
            .chunks_exact(3)
            .enumerate()
            .filter(|(_, tri)| {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.position(i as usize));
                face_normal(a, b, c) == Vec3::ZERO
            })
            .map(|(t, _)| MeshIssue::Degenerate(t)),
    );

    if let Some(bounds) = Aabb::from_mesh(mesh) {
        let center = bounds.center();
        if center.length() > CENTER_TOLERANCE * bounds.size().max_element().max(1.0) {
            issues.push(MeshIssue::OffCenter(center));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square in the XY plane, centered
    fn square() -> MeshData {
        let mut mesh = MeshData::new();
        let [a, b, c, d] = [
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ];
        mesh.push_triangle(a, b, c, Vec3::Z);
        mesh.push_triangle(a, c, d, Vec3::Z);
        mesh
    }

    #[test]
    fn test_centered_square_is_clean() {
        assert_eq!(check_drawable(&square()), Ok(()));
        assert!(preview_mesh_issues(&square()).is_empty());
    }

    #[test]
    fn test_not_drawable() {
        assert_eq!(check_drawable(&MeshData::new()), Err(MeshIssue::Empty));

        let mut mesh = square();
        mesh.indices.push(99);
        assert_eq!(
            check_drawable(&mesh),
            Err(MeshIssue::IndexOutOfRange {
                index: 99,
                vertices: 6
            })
        );

        let mut mesh = square();
        mesh.vertices[6] = f32::INFINITY;
        assert_eq!(check_drawable(&mesh), Err(MeshIssue::NonFinite(1)));
        assert_eq!(preview_mesh_issues(&mesh), vec![MeshIssue::NonFinite(1)]);
    }

    #[test]
    fn test_off_center() {
        let mut mesh = square();
        mesh.translate(Vec3::new(3.0, 0.0, 0.0));
        assert!(matches!(
            preview_mesh_issues(&mesh)[..],
            [MeshIssue::OffCenter(c)] if (c.x - 3.0).abs() < 1e-6
        ));
    }

    #[test]
    fn test_degenerate_and_bad_normal() {
        let mut mesh = square();
        mesh.push_triangle(Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::Z * 2.0);
        let issues = preview_mesh_issues(&mesh);
        assert!(issues.contains(&MeshIssue::Degenerate(2)));
        assert!(issues.contains(&MeshIssue::BadNormal(6)));
    }
}
