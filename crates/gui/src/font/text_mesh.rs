//! Extruded text geometry (caps plus side walls, no bevel).

use glam::Vec3;
use kurbo::Point;

use super::outline::{layout_text, Contour};
use super::triangulate::{group_contours, oriented, triangulate, Shape};
use super::Typeface;
use crate::viewport::bounds::Aabb;
use crate::viewport::mesh::MeshData;

/// Text geometry parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Em size in scene units
    pub size: f64,
    /// Extrusion depth along +Z
    pub depth: f32,
    /// Line segments per curve
    pub curve_segments: usize,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 20.0,
            depth: 0.5,
            curve_segments: 12,
        }
    }
}

/// Build the extruded mesh of `text`, centered on its bounding box.
/// Characters without outlines (spaces) only advance; an all-blank string
/// yields an empty mesh.
pub fn build_text_mesh(typeface: &Typeface, text: &str, style: &TextStyle) -> MeshData {
    let mut mesh = MeshData::new();

    for contours in layout_text(typeface, text, style.size, style.curve_segments) {
        for shape in group_contours(contours) {
            extrude_shape(&mut mesh, &shape, style.depth);
        }
    }

    if let Some(bounds) = Aabb::from_mesh(&mesh) {
        mesh.translate(-bounds.center());
    }

    tracing::debug!(
        "Built text mesh for '{text}' ({} triangles)",
        mesh.triangle_count()
    );
    mesh
}

fn extrude_shape(mesh: &mut MeshData, shape: &Shape, depth: f32) {
    // Front (+Z) and back (-Z) caps
    for [a, b, c] in triangulate(shape) {
        mesh.push_triangle(at(a, depth), at(b, depth), at(c, depth), Vec3::Z);
        mesh.push_triangle(at(a, 0.0), at(c, 0.0), at(b, 0.0), Vec3::NEG_Z);
    }

    // Walls: outer counter-clockwise and holes clockwise, so the edge
    // normal (dy, -dx) always points out of the solid
    push_walls(mesh, &oriented(&shape.outer, true), depth);
    for hole in &shape.holes {
        push_walls(mesh, &oriented(hole, false), depth);
    }
}

fn push_walls(mesh: &mut MeshData, contour: &Contour, depth: f32) {
    let n = contour.len();
    for i in 0..n {
        let (p0, p1) = (contour[i], contour[(i + 1) % n]);
        let d = p1 - p0;
        let normal = Vec3::new(d.y as f32, -d.x as f32, 0.0).normalize_or_zero();
        if normal == Vec3::ZERO {
            continue;
        }

        let (b0, b1) = (at(p0, 0.0), at(p1, 0.0));
        let (t0, t1) = (at(p0, depth), at(p1, depth));
        mesh.push_triangle(b0, b1, t1, normal);
        mesh.push_triangle(b0, t1, t0, normal);
    }
}

fn at(p: Point, z: f32) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_typeface;
    use crate::validation::preview_mesh_issues;

    fn style() -> TextStyle {
        TextStyle {
            size: 100.0,
            ..TextStyle::default()
        }
    }

    #[test]
    fn test_default_style() {
        let s = TextStyle::default();
        assert_eq!((s.size, s.depth, s.curve_segments), (20.0, 0.5, 12));
    }

    #[test]
    fn test_bar_glyph() {
        let mesh = build_text_mesh(&test_typeface(), "I", &style());
        // 2 + 2 cap triangles, 4 walls of 2 triangles
        assert_eq!(mesh.triangle_count(), 12);

        assert!(preview_mesh_issues(&mesh).is_empty(), "{:?}", preview_mesh_issues(&mesh));
        let size = Aabb::from_mesh(&mesh).unwrap().size();
        assert!((size - Vec3::new(20.0, 100.0, 0.5)).abs().max_element() < 1e-4);
    }

    #[test]
    fn test_glyph_with_hole() {
        let mesh = build_text_mesh(&test_typeface(), "O", &style());
        // Ring: 8 triangles per cap, 8 wall edges
        assert_eq!(mesh.triangle_count(), 32);
        assert!(preview_mesh_issues(&mesh).is_empty());
    }

    #[test]
    fn test_curved_glyph() {
        let mesh = build_text_mesh(&test_typeface(), "C", &style());
        assert!(mesh.triangle_count() > 12);
        assert!(preview_mesh_issues(&mesh).is_empty());
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(build_text_mesh(&test_typeface(), "", &style()).is_empty());
        assert!(build_text_mesh(&test_typeface(), "   ", &style()).is_empty());
    }

    #[test]
    fn test_wall_normals_point_outwards() {
        let mesh = build_text_mesh(&test_typeface(), "I", &style());
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i);
            if n.z != 0.0 {
                continue;
            }
            // Centered bar: outward normals share the sign of the position
            let p = mesh.position(i);
            assert!(n.x * p.x + n.y * p.y > 0.0);
        }
    }
}
