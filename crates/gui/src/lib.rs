// Library crate: template-aware preview logic, headless-testable.
// The eframe application, form and GL backend stay in the binary crate.

pub mod color;
pub mod fixtures;
pub mod font;
pub mod geometry;
pub mod harness;
pub mod scene;
pub mod state;
pub mod validation;

/// Meshes, bounds and camera math shared by the scene manager and the
/// binary's viewport panel.
pub mod viewport {
    pub mod bounds;
    pub mod camera;
    pub mod controls;
    pub mod mesh;
}
