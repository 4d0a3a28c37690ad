//! Backend abstraction for the preview scene.
//!
//! The scene manager decides what exists and when; a backend only owns the
//! GPU-side copies. Handles are allocated by the manager so a backend that
//! defers its work (the GL backend queues it until the next paint) can
//! still accept them immediately.

use glam::{Mat4, Vec3};

use crate::viewport::mesh::MeshData;

/// Handle to an uploaded geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Handle to a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// Flat-colored, double-sided surface material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// sRGB components in 0..1
    pub color: [f32; 3],
    /// `(factor, units)` depth bias; `None` disables polygon offset
    pub polygon_offset: Option<(f32, f32)>,
}

impl Material {
    pub fn solid(color: [f32; 3]) -> Self {
        Self {
            color,
            polygon_offset: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    /// Shines from `position` towards the origin
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
    },
}

/// One mesh instance to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub model: Mat4,
    /// Items are drawn in ascending order
    pub render_order: i32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
    pub clear_color: [f32; 3],
    pub lights: Vec<Light>,
    /// Sorted by `render_order`
    pub items: Vec<DrawItem>,
}

/// Rendering backend used by the scene manager
pub trait RenderBackend {
    /// Attach a drawing surface of the given size
    fn create_surface(&mut self, width: u32, height: u32);

    /// Detach and free the drawing surface
    fn release_surface(&mut self);

    /// Change the output size of the attached surface
    fn set_viewport_size(&mut self, width: u32, height: u32);

    fn upload_mesh(&mut self, handle: MeshHandle, mesh: &MeshData);

    fn release_mesh(&mut self, handle: MeshHandle);

    fn create_material(&mut self, handle: MaterialHandle, material: &Material);

    fn update_material(&mut self, handle: MaterialHandle, material: &Material);

    fn release_material(&mut self, handle: MaterialHandle);

    /// Draw a frame
    fn draw(&mut self, frame: &FrameSnapshot);
}
