use glam::{Mat4, Vec3};

use super::bounds::Aabb;

/// Extra distance on top of the exact fit so the model does not touch the
/// viewport edges
pub const FIT_MARGIN: f32 = 1.5;

/// Distance at which an object of size `max_dim` exactly fills a vertical
/// field of view of `fov` radians, times [`FIT_MARGIN`]
pub fn fit_distance(max_dim: f32, fov: f32) -> f32 {
    max_dim / (2.0 * (fov / 2.0).tan()) * FIT_MARGIN
}

/// Perspective camera orbiting a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Width / height of the output
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;
    const MAX_PITCH: f32 = 1.5;

    /// Camera at `(0, 0, 5)` looking at the origin
    pub fn new(fov_degrees: f32, aspect: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 5.0,
            target: Vec3::ZERO,
            fov: fov_degrees.to_radians(),
            aspect,
            near: Self::NEAR,
            far: Self::FAR,
        }
    }

    /// Look at the center of `bounds` from +Z, far enough away for the
    /// largest dimension to fit the field of view
    pub fn fit(&mut self, bounds: &Aabb) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.target = bounds.center();
        self.distance = fit_distance(bounds.max_dim(), self.fov);
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Multiply the distance by `factor`, staying inside the clip range
    pub fn dolly(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(self.near, self.far * 0.9);
    }

    /// Move the target in the view plane
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = self.right_vector() * dx + self.up_vector() * dy;
        self.target += offset;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }
}
