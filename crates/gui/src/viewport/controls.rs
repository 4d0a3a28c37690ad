//! Damped orbit controls.
//!
//! Input accumulates pending motion; every frame [`OrbitControls::update`]
//! applies a `damping` fraction of what is pending and keeps the rest, so
//! the camera eases out after the pointer is released.

use glam::Vec2;

use super::camera::PerspectiveCamera;

pub const DEFAULT_DAMPING: f32 = 0.05;

/// Below this, pending motion is dropped
const SETTLE_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub damping: f32,
    pending_rotation: Vec2,
    pending_pan: Vec2,
    pending_dolly: f32,
    enabled: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING)
    }
}

impl OrbitControls {
    pub fn new(damping: f32) -> Self {
        Self {
            damping: damping.clamp(f32::EPSILON, 1.0),
            pending_rotation: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_dolly: 1.0,
            enabled: true,
        }
    }

    /// Queue a rotation in radians (yaw, pitch)
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        if self.enabled {
            self.pending_rotation += Vec2::new(d_yaw, d_pitch);
        }
    }

    /// Queue a pan in world units
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if self.enabled {
            self.pending_pan += Vec2::new(dx, dy);
        }
    }

    /// Queue a distance scale; applied whole on the next update
    pub fn dolly(&mut self, factor: f32) {
        if self.enabled && factor.is_finite() && factor > 0.0 {
            self.pending_dolly *= factor;
        }
    }

    /// Whether motion is still pending
    pub fn is_moving(&self) -> bool {
        self.pending_rotation != Vec2::ZERO || self.pending_pan != Vec2::ZERO || self.pending_dolly != 1.0
    }

    /// Apply one frame of damped motion to `camera`. Returns whether the
    /// camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.is_moving() {
            return false;
        }

        let rotation = self.pending_rotation * self.damping;
        camera.rotate(rotation.x, rotation.y);
        self.pending_rotation -= rotation;

        let pan = self.pending_pan * self.damping;
        camera.pan(pan.x, pan.y);
        self.pending_pan -= pan;

        camera.dolly(self.pending_dolly);
        self.pending_dolly = 1.0;

        if self.pending_rotation.length() < SETTLE_EPSILON {
            self.pending_rotation = Vec2::ZERO;
        }
        if self.pending_pan.length() < SETTLE_EPSILON {
            self.pending_pan = Vec2::ZERO;
        }
        true
    }

    /// Detach from input; pending motion is discarded
    pub fn dispose(&mut self) {
        self.enabled = false;
        self.pending_rotation = Vec2::ZERO;
        self.pending_pan = Vec2::ZERO;
        self.pending_dolly = 1.0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
