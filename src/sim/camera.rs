//! Viewport projection source
//!
//! The grid only needs one question answered: "where in the world is this
//! viewport coordinate, this far in front of the camera?"

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Projects viewport coordinates to world space.
///
/// Viewport space runs from (0, 0) at the bottom-left to (1, 1) at the
/// top-right. `depth` is the distance along the camera's forward axis.
pub trait ViewportProjector {
    fn viewport_to_world(&self, viewport: Vec2, depth: f32) -> Vec3;

    /// Whether this source can produce meaningful positions
    fn is_valid(&self) -> bool {
        true
    }
}

/// A pinhole camera looking down its local +Z axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, rotation: Quat, fov_y: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation,
            fov_y,
            aspect,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl ViewportProjector for PerspectiveCamera {
    fn viewport_to_world(&self, viewport: Vec2, depth: f32) -> Vec3 {
        let half_h = depth * (self.fov_y * 0.5).tan();
        let half_w = half_h * self.aspect;
        let local = Vec3::new(
            (viewport.x * 2.0 - 1.0) * half_w,
            (viewport.y * 2.0 - 1.0) * half_h,
            depth,
        );
        self.position + self.rotation * local
    }

    fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.rotation.is_normalized()
            && self.fov_y.is_finite()
            && self.fov_y > 0.0
            && self.fov_y < std::f32::consts::PI
            && self.aspect.is_finite()
            && self.aspect > 0.0
    }
}
