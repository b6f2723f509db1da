use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A closed numeric interval `[min, max]` used as a hard invariant guard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedRange {
    pub min: f32,
    pub max: f32,
}

impl ClosedRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Symmetric range `[-limit, limit]`.
    pub const fn symmetric(limit: f32) -> Self {
        Self {
            min: -limit,
            max: limit,
        }
    }

    /// Constrain `value` to this range. NaN collapses to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Drag-derived model orientation in radians.
///
/// `x` is pitch and stays within the configured pitch range; `y` is yaw and
/// is left unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationOffset {
    pub x: f32,
    pub y: f32,
}

impl RotationOffset {
    /// Quaternion for Euler angles `(x, y, 0)` applied in XYZ order.
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn to_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
