use glam::Vec3;
use modelview_common::{ClosedRange, RotationOffset, ViewerConfig};
use modelview_input::{Directive, PanDirection};

/// Which pan directions are currently held.
///
/// Opposing flags may both be set; their effects cancel additively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveDirectionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveDirectionFlags {
    pub fn set(&mut self, direction: PanDirection, active: bool) {
        match direction {
            PanDirection::Up => self.up = active,
            PanDirection::Down => self.down = active,
            PanDirection::Left => self.left = active,
            PanDirection::Right => self.right = active,
        }
    }

    pub fn get(&self, direction: PanDirection) -> bool {
        match direction {
            PanDirection::Up => self.up,
            PanDirection::Down => self.down,
            PanDirection::Left => self.left,
            PanDirection::Right => self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Unit-step pan vector in the camera's x/y plane.
    pub fn axis(&self) -> Vec3 {
        let mut v = Vec3::ZERO;
        if self.up {
            v.y += 1.0;
        }
        if self.down {
            v.y -= 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v
    }
}

/// Owns the persistent offsets derived from directives and enforces the
/// clamp invariants on them.
#[derive(Debug, Clone)]
pub struct TransformAccumulator {
    rotation: RotationOffset,
    camera: Vec3,
    movement: MoveDirectionFlags,
    pitch_range: ClosedRange,
    distance_range: ClosedRange,
    move_speed: f32,
}

impl Default for TransformAccumulator {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl TransformAccumulator {
    pub fn new(config: &ViewerConfig) -> Self {
        let distance_range = config.camera.distance_range;
        let mut camera = config.camera.initial_position();
        camera.z = distance_range.clamp(camera.z);
        Self {
            rotation: RotationOffset::default(),
            camera,
            movement: MoveDirectionFlags::default(),
            pitch_range: config.camera.pitch_range(),
            distance_range,
            move_speed: config.input.move_speed,
        }
    }

    pub fn rotation(&self) -> RotationOffset {
        self.rotation
    }

    /// Camera position; `z` is the camera distance.
    pub fn camera_position(&self) -> Vec3 {
        self.camera
    }

    pub fn movement(&self) -> MoveDirectionFlags {
        self.movement
    }

    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::Rotate(delta) => {
                self.rotation.y += delta.y;
                self.rotation.x = self.pitch_range.clamp(self.rotation.x + delta.x);
            }
            Directive::Zoom(dz) => {
                self.camera.z = self.distance_range.clamp(self.camera.z + dz);
            }
            Directive::Pan { direction, active } => {
                self.movement.set(*direction, *active);
            }
            Directive::ReleaseAll => {
                self.movement = MoveDirectionFlags::default();
            }
        }
    }

    /// One pan tick: move by `move_speed` per held direction, then re-clamp
    /// the camera distance.
    pub fn pan_step(&mut self) {
        if self.movement.any() {
            self.camera += self.movement.axis() * self.move_speed;
        }
        self.camera.z = self.distance_range.clamp(self.camera.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn pitch_clamped_yaw_unbounded() {
        let mut acc = TransformAccumulator::default();
        for _ in 0..100 {
            acc.apply(&Directive::Rotate(Vec2::new(0.3, 0.3)));
            assert!(acc.rotation().x <= FRAC_PI_2);
        }
        assert_eq!(acc.rotation().x, FRAC_PI_2);
        assert!(acc.rotation().y > 29.0);

        for _ in 0..100 {
            acc.apply(&Directive::Rotate(Vec2::new(-0.3, 0.0)));
            assert!(acc.rotation().x >= -FRAC_PI_2);
        }
        assert_eq!(acc.rotation().x, -FRAC_PI_2);
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut acc = TransformAccumulator::default();
        acc.apply(&Directive::Zoom(-100.0));
        assert_eq!(acc.camera_position().z, 1.0);
        acc.apply(&Directive::Zoom(100.0));
        assert_eq!(acc.camera_position().z, 20.0);
    }

    #[test]
    fn zero_zoom_is_noop() {
        let mut acc = TransformAccumulator::default();
        let before = acc.camera_position();
        acc.apply(&Directive::Zoom(0.0));
        assert_eq!(acc.camera_position(), before);
    }

    #[test]
    fn pan_up_accumulates() {
        let mut acc = TransformAccumulator::default();
        let start = acc.camera_position();
        acc.apply(&Directive::Pan {
            direction: PanDirection::Up,
            active: true,
        });
        for _ in 0..50 {
            acc.pan_step();
        }
        let moved = acc.camera_position() - start;
        assert!((moved.y - 0.5).abs() < 1e-4, "moved {moved}");
        assert_eq!(moved.x, 0.0);
        assert_eq!(moved.z, 0.0);
    }

    #[test]
    fn opposing_flags_cancel() {
        let mut flags = MoveDirectionFlags::default();
        flags.set(PanDirection::Left, true);
        flags.set(PanDirection::Right, true);
        assert_eq!(flags.axis(), Vec3::ZERO);
        flags.set(PanDirection::Up, true);
        assert_eq!(flags.axis(), Vec3::Y);
    }

    #[test]
    fn release_all_clears_flags() {
        let mut acc = TransformAccumulator::default();
        for direction in PanDirection::ALL {
            acc.apply(&Directive::Pan {
                direction,
                active: true,
            });
        }
        assert!(acc.movement().any());
        acc.apply(&Directive::ReleaseAll);
        assert_eq!(acc.movement(), MoveDirectionFlags::default());
    }

    #[test]
    fn initial_distance_is_clamped() {
        let mut config = ViewerConfig::default();
        config.camera.initial_position = [0.0, 0.0, 50.0];
        let acc = TransformAccumulator::new(&config);
        assert_eq!(acc.camera_position().z, 20.0);
    }
}
