use crate::accumulator::{MoveDirectionFlags, TransformAccumulator};
use glam::Vec3;
use modelview_common::{RotationOffset, ViewerConfig};
use modelview_input::{Directive, InputEvent, InputTracker, PointerState};

/// All mutable viewer state, owned in one place and passed by reference
/// into event handlers and the tick.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    tracker: InputTracker,
    accumulator: TransformAccumulator,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            tracker: InputTracker::new(&config.input),
            accumulator: TransformAccumulator::new(config),
        }
    }

    /// Route a raw event through the tracker and apply any directive.
    pub fn handle(&mut self, event: &InputEvent) {
        if let Some(directive) = self.tracker.handle(event) {
            self.apply(&directive);
        }
    }

    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.tracker.on_pointer_down(x, y);
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if let Some(d) = self.tracker.on_pointer_move(x, y) {
            self.apply(&d);
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.tracker.on_pointer_up();
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        let d = self.tracker.on_wheel(delta_y);
        self.apply(&d);
    }

    pub fn on_key_down(&mut self, key: &str) {
        if let Some(d) = self.tracker.on_key_down(key) {
            self.apply(&d);
        }
    }

    pub fn on_key_up(&mut self, key: &str) {
        if let Some(d) = self.tracker.on_key_up(key) {
            self.apply(&d);
        }
    }

    pub fn on_focus_lost(&mut self) {
        self.handle(&InputEvent::FocusLost);
    }

    pub fn pan_step(&mut self) {
        self.accumulator.pan_step();
    }

    pub fn pointer(&self) -> &PointerState {
        self.tracker.pointer()
    }

    pub fn rotation(&self) -> RotationOffset {
        self.accumulator.rotation()
    }

    pub fn camera_position(&self) -> Vec3 {
        self.accumulator.camera_position()
    }

    pub fn movement(&self) -> MoveDirectionFlags {
        self.accumulator.movement()
    }

    fn apply(&mut self, directive: &Directive) {
        tracing::trace!(?directive, "apply");
        self.accumulator.apply(directive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn drag_scenario() {
        let mut s = ViewerState::default();
        s.on_pointer_down(100.0, 100.0);
        s.on_pointer_move(150.0, 130.0);
        let r = s.rotation();
        assert!((r.y - 0.25).abs() < 1e-6);
        assert!((r.x - 0.15).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_in_range_for_any_drag() {
        let mut s = ViewerState::default();
        s.on_pointer_down(0.0, 0.0);
        let mut y = 0.0;
        for step in [400.0, -1200.0, 3000.0, 17.0, -5000.0, 250.0, 999.0] {
            y += step;
            s.on_pointer_move(0.0, y);
            let pitch = s.rotation().x;
            assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&pitch), "pitch {pitch}");
        }
    }

    #[test]
    fn wheel_scenario_clamps_at_max() {
        let mut s = ViewerState::default();
        for _ in 0..2100 {
            s.on_wheel(10.0);
            let z = s.camera_position().z;
            assert!((1.0..=20.0).contains(&z));
        }
        assert_eq!(s.camera_position().z, 20.0);
    }

    #[test]
    fn wheel_zero_is_noop() {
        let mut s = ViewerState::default();
        let before = s.camera_position();
        s.on_wheel(0.0);
        assert_eq!(s.camera_position(), before);
    }

    #[test]
    fn key_release_only_touches_its_flag() {
        let mut s = ViewerState::default();
        s.on_key_down("d");
        s.on_key_down("ArrowUp");
        s.on_key_up("ArrowUp");
        let flags = s.movement();
        assert!(!flags.up);
        assert!(flags.right);
        assert!(!flags.left);
        assert!(!flags.down);
    }

    #[test]
    fn unrecognized_keys_ignored() {
        let mut s = ViewerState::default();
        s.on_key_down("W");
        s.on_key_down("Enter");
        assert_eq!(s.movement(), MoveDirectionFlags::default());
    }

    #[test]
    fn focus_loss_clears_flags() {
        let mut s = ViewerState::default();
        s.on_key_down("w");
        s.on_key_down("a");
        s.on_focus_lost();
        assert_eq!(s.movement(), MoveDirectionFlags::default());
    }

    #[test]
    fn handle_dispatches_events() {
        let mut s = ViewerState::default();
        s.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        s.handle(&InputEvent::PointerMove { x: 20.0, y: 0.0 });
        s.handle(&InputEvent::PointerUp);
        s.handle(&InputEvent::PointerMove { x: 500.0, y: 0.0 });
        assert!((s.rotation().y - 0.1).abs() < 1e-6);
        assert!(!s.pointer().dragging);
    }
}
