use crate::directive::{Directive, PanDirection};
use crate::event::InputEvent;
use glam::Vec2;
use modelview_common::InputConfig;

/// Drag state: whether a button is held and where the pointer last was.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub dragging: bool,
    pub last: Vec2,
}

/// Converts raw device events into [`Directive`]s.
///
/// The tracker owns only [`PointerState`]; it never clamps, since the
/// accumulated offsets it would clamp against live in the kernel.
#[derive(Debug, Clone)]
pub struct InputTracker {
    pointer: PointerState,
    rotate_sensitivity: f32,
    zoom_speed: f32,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

impl InputTracker {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            pointer: PointerState::default(),
            rotate_sensitivity: config.rotate_sensitivity,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Dispatch any raw event to the matching handler.
    pub fn handle(&mut self, event: &InputEvent) -> Option<Directive> {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.on_pointer_down(*x, *y);
                None
            }
            InputEvent::PointerMove { x, y } => self.on_pointer_move(*x, *y),
            InputEvent::PointerUp => {
                self.on_pointer_up();
                None
            }
            InputEvent::Wheel { delta_y } => Some(self.on_wheel(*delta_y)),
            InputEvent::KeyDown { key } => self.on_key_down(key),
            InputEvent::KeyUp { key } => self.on_key_up(key),
            InputEvent::FocusLost => {
                self.on_pointer_up();
                Some(Directive::ReleaseAll)
            }
        }
    }

    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.pointer.dragging = true;
        self.pointer.last = Vec2::new(x, y);
    }

    /// Horizontal drag becomes yaw, vertical drag becomes pitch.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> Option<Directive> {
        if !self.pointer.dragging {
            return None;
        }
        let current = Vec2::new(x, y);
        let delta = current - self.pointer.last;
        self.pointer.last = current;
        Some(Directive::Rotate(Vec2::new(
            delta.y * self.rotate_sensitivity,
            delta.x * self.rotate_sensitivity,
        )))
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer.dragging = false;
    }

    pub fn on_wheel(&mut self, delta_y: f32) -> Directive {
        Directive::Zoom(delta_y * self.zoom_speed)
    }

    pub fn on_key_down(&mut self, key: &str) -> Option<Directive> {
        Self::pan(key, true)
    }

    pub fn on_key_up(&mut self, key: &str) -> Option<Directive> {
        Self::pan(key, false)
    }

    fn pan(key: &str, active: bool) -> Option<Directive> {
        let Some(direction) = PanDirection::from_key(key) else {
            tracing::trace!("ignoring key {key:?}");
            return None;
        };
        Some(Directive::Pan { direction, active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(d: Option<Directive>) -> Vec2 {
        match d {
            Some(Directive::Rotate(v)) => v,
            other => panic!("expected rotate, got {other:?}"),
        }
    }

    #[test]
    fn move_without_drag_is_noop() {
        let mut t = InputTracker::default();
        assert_eq!(t.on_pointer_move(50.0, 50.0), None);
        assert_eq!(t.pointer().last, Vec2::ZERO);
    }

    #[test]
    fn drag_scenario_deltas() {
        let mut t = InputTracker::default();
        t.on_pointer_down(100.0, 100.0);
        let r = rotate(t.on_pointer_move(150.0, 130.0));
        assert!((r.y - 0.25).abs() < 1e-6, "yaw {}", r.y);
        assert!((r.x - 0.15).abs() < 1e-6, "pitch {}", r.x);
        assert_eq!(t.pointer().last, Vec2::new(150.0, 130.0));
    }

    #[test]
    fn consecutive_moves_are_relative() {
        let mut t = InputTracker::default();
        t.on_pointer_down(0.0, 0.0);
        t.on_pointer_move(10.0, 0.0);
        let r = rotate(t.on_pointer_move(10.0, 20.0));
        assert_eq!(r.y, 0.0);
        assert!((r.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn pointer_up_ends_drag() {
        let mut t = InputTracker::default();
        t.on_pointer_down(0.0, 0.0);
        t.on_pointer_up();
        assert!(!t.pointer().dragging);
        assert_eq!(t.on_pointer_move(5.0, 5.0), None);
    }

    #[test]
    fn wheel_scales_delta() {
        let mut t = InputTracker::default();
        match t.on_wheel(100.0) {
            Directive::Zoom(dz) => assert!((dz - 0.1).abs() < 1e-6),
            other => panic!("expected zoom, got {other:?}"),
        }
        assert_eq!(t.on_wheel(0.0), Directive::Zoom(0.0));
    }

    #[test]
    fn keys_map_to_pan() {
        let mut t = InputTracker::default();
        assert_eq!(
            t.handle(&InputEvent::key_down("a")),
            Some(Directive::Pan {
                direction: PanDirection::Left,
                active: true
            })
        );
        assert_eq!(
            t.handle(&InputEvent::key_up("ArrowLeft")),
            Some(Directive::Pan {
                direction: PanDirection::Left,
                active: false
            })
        );
        assert_eq!(t.handle(&InputEvent::key_down("x")), None);
    }

    #[test]
    fn focus_lost_releases_everything() {
        let mut t = InputTracker::default();
        t.on_pointer_down(1.0, 1.0);
        assert_eq!(t.handle(&InputEvent::FocusLost), Some(Directive::ReleaseAll));
        assert!(!t.pointer().dragging);
    }
}
