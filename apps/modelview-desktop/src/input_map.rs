//! Translation from winit events to platform-neutral [`InputEvent`]s.

use glam::Vec2;
use modelview_input::InputEvent;
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::{Key, NamedKey};

/// Pixels per wheel "line", matching what browsers report per notch.
const LINE_HEIGHT_PX: f32 = 100.0;

/// DOM-style key name for a logical key, if it has one we care about.
///
/// Character keys keep their case, so `W` with shift held stays `W`.
pub fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".into()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".into()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".into()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".into()),
        Key::Character(s) => Some(s.to_string()),
        _ => None,
    }
}

pub fn key_event(key: &Key, state: ElementState) -> Option<InputEvent> {
    let key = key_name(key)?;
    Some(match state {
        ElementState::Pressed => InputEvent::KeyDown { key },
        ElementState::Released => InputEvent::KeyUp { key },
    })
}

/// Wheel delta in the DOM convention: positive when scrolling down.
pub fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

pub fn button_event(state: ElementState, cursor: Vec2) -> InputEvent {
    match state {
        ElementState::Pressed => InputEvent::PointerDown {
            x: cursor.x,
            y: cursor.y,
        },
        ElementState::Released => InputEvent::PointerUp,
    }
}
