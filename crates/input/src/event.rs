use serde::{Deserialize, Serialize};

/// A raw device event, already stripped of platform types.
///
/// Coordinates are in viewport pixels. Wheel deltas follow the DOM
/// convention: positive `delta_y` means scrolling down (zoom out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    Wheel { delta_y: f32 },
    /// `key` is a DOM key name such as `ArrowUp` or `w`.
    KeyDown { key: String },
    KeyUp { key: String },
    /// The viewport lost keyboard focus; held keys will never report release.
    FocusLost,
}

impl InputEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        Self::KeyUp { key: key.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_yaml() {
        let yaml = "- { type: pointer_down, x: 100, y: 100 }\n\
                    - { type: wheel, delta_y: -120 }\n\
                    - { type: key_down, key: ArrowUp }\n\
                    - { type: focus_lost }\n";
        let events: Vec<InputEvent> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::PointerDown { x: 100.0, y: 100.0 },
                InputEvent::Wheel { delta_y: -120.0 },
                InputEvent::key_down("ArrowUp"),
                InputEvent::FocusLost,
            ]
        );
    }
}
