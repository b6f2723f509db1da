use glam::Vec2;

/// One of the four pannable directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PanDirection {
    pub const ALL: [PanDirection; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Map a DOM key name to a direction. Letter forms are lowercase only.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" => Some(Self::Up),
            "ArrowDown" | "s" => Some(Self::Down),
            "ArrowLeft" | "a" => Some(Self::Left),
            "ArrowRight" | "d" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A normalized instruction derived from a raw device event.
///
/// Downstream state consumes directives, never raw events.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Rotate the model by a delta in radians: `x` is pitch, `y` is yaw.
    Rotate(Vec2),
    /// Move the camera along its approach axis by a delta.
    Zoom(f32),
    /// Start or stop panning in a direction.
    Pan {
        direction: PanDirection,
        active: bool,
    },
    /// Stop panning in every direction.
    ReleaseAll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_and_letter_keys_map() {
        assert_eq!(PanDirection::from_key("ArrowUp"), Some(PanDirection::Up));
        assert_eq!(PanDirection::from_key("w"), Some(PanDirection::Up));
        assert_eq!(PanDirection::from_key("s"), Some(PanDirection::Down));
        assert_eq!(PanDirection::from_key("ArrowLeft"), Some(PanDirection::Left));
        assert_eq!(PanDirection::from_key("d"), Some(PanDirection::Right));
    }

    #[test]
    fn letter_keys_are_case_sensitive() {
        assert_eq!(PanDirection::from_key("W"), None);
        assert_eq!(PanDirection::from_key("D"), None);
    }

    #[test]
    fn unknown_keys_ignored() {
        assert_eq!(PanDirection::from_key("q"), None);
        assert_eq!(PanDirection::from_key(""), None);
        assert_eq!(PanDirection::from_key("Escape"), None);
    }
}
