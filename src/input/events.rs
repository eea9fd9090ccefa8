use crate::core::{config::Modifier, geo::Point};
use serde::{Deserialize, Serialize};

/// Raw input delivered to the map, in view pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        button: MouseButton,
    },
    DoubleClick {
        position: Point,
        modifiers: KeyModifiers,
    },
    /// Wheel movement; positive `delta` zooms in
    Scroll {
        delta: f64,
        position: Point,
    },
    Resize {
        size: Point,
    },
    /// The pointer left the view
    PointerLeft,
    /// The view lost keyboard focus
    FocusLost,
    KeyPress {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
}

/// Keyboard keys the map reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Escape,
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Whether the configured `modifier` is held
    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
        }
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl InputEvent {
    /// Gets the pointer position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::DoubleClick { position, .. }
            | InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown { .. }
                | InputEvent::PointerMove { .. }
                | InputEvent::PointerUp { .. }
                | InputEvent::DoubleClick { .. }
                | InputEvent::Scroll { .. }
                | InputEvent::PointerLeft
        )
    }

    /// Checks if this is a keyboard event
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, InputEvent::KeyPress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let down = InputEvent::PointerDown {
            position: Point::new(100.0, 200.0),
            button: MouseButton::Left,
            modifiers: KeyModifiers::none(),
        };
        assert_eq!(down.position(), Some(Point::new(100.0, 200.0)));

        let move_event = InputEvent::PointerMove {
            position: Point::new(50.0, 75.0),
        };
        assert_eq!(move_event.position(), Some(Point::new(50.0, 75.0)));
        assert_eq!(InputEvent::FocusLost.position(), None);
    }

    #[test]
    fn test_event_type_checks() {
        let up = InputEvent::PointerUp {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        };
        assert!(up.is_pointer_event());
        assert!(!up.is_keyboard_event());

        let key = InputEvent::KeyPress {
            key: KeyCode::Escape,
            modifiers: KeyModifiers::none(),
        };
        assert!(key.is_keyboard_event());
    }

    #[test]
    fn test_modifier_lookup() {
        let mods = KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        };
        assert!(mods.is_held(Modifier::Ctrl));
        assert!(!mods.is_held(Modifier::Shift));
        assert!(KeyModifiers::shift().is_held(Modifier::Shift));
    }
}
