//=========================================================================
// Input Event Types
//
// Defines the engine's representation of input events.
//
// Platform input (winit) is translated into these portable types before
// it reaches the game thread. Objects, rooms and the game receive them
// through their `input` hooks.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    StateTracker (held keys, mouse, joysticks)
//         ↓
//    input hooks (game → room → objects)
// ```
//
// Equality is tuned for event coalescing: continuous events (mouse and
// joystick axis motion) compare equal regardless of their values, so
// only the latest one of each survives a frame.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== MouseButton =========================================================

/// Mouse button identifier.
///
/// Wheel motion is also reported as button presses, one per notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,

    /// Any other button (side buttons, thumb buttons, macro keys).
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// The character, if any, travels in [`InputEvent::KeyPress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Modifier Keys ----------------------------------------------------

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    //--- Navigation Keys --------------------------------------------------

    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Fallback for keys not explicitly mapped by the input layer.
    Unidentified,
}

//=== InputEvent ==========================================================

/// An input event delivered to the game.
///
/// # Equality & Hashing Semantics
///
/// ```text
/// KeyPress{A, CTRL}        == KeyPress{A, CTRL}        ✓ (char ignored)
/// KeyPress{A, CTRL}        == KeyPress{A, SHIFT}       ✗
/// MouseMove{..}            == MouseMove{..}            ✓ (always equal)
/// JoystickAxisMove{id 0, axis 1, ..} == same id/axis  ✓ (value ignored)
/// MouseWheel{0, 1}         == MouseWheel{0, 2}         ✗
/// ```
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key pressed. `char` is the text the key produced, if any.
    KeyPress {
        key: KeyCode,
        char: Option<char>,
        modifiers: Modifiers,
    },

    KeyRelease {
        key: KeyCode,
        modifiers: Modifiers,
    },

    /// Mouse cursor moved, in window pixels from the top-left corner.
    MouseMove { x: f64, y: f64 },

    MouseButtonPress {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseButtonRelease {
        button: MouseButton,
        modifiers: Modifiers,
    },

    /// Scroll amount in notches; positive `y` scrolls up.
    MouseWheel { x: f64, y: f64 },

    /// A joystick axis moved to `value` in `-1.0..=1.0`.
    JoystickAxisMove {
        js_name: String,
        js_id: u32,
        axis: u32,
        value: f64,
    },

    /// A joystick hat moved; `x`/`y` are `-1`, `0` or `1`.
    JoystickHatMove {
        js_name: String,
        js_id: u32,
        hat: u32,
        x: i8,
        y: i8,
    },

    /// A joystick trackball moved by a relative amount.
    JoystickTrackballMove {
        js_name: String,
        js_id: u32,
        ball: u32,
        x: f64,
        y: f64,
    },

    JoystickButtonPress {
        js_name: String,
        js_id: u32,
        button: u32,
    },

    JoystickButtonRelease {
        js_name: String,
        js_id: u32,
        button: u32,
    },

    KeyboardFocusGain,
    KeyboardFocusLose,
    MouseFocusGain,
    MouseFocusLose,

    /// The user asked to close the window.
    QuitRequest,

    /// Unrecognized or unsupported event. Ignored by the engine.
    Unidentified,
}

//--- Implementation ------------------------------------------------------

impl InputEvent {
    /// A key press without text and modifiers.
    pub fn key_press(key: KeyCode) -> Self {
        Self::KeyPress {
            key,
            char: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_release(key: KeyCode) -> Self {
        Self::KeyRelease {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Returns a new event with updated modifiers (consumes self).
    ///
    /// Has no effect on events without modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        match &mut self {
            Self::KeyPress { modifiers: m, .. }
            | Self::KeyRelease { modifiers: m, .. }
            | Self::MouseButtonPress { modifiers: m, .. }
            | Self::MouseButtonRelease { modifiers: m, .. } => {
                *m = modifiers;
            }
            _ => {}
        }
        self
    }

    /// Whether only the latest event of this kind matters within a frame.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::MouseMove { .. } | Self::JoystickAxisMove { .. })
    }

    /// Focus events go to the game and the room, never to objects.
    pub fn is_focus(&self) -> bool {
        matches!(
            self,
            Self::KeyboardFocusGain | Self::KeyboardFocusLose | Self::MouseFocusGain | Self::MouseFocusLose
        )
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (
                KeyPress { key: a, modifiers: ma, .. },
                KeyPress { key: b, modifiers: mb, .. },
            ) => a == b && ma == mb,
            (KeyRelease { key: a, modifiers: ma }, KeyRelease { key: b, modifiers: mb }) => {
                a == b && ma == mb
            }
            (
                MouseButtonPress { button: a, modifiers: ma },
                MouseButtonPress { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            (
                MouseButtonRelease { button: a, modifiers: ma },
                MouseButtonRelease { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            // Coordinates ignored, always equal
            (MouseMove { .. }, MouseMove { .. }) => true,
            (MouseWheel { x: xa, y: ya }, MouseWheel { x: xb, y: yb }) => {
                xa.to_bits() == xb.to_bits() && ya.to_bits() == yb.to_bits()
            }
            // Value ignored, one entry per axis
            (
                JoystickAxisMove { js_id: ia, axis: aa, .. },
                JoystickAxisMove { js_id: ib, axis: ab, .. },
            ) => ia == ib && aa == ab,
            (
                JoystickHatMove { js_id: ia, hat: ha, x: xa, y: ya, .. },
                JoystickHatMove { js_id: ib, hat: hb, x: xb, y: yb, .. },
            ) => ia == ib && ha == hb && xa == xb && ya == yb,
            (
                JoystickTrackballMove { js_id: ia, ball: ba, x: xa, y: ya, .. },
                JoystickTrackballMove { js_id: ib, ball: bb, x: xb, y: yb, .. },
            ) => ia == ib && ba == bb && xa.to_bits() == xb.to_bits() && ya.to_bits() == yb.to_bits(),
            (
                JoystickButtonPress { js_id: ia, button: ba, .. },
                JoystickButtonPress { js_id: ib, button: bb, .. },
            )
            | (
                JoystickButtonRelease { js_id: ia, button: ba, .. },
                JoystickButtonRelease { js_id: ib, button: bb, .. },
            ) => ia == ib && ba == bb,
            (KeyboardFocusGain, KeyboardFocusGain)
            | (KeyboardFocusLose, KeyboardFocusLose)
            | (MouseFocusGain, MouseFocusGain)
            | (MouseFocusLose, MouseFocusLose)
            | (QuitRequest, QuitRequest)
            | (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

/// Hashes the fields equality looks at (a == b → hash(a) == hash(b)).
impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyPress { key, modifiers, .. } | Self::KeyRelease { key, modifiers } => {
                key.hash(state);
                modifiers.hash(state);
            }
            Self::MouseButtonPress { button, modifiers }
            | Self::MouseButtonRelease { button, modifiers } => {
                button.hash(state);
                modifiers.hash(state);
            }
            Self::MouseWheel { x, y } => {
                x.to_bits().hash(state);
                y.to_bits().hash(state);
            }
            Self::JoystickAxisMove { js_id, axis, .. } => {
                js_id.hash(state);
                axis.hash(state);
            }
            Self::JoystickHatMove { js_id, hat, x, y, .. } => {
                js_id.hash(state);
                hat.hash(state);
                x.hash(state);
                y.hash(state);
            }
            Self::JoystickTrackballMove { js_id, ball, x, y, .. } => {
                js_id.hash(state);
                ball.hash(state);
                x.to_bits().hash(state);
                y.to_bits().hash(state);
            }
            Self::JoystickButtonPress { js_id, button, .. }
            | Self::JoystickButtonRelease { js_id, button, .. } => {
                js_id.hash(state);
                button.hash(state);
            }
            // Payload-free variants and MouseMove: only discriminant matters
            _ => {}
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Left and right variants are not distinguished here; the key events
/// of the modifier keys themselves carry that information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,

    /// Ctrl key held (Command on macOS).
    pub ctrl: bool,

    /// Alt key held (Option on macOS).
    pub alt: bool,
}

//--- Modifier Constants --------------------------------------------------

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };

    pub const ALL: Self = Self {
        shift: true,
        ctrl: true,
        alt: true,
    };
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    //--- Test Helpers -----------------------------------------------------

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn mouse_press(button: MouseButton) -> InputEvent {
        InputEvent::MouseButtonPress {
            button,
            modifiers: Modifiers::NONE,
        }
    }

    fn axis(js_id: u32, axis: u32, value: f64) -> InputEvent {
        InputEvent::JoystickAxisMove {
            js_name: "pad".into(),
            js_id,
            axis,
            value,
        }
    }

    //=====================================================================
    // Equality Tests
    //=====================================================================

    #[test]
    fn key_press_ignores_char() {
        let a = InputEvent::KeyPress {
            key: KeyCode::KeyA,
            char: Some('a'),
            modifiers: Modifiers::NONE,
        };
        assert_eq!(a, InputEvent::key_press(KeyCode::KeyA));
    }

    #[test]
    fn different_modifiers_differ() {
        let a = InputEvent::key_press(KeyCode::KeyA);
        let b = InputEvent::key_press(KeyCode::KeyA).with_modifiers(Modifiers::CTRL);
        assert_ne!(a, b);
    }

    #[test]
    fn press_and_release_differ() {
        assert_ne!(InputEvent::key_press(KeyCode::KeyA), InputEvent::key_release(KeyCode::KeyA));
        assert_ne!(mouse_press(MouseButton::Left), mouse_press(MouseButton::Right));
    }

    #[test]
    fn mouse_move_ignores_coordinates() {
        let a = InputEvent::MouseMove { x: 10.0, y: 10.0 };
        let b = InputEvent::MouseMove { x: 200.0, y: 300.0 };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn axis_move_is_keyed_by_axis() {
        assert_eq!(axis(0, 1, 0.5), axis(0, 1, -0.5));
        assert_eq!(hash_of(&axis(0, 1, 0.5)), hash_of(&axis(0, 1, -0.5)));
        assert_ne!(axis(0, 1, 0.5), axis(0, 2, 0.5));
        assert_ne!(axis(0, 1, 0.5), axis(1, 1, 0.5));
    }

    #[test]
    fn wheel_compares_amounts() {
        let a = InputEvent::MouseWheel { x: 0.0, y: 1.0 };
        let b = InputEvent::MouseWheel { x: 0.0, y: 2.0 };
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn payload_free_events_are_equal() {
        assert_eq!(InputEvent::QuitRequest, InputEvent::QuitRequest);
        assert_ne!(InputEvent::KeyboardFocusGain, InputEvent::MouseFocusGain);
        assert_eq!(hash_of(&InputEvent::Unidentified), hash_of(&InputEvent::Unidentified));
    }

    //=====================================================================
    // Hashing Tests
    //=====================================================================

    #[test]
    fn hash_distinguishes_keys_and_kinds() {
        let a = InputEvent::key_press(KeyCode::KeyA);
        assert_ne!(hash_of(&a), hash_of(&InputEvent::key_press(KeyCode::KeyB)));
        assert_ne!(hash_of(&a), hash_of(&InputEvent::key_release(KeyCode::KeyA)));
    }

    #[test]
    fn hash_equality_contract_key_press() {
        let a = InputEvent::KeyPress {
            key: KeyCode::Space,
            char: Some(' '),
            modifiers: Modifiers::NONE,
        };
        let b = InputEvent::key_press(KeyCode::Space);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    //=====================================================================
    // Helpers
    //=====================================================================

    #[test]
    fn with_modifiers_updates_buttons() {
        match mouse_press(MouseButton::Left).with_modifiers(Modifiers::ALT) {
            InputEvent::MouseButtonPress { button, modifiers } => {
                assert_eq!(button, MouseButton::Left);
                assert_eq!(modifiers, Modifiers::ALT);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn with_modifiers_ignores_motion() {
        let event = InputEvent::MouseMove { x: 10.0, y: 20.0 };
        assert_eq!(event.clone().with_modifiers(Modifiers::CTRL), event);
    }

    #[test]
    fn classification() {
        assert!(InputEvent::MouseMove { x: 0.0, y: 0.0 }.is_continuous());
        assert!(axis(0, 0, 0.0).is_continuous());
        assert!(!InputEvent::MouseWheel { x: 0.0, y: 1.0 }.is_continuous());
        assert!(InputEvent::MouseFocusLose.is_focus());
        assert!(!InputEvent::QuitRequest.is_focus());
    }
}
