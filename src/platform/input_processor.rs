//=========================================================================
// Input Processor
//=========================================================================
//
// Converts platform-specific Winit events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent (engine type) → InputBuffer
//
// Stateful modifier tracking: Caches modifier state from ModifiersChanged
// events and applies it to all subsequent key and button events. Keys
// without an engine KeyCode are filtered (returns None).
//
// Wheel motion yields a MouseWheel event followed by one press/release
// pair of the matching wheel button per notch.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== Constants ===========================================================

/// Pixel scroll distance counted as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

//=== InputProcessor ======================================================

/// Converts Winit events to engine InputEvents with stateful modifier tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a Winit KeyEvent to InputEvent (filters unmapped keys).
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        let key_code = match key_event.physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            _ => return None,
        };

        if matches!(key_code, KeyCode::Unidentified) {
            return None;
        }

        Some(self.create_key_input_event(key_code, key_event.state, key_event.text.as_deref()))
    }

    /// Converts a Winit mouse button event to InputEvent (with modifiers).
    pub(crate) fn process_mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        self.create_button_event(MouseButton::from(button), state)
    }

    /// Creates a mouse move event (window pixels, no modifiers).
    pub(crate) fn process_mouse_move(&self, x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMove { x, y }
    }

    /// Converts a scroll into a MouseWheel event plus wheel button clicks.
    pub(crate) fn process_wheel(&self, delta: MouseScrollDelta) -> Vec<InputEvent> {
        let (x, y) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (x as f64, y as f64),
            MouseScrollDelta::PixelDelta(pos) => (pos.x / PIXELS_PER_NOTCH, pos.y / PIXELS_PER_NOTCH),
        };

        let mut events = vec![InputEvent::MouseWheel { x, y }];
        let mut clicks = |amount: f64, positive: MouseButton, negative: MouseButton| {
            let button = if amount > 0.0 { positive } else { negative };
            for _ in 0..amount.abs().round() as u32 {
                events.push(self.create_button_event(button, ElementState::Pressed));
                events.push(self.create_button_event(button, ElementState::Released));
            }
        };
        clicks(y, MouseButton::WheelUp, MouseButton::WheelDown);
        clicks(x, MouseButton::WheelRight, MouseButton::WheelLeft);
        events
    }

    /// Window gained or lost keyboard focus.
    pub(crate) fn process_focus(&self, focused: bool) -> InputEvent {
        if focused {
            InputEvent::KeyboardFocusGain
        } else {
            InputEvent::KeyboardFocusLose
        }
    }

    /// Cursor entered or left the window.
    pub(crate) fn process_cursor_presence(&self, inside: bool) -> InputEvent {
        if inside {
            InputEvent::MouseFocusGain
        } else {
            InputEvent::MouseFocusLose
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_key_input_event(&self, key: KeyCode, state: ElementState, text: Option<&str>) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::KeyPress {
                key,
                char: text.and_then(|t| t.chars().next()).filter(|c| !c.is_control()),
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::KeyRelease {
                key,
                modifiers: self.current_modifiers,
            },
        }
    }

    fn create_button_event(&self, button: MouseButton, state: ElementState) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::MouseButtonPress {
                button,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::MouseButtonRelease {
                button,
                modifiers: self.current_modifiers,
            },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Converts Winit ModifiersState to engine Modifiers.
///
/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Converts Winit physical key codes to engine key codes.
///
/// Keys without an engine counterpart (F13-F24, numpad, media keys)
/// return `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Function -----------------------------------------------------

            F1 => KeyCode::F1,
            F2 => KeyCode::F2,
            F3 => KeyCode::F3,
            F4 => KeyCode::F4,
            F5 => KeyCode::F5,
            F6 => KeyCode::F6,
            F7 => KeyCode::F7,
            F8 => KeyCode::F8,
            F9 => KeyCode::F9,
            F10 => KeyCode::F10,
            F11 => KeyCode::F11,
            F12 => KeyCode::F12,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Modifiers ----------------------------------------------------

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,

            //--- Navigation ---------------------------------------------------

            Home => KeyCode::Home,
            End => KeyCode::End,
            PageUp => KeyCode::PageUp,
            PageDown => KeyCode::PageDown,
            Insert => KeyCode::Insert,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            //--- Unmapped (return Unidentified) -------------------------------

            _ => KeyCode::Unidentified,
        }
    }
}

/// Converts Winit mouse buttons to engine buttons.
///
/// Left/Right/Middle mapped directly; Back/Forward/Other → Other.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    fn buttons(events: &[InputEvent]) -> Vec<MouseButton> {
        events
            .iter()
            .filter_map(|e| match e {
                InputEvent::MouseButtonPress { button, .. } => Some(*button),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_with_no_modifiers() {
        let processor = InputProcessor::new();
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);
    }

    #[test]
    fn update_modifiers_works() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, true));

        let mods = processor.current_modifiers();
        assert!(mods.shift && !mods.ctrl && mods.alt);
    }

    #[test]
    fn key_press_carries_text_and_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, false));

        let event = processor.create_key_input_event(KeyCode::KeyS, ElementState::Pressed, Some("S"));
        match event {
            InputEvent::KeyPress { key, char, modifiers } => {
                assert_eq!(key, KeyCode::KeyS);
                assert_eq!(char, Some('S'));
                assert!(modifiers.shift);
            }
            _ => panic!("Expected KeyPress"),
        }
    }

    #[test]
    fn control_characters_are_not_text() {
        let processor = InputProcessor::new();
        let event = processor.create_key_input_event(KeyCode::Enter, ElementState::Pressed, Some("\r"));
        assert!(matches!(event, InputEvent::KeyPress { char: None, .. }));
    }

    #[test]
    fn key_release_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, true, false));

        let event = processor.create_key_input_event(KeyCode::KeyA, ElementState::Released, None);
        match event {
            InputEvent::KeyRelease { key, modifiers } => {
                assert_eq!(key, KeyCode::KeyA);
                assert!(modifiers.shift && modifiers.ctrl);
            }
            _ => panic!("Expected KeyRelease"),
        }
    }

    #[test]
    fn mouse_button_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, false, true));

        let event = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);
        match event {
            InputEvent::MouseButtonPress { button, modifiers } => {
                assert_eq!(button, MouseButton::Left);
                assert!(modifiers.alt);
            }
            _ => panic!("Expected MouseButtonPress"),
        }
    }

    #[test]
    fn wheel_lines_become_button_clicks() {
        let processor = InputProcessor::new();
        let events = processor.process_wheel(MouseScrollDelta::LineDelta(0.0, 2.0));

        assert_eq!(events[0], InputEvent::MouseWheel { x: 0.0, y: 2.0 });
        assert_eq!(events.len(), 5);
        assert_eq!(buttons(&events), vec![MouseButton::WheelUp, MouseButton::WheelUp]);
    }

    #[test]
    fn pixel_scroll_is_converted_to_notches() {
        let processor = InputProcessor::new();
        let events = processor.process_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(-40.0, -80.0)));

        assert_eq!(events[0], InputEvent::MouseWheel { x: -1.0, y: -2.0 });
        assert_eq!(
            buttons(&events),
            vec![MouseButton::WheelDown, MouseButton::WheelDown, MouseButton::WheelLeft]
        );
    }

    #[test]
    fn focus_and_presence_events() {
        let processor = InputProcessor::new();
        assert_eq!(processor.process_focus(true), InputEvent::KeyboardFocusGain);
        assert_eq!(processor.process_focus(false), InputEvent::KeyboardFocusLose);
        assert_eq!(processor.process_cursor_presence(true), InputEvent::MouseFocusGain);
        assert_eq!(processor.process_cursor_presence(false), InputEvent::MouseFocusLose);
    }

    #[test]
    fn keycode_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyA), KeyCode::KeyA);
        assert_eq!(KeyCode::from(WinitKeyCode::F5), KeyCode::F5);
        assert_eq!(KeyCode::from(WinitKeyCode::ShiftRight), KeyCode::ShiftRight);
        assert_eq!(KeyCode::from(WinitKeyCode::PageDown), KeyCode::PageDown);
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(MouseButton::from(WinitMouseButton::Middle), MouseButton::Middle);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }
}
