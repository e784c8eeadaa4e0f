//=========================================================================
// State Tracker
//=========================================================================
//
// Input state tracking with per-frame delta tracking.
//
// Architecture:
//   InputEvent → process_events() → held keys/buttons, mouse, joysticks → query
//
// Frame lifecycle: clear() → process_events() → finalize_frame() → query
//
// The game runs this lifecycle at the start of every tick, before any
// input hook fires, so hooks see the state including their own event.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== StateTracker ========================================================

/// Tracks persistent state (keys held) and per-frame deltas (keys pressed/released).
#[derive(Debug, Clone)]
pub struct StateTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: (f64, f64),
    modifiers: Modifiers,
    keyboard_focused: bool,
    mouse_focused: bool,

    joystick_axes: HashMap<(u32, u32), f64>,
    joystick_hats: HashMap<(u32, u32), (i8, i8)>,
    joystick_buttons_down: HashSet<(u32, u32)>,
    joystick_names: HashMap<u32, String>,

    //--- Frame Deltas (reset each frame via clear()) --------------------
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,
    mouse_buttons_pressed_this_frame: HashSet<MouseButton>,
    mouse_buttons_released_this_frame: HashSet<MouseButton>,
    text_this_frame: String,
    wheel_this_frame: (f64, f64),

    //--- Continuous Input (accumulated/calculated) -----------------------
    mouse_delta: (f64, f64),
    last_mouse_position: (f64, f64),
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_position: (0.0, 0.0),
            modifiers: Modifiers::NONE,
            keyboard_focused: true,
            mouse_focused: true,
            joystick_axes: HashMap::new(),
            joystick_hats: HashMap::new(),
            joystick_buttons_down: HashSet::new(),
            joystick_names: HashMap::new(),
            keys_pressed_this_frame: HashSet::new(),
            keys_released_this_frame: HashSet::new(),
            mouse_buttons_pressed_this_frame: HashSet::new(),
            mouse_buttons_released_this_frame: HashSet::new(),
            text_this_frame: String::new(),
            wheel_this_frame: (0.0, 0.0),
            mouse_delta: (0.0, 0.0),
            last_mouse_position: (0.0, 0.0),
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears frame-specific deltas (pressed/released flags).
    pub(crate) fn clear(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
        self.mouse_buttons_pressed_this_frame.clear();
        self.mouse_buttons_released_this_frame.clear();
        self.text_this_frame.clear();
        self.wheel_this_frame = (0.0, 0.0);
        self.last_mouse_position = self.mouse_position;
    }

    pub(crate) fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    /// Finalizes frame calculations (calculates mouse delta).
    pub(crate) fn finalize_frame(&mut self) {
        self.mouse_delta = (
            self.mouse_position.0 - self.last_mouse_position.0,
            self.mouse_position.1 - self.last_mouse_position.1,
        );
    }

    /// Runs the whole frame lifecycle for one batch of events.
    pub(crate) fn update(&mut self, events: &[InputEvent]) {
        self.clear();
        self.process_events(events);
        self.finalize_frame();
    }

    //--- Internal Helpers -------------------------------------------------

    fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPress { key, char, modifiers } => {
                self.modifiers = *modifiers;
                // Only mark as pressed if it wasn't already down
                if self.keys_down.insert(*key) {
                    self.keys_pressed_this_frame.insert(*key);
                }
                if let Some(c) = char {
                    self.text_this_frame.push(*c);
                }
            }

            InputEvent::KeyRelease { key, modifiers } => {
                self.modifiers = *modifiers;
                // Only mark as released if it was actually down
                if self.keys_down.remove(key) {
                    self.keys_released_this_frame.insert(*key);
                }
            }

            InputEvent::MouseButtonPress { button, modifiers } => {
                self.modifiers = *modifiers;
                if self.mouse_buttons_down.insert(*button) {
                    self.mouse_buttons_pressed_this_frame.insert(*button);
                }
            }

            InputEvent::MouseButtonRelease { button, modifiers } => {
                self.modifiers = *modifiers;
                if self.mouse_buttons_down.remove(button) {
                    self.mouse_buttons_released_this_frame.insert(*button);
                }
            }

            InputEvent::MouseMove { x, y } => {
                self.mouse_position = (*x, *y);
            }

            InputEvent::MouseWheel { x, y } => {
                self.wheel_this_frame.0 += x;
                self.wheel_this_frame.1 += y;
            }

            InputEvent::JoystickAxisMove { js_name, js_id, axis, value } => {
                self.joystick_names.insert(*js_id, js_name.clone());
                self.joystick_axes.insert((*js_id, *axis), *value);
            }

            InputEvent::JoystickHatMove { js_name, js_id, hat, x, y } => {
                self.joystick_names.insert(*js_id, js_name.clone());
                self.joystick_hats.insert((*js_id, *hat), (*x, *y));
            }

            InputEvent::JoystickButtonPress { js_name, js_id, button } => {
                self.joystick_names.insert(*js_id, js_name.clone());
                self.joystick_buttons_down.insert((*js_id, *button));
            }

            InputEvent::JoystickButtonRelease { js_id, button, .. } => {
                self.joystick_buttons_down.remove(&(*js_id, *button));
            }

            InputEvent::KeyboardFocusGain => self.keyboard_focused = true,
            InputEvent::KeyboardFocusLose => {
                self.keyboard_focused = false;
                // Releases are never reported once focus is gone
                self.keys_down.clear();
                self.modifiers = Modifiers::NONE;
            }
            InputEvent::MouseFocusGain => self.mouse_focused = true,
            InputEvent::MouseFocusLose => self.mouse_focused = false,

            InputEvent::JoystickTrackballMove { .. }
            | InputEvent::QuitRequest
            | InputEvent::Unidentified => {}
        }
    }

    //=====================================================================
    // Query API - Keyboard
    //=====================================================================

    /// Returns `true` if key transitioned UP → DOWN (one frame only).
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// Returns `true` while key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns `true` if key transitioned DOWN → UP.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released_this_frame.contains(&key)
    }

    /// Text typed this frame, in press order.
    pub fn text(&self) -> &str {
        &self.text_this_frame
    }

    pub fn has_keyboard_focus(&self) -> bool {
        self.keyboard_focused
    }

    //=====================================================================
    // Query API - Mouse
    //=====================================================================

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed_this_frame.contains(&button)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.mouse_buttons_released_this_frame.contains(&button)
    }

    /// Mouse position in window pixels (top-left origin).
    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }

    /// Mouse movement since last frame.
    pub fn mouse_delta(&self) -> (f64, f64) {
        self.mouse_delta
    }

    /// Scrolling done this frame, in notches.
    pub fn mouse_wheel(&self) -> (f64, f64) {
        self.wheel_this_frame
    }

    pub fn has_mouse_focus(&self) -> bool {
        self.mouse_focused
    }

    //=====================================================================
    // Query API - Joysticks
    //=====================================================================

    /// Last reported position of a joystick axis, `0.0` if never moved.
    pub fn joystick_axis(&self, js_id: u32, axis: u32) -> f64 {
        self.joystick_axes.get(&(js_id, axis)).copied().unwrap_or(0.0)
    }

    /// Last reported position of a joystick hat.
    pub fn joystick_hat(&self, js_id: u32, hat: u32) -> (i8, i8) {
        self.joystick_hats.get(&(js_id, hat)).copied().unwrap_or((0, 0))
    }

    pub fn is_joystick_button_down(&self, js_id: u32, button: u32) -> bool {
        self.joystick_buttons_down.contains(&(js_id, button))
    }

    /// Name of a joystick that has reported any event.
    pub fn joystick_name(&self, js_id: u32) -> Option<&str> {
        self.joystick_names.get(&js_id).map(String::as_str)
    }

    //=====================================================================
    // Query API - Modifiers
    //=====================================================================

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn shift_held(&self) -> bool {
        self.modifiers.shift
    }

    pub fn ctrl_held(&self) -> bool {
        self.modifiers.ctrl
    }

    pub fn alt_held(&self) -> bool {
        self.modifiers.alt
    }

    //=====================================================================
    // Query API - Iteration
    //=====================================================================

    pub fn keys_down(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_down.iter()
    }

    pub fn keys_pressed(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_pressed_this_frame.iter()
    }

    pub fn keys_released(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_released_this_frame.iter()
    }

    pub fn buttons_down(&self) -> impl Iterator<Item = &MouseButton> {
        self.mouse_buttons_down.iter()
    }
}

//--- Trait Implementations -----------------------------------------------

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
