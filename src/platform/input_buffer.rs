//=========================================================================
// Input Buffer
//
// Collects the input events of one redraw interval before they are sent
// to the logic thread.
//
// Responsibilities:
// - Keep discrete events (keys, buttons, wheel, focus) in arrival order
// - Coalesce continuous events so only the latest mouse position and
//   the latest value of each joystick axis survive
// - Hand both sets over atomically via `drain()`
//
// Notes:
// Repeated identical discrete events (OS key repeat) are collapsed.
//=========================================================================

//=== Standard Library Imports ============================================
use std::collections::HashSet;

//=== Internal Modules ====================================================
use crate::core::input::InputEvent;

//=== InputBuffer Struct ==================================================
//
// Internally maintains:
// - `discrete`: one-shot inputs, in order
// - `continuous`: last-known state of each continuous input
//
pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    continuous: HashSet<InputEvent>,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------
    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 64;
        const CONTINUOUS_BASE: usize = 8;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: HashSet::with_capacity(CONTINUOUS_BASE),
        }
    }

    //--- Event Handling ---------------------------------------------------
    //
    // Routes an event to the matching store.
    //
    pub(crate) fn push(&mut self, event: InputEvent) {
        if event.is_continuous() {
            self.push_continuous(event);
        } else {
            self.push_discrete(event);
        }
    }

    /// Inserts or replaces a continuous input.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        self.continuous.replace(event);
    }

    /// Appends a discrete input unless it repeats the previous one.
    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    //--- Drain ------------------------------------------------------------
    //
    // Returns `(discrete, continuous)` and empties the buffer, or `None`
    // when nothing was collected.
    //
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let discrete = std::mem::take(&mut self.discrete);
        let continuous = self.continuous.drain().collect();
        Some((discrete, continuous))
    }

    //--- Utilities --------------------------------------------------------
    pub(crate) fn len(&self) -> usize {
        self.discrete.len() + self.continuous.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyCode;

    fn mouse_move(x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMove { x, y }
    }

    fn axis(js_id: u32, axis: u32, value: f64) -> InputEvent {
        InputEvent::JoystickAxisMove {
            js_name: "pad".to_string(),
            js_id,
            axis,
            value,
        }
    }

    #[test]
    fn repeated_discrete_events_collapse() {
        let mut buffer = InputBuffer::new();
        buffer.push(InputEvent::key_press(KeyCode::KeyA));
        buffer.push(InputEvent::key_press(KeyCode::KeyA));
        buffer.push(InputEvent::key_press(KeyCode::KeyB));
        buffer.push(InputEvent::key_press(KeyCode::KeyA));
        assert_eq!(buffer.discrete.len(), 3);
    }

    #[test]
    fn latest_mouse_position_wins() {
        let mut buffer = InputBuffer::new();
        buffer.push(mouse_move(10.0, 10.0));
        buffer.push(mouse_move(20.0, 30.0));
        assert_eq!(buffer.continuous.len(), 1);

        let (_, continuous) = buffer.drain().unwrap();
        match &continuous[0] {
            InputEvent::MouseMove { x, y } => assert_eq!((*x, *y), (20.0, 30.0)),
            other => panic!("Expected MouseMove, found {:?}", other),
        }
    }

    #[test]
    fn axes_coalesce_per_joystick_and_axis() {
        let mut buffer = InputBuffer::new();
        buffer.push(axis(0, 0, 0.1));
        buffer.push(axis(0, 0, 0.5));
        buffer.push(axis(0, 1, 0.2));
        buffer.push(axis(1, 0, -0.3));
        assert_eq!(buffer.continuous.len(), 3);
    }

    #[test]
    fn drain_splits_and_clears() {
        let mut buffer = InputBuffer::new();
        buffer.push(InputEvent::key_press(KeyCode::KeyA));
        buffer.push(InputEvent::MouseWheel { x: 0.0, y: 1.0 });
        buffer.push(mouse_move(5.0, 5.0));
        assert_eq!(buffer.len(), 3);

        let (discrete, continuous) = buffer.drain().unwrap();
        assert_eq!((discrete.len(), continuous.len()), (2, 1));
        assert!(buffer.is_empty());
    }

    #[test]
    fn empty_buffer_drains_to_none() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());
    }
}
