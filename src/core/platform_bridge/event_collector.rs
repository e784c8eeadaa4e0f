//=========================================================================
// Event Collector
//=========================================================================
//
// Core-side platform event collection with bounded polling and shutdown
// detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → events → Game::tick()
//
// Bounded polling prevents starvation. The logic loop paces itself, so
// an empty queue returns immediately.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::input::InputEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Collects platform events with bounded polling.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    events: Vec<InputEvent>,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(32),
        }
    }

    /// Collects pending platform events (bounded to prevent starvation).
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        const MAX_BATCHES_PER_FRAME: usize = 100;

        let mut drained = 0;
        while drained < MAX_BATCHES_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.handle_event(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_BATCHES_PER_FRAME {
            warn!("Event queue backlog: drained {} batches this frame", drained);
        }

        TickControl::Continue
    }

    /// Events collected so far.
    pub(crate) fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Takes the collected events, leaving the collector empty.
    pub(crate) fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    fn handle_event(&mut self, event: PlatformEvent) -> TickControl {
        match event {
            PlatformEvent::Inputs { discrete, continuous } => {
                self.events.extend(discrete);
                self.events.extend(continuous);
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyCode;
    use crossbeam_channel::unbounded;

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn collect_flattens_batches_discrete_first() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Inputs {
            discrete: vec![InputEvent::key_press(KeyCode::KeyA)],
            continuous: vec![InputEvent::MouseMove { x: 10.0, y: 20.0 }],
        })
        .unwrap();
        tx.send(PlatformEvent::Inputs {
            discrete: vec![InputEvent::key_release(KeyCode::KeyA)],
            continuous: vec![],
        })
        .unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        let events = collector.take_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], InputEvent::key_press(KeyCode::KeyA));
        assert!(matches!(events[1], InputEvent::MouseMove { .. }));
        assert_eq!(events[2], InputEvent::key_release(KeyCode::KeyA));
    }

    #[test]
    fn take_events_empties_collector() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Inputs {
            discrete: vec![InputEvent::key_press(KeyCode::Space)],
            continuous: vec![],
        })
        .unwrap();
        collector.collect_frame();
        assert_eq!(collector.take_events().len(), 1);

        collector.collect_frame();
        assert!(collector.events().is_empty());
    }

    #[test]
    fn collect_returns_exit_on_window_closed() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::WindowClosed).unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }

    #[test]
    fn collect_returns_exit_on_disconnect() {
        let (tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        drop(tx);

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }
}
