//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the engine's logic thread.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop        │    │  Game::tick()    │
//  │   ↓                      │    │   ├─ input hooks │
//  │  InputProcessor          │    │   ├─ steps       │
//  │   ├─ Converts Winit      │    │   ├─ collisions  │
//  │   └─ Tracks modifiers    │    │   └─ frame       │
//  │   ↓                      │    │                  │
//  │  InputBuffer             │    └──────────────────┘
//  │   ├─ discrete: Vec<>     │        ↑        │
//  │   └─ continuous: Set<>   │        │        │
//  │   ↓                      │        │        │
//  │  RedrawRequested (flush) ├────────┘        │
//  │                          │  PlatformEvent  │
//  │  about_to_wait           │◄────────────────┘
//  │   └─ shutdown check      │  CoreEvent
//  └──────────────────────────┘
// ```
//
// Key Design Decisions:
// - **RedrawRequested = frame boundary**: all buffered input is sent as
//   one batch
// - **Closing is the game's decision**: the close button only sends a
//   QuitRequest; the window closes when the core reports Shutdown
// - **Graceful channel disconnect**: if the logic thread is gone, the
//   window closes too
// - **Main thread requirement**: Winit mandates the main thread on
//   macOS/iOS, so this runs on the thread that called `Engine::run()`
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

//=== Internal Imports ====================================================

use crate::config::GameConfig;
use crate::core::input::InputEvent;
use crate::core::platform_bridge::{CoreEvent, PlatformError, PlatformEvent};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== Constants ===========================================================

/// Longest the event loop sleeps before checking for shutdown.
const WAKE_INTERVAL: Duration = Duration::from_millis(16);

const DEFAULT_TITLE: &str = "SGE Game";

//=== Platform ============================================================

/// Window manager and input event aggregator.
///
/// Runs on the main thread and exchanges messages with the logic thread
/// through two channels.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(...)` - no window yet
/// 2. **Execution**: `platform.run()` - blocks in the event loop
/// 3. **Event processing**: Winit calls `ApplicationHandler` methods
/// 4. **Shutdown**: the core sends `Shutdown` → the loop exits
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    title: String,
    size: (u32, u32),

    /// Buffers discrete/continuous input until frame boundary.
    buffer: InputBuffer,

    event_sender: Sender<PlatformEvent>,
    shutdown_receiver: Receiver<CoreEvent>,

    input_processor: InputProcessor,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Creates a platform for a game with the given settings. The window
    /// is created lazily in `resumed()`.
    pub(crate) fn new(
        config: &GameConfig,
        event_sender: Sender<PlatformEvent>,
        shutdown_receiver: Receiver<CoreEvent>,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            title: config.window_text.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            size: (config.width, config.height),
            buffer: InputBuffer::new(),
            event_sender,
            shutdown_receiver,
            input_processor: InputProcessor::new(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the game ends or the window is lost.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails while running.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread on platforms that require it.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        event_loop
            .run_app(&mut self)
            .map_err(|e| PlatformError::EventLoopExecution(e.to_string()))
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the core as one batch.
    ///
    /// If the channel is disconnected, logs a warning and drops the
    /// events; the next shutdown check closes the window.
    fn flush_input_buffer(&mut self) {
        if let Some((discrete, continuous)) = self.buffer.drain() {
            let discrete_count = discrete.len();
            let continuous_count = continuous.len();

            trace!(
                target: "platform::input",
                "Flushing {} discrete + {} continuous events",
                discrete_count,
                continuous_count
            );

            if self.event_sender.send(PlatformEvent::Inputs { discrete, continuous }).is_err() {
                warn!(
                    target: "platform::input",
                    "Channel disconnected, dropping {} events",
                    discrete_count + continuous_count
                );
            }
        }
    }

    /// Forwards a close request to the game right away.
    fn request_quit(&mut self) {
        info!(target: "platform", "Window close requested");
        self.buffer.push(InputEvent::QuitRequest);
        self.flush_input_buffer();
    }

    /// Whether the core asked to close, or is gone.
    fn shutdown_requested(&self) -> bool {
        match self.shutdown_receiver.try_recv() {
            Ok(CoreEvent::Shutdown) => {
                info!(target: "platform", "Shutdown received from core");
                true
            }
            Err(TryRecvError::Disconnected) => {
                warn!(target: "platform", "Core thread disconnected");
                true
            }
            Err(TryRecvError::Empty) => false,
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window on startup (or mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1))
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                let _ = self.event_sender.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.request_quit(),

            WindowEvent::Destroyed => {
                info!(target: "platform", "Window destroyed");
                let _ = self.event_sender.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.input_processor.process_mouse_move(position.x, position.y);
                self.buffer.push(event);
            }

            WindowEvent::CursorEntered { .. } => {
                self.buffer.push(self.input_processor.process_cursor_presence(true));
            }

            WindowEvent::CursorLeft { .. } => {
                self.buffer.push(self.input_processor.process_cursor_presence(false));
            }

            WindowEvent::Focused(focused) => {
                self.buffer.push(self.input_processor.process_focus(focused));
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(&key_event) {
                    self.buffer.push(event);
                } else {
                    trace!(target: "platform::input", "Unmapped key ignored");
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(button, state);
                self.buffer.push(event);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                for event in self.input_processor.process_wheel(delta) {
                    self.buffer.push(event);
                }
            }

            WindowEvent::RedrawRequested => {
                // Frame boundary: flush all buffered input
                self.flush_input_buffer();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    /// Checks for shutdown once the event queue is empty.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown_requested() {
            self.flush_input_buffer();
            event_loop.exit();
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + WAKE_INTERVAL));
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

    fn platform() -> (Platform, Receiver<PlatformEvent>, Sender<CoreEvent>) {
        let (tx, rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let config = GameConfig {
            window_text: Some("Pong".to_string()),
            ..GameConfig::default()
        };
        (Platform::new(&config, tx, shutdown_rx), rx, shutdown_tx)
    }

    //=====================================================================
    // Platform Tests
    //=====================================================================

    #[test]
    fn platform_creation() {
        let (platform, _rx, _shutdown) = platform();
        assert!(platform.window().is_none(), "Window should be created lazily");
        assert_eq!(platform.title, "Pong");
        assert_eq!(platform.size, (640, 480));
    }

    #[test]
    fn flush_empty_buffer_is_noop() {
        let (mut platform, rx, _shutdown) = platform();
        platform.flush_input_buffer();
        assert!(rx.try_recv().is_err(), "No events should be sent for empty buffer");
    }

    #[test]
    fn flush_sends_buffered_events() {
        let (mut platform, rx, _shutdown) = platform();
        platform.buffer.push(InputEvent::key_press(KeyCode::Space));
        platform.buffer.push(InputEvent::MouseMove { x: 1.0, y: 2.0 });

        platform.flush_input_buffer();

        match rx.try_recv() {
            Ok(PlatformEvent::Inputs { discrete, continuous }) => {
                assert_eq!(discrete.len(), 1);
                assert_eq!(continuous.len(), 1);
            }
            other => panic!("Expected Inputs event, got {:?}", other),
        }
    }

    #[test]
    fn flush_handles_disconnected_channel() {
        let (mut platform, rx, _shutdown) = platform();
        platform.buffer.push(InputEvent::key_press(KeyCode::Space));
        drop(rx);

        // Should not panic, just log warning
        platform.flush_input_buffer();
    }

    #[test]
    fn close_request_is_sent_as_quit_input() {
        let (mut platform, rx, _shutdown) = platform();
        platform.request_quit();

        match rx.try_recv() {
            Ok(PlatformEvent::Inputs { discrete, .. }) => {
                assert_eq!(discrete, vec![InputEvent::QuitRequest]);
            }
            other => panic!("Expected Inputs event, got {:?}", other),
        }
    }

    #[test]
    fn shutdown_detection() {
        let (platform, _rx, shutdown) = platform();
        assert!(!platform.shutdown_requested());

        shutdown.send(CoreEvent::Shutdown).unwrap();
        assert!(platform.shutdown_requested());

        drop(shutdown);
        assert!(platform.shutdown_requested());
    }
}
