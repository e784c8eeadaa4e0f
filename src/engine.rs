//=========================================================================
// SGE Engine
//
// Main entry point: configures a game and runs it in a window.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_config()           ├─ init(): register rooms, handlers
//         ├─ with_fps()              └─ spawns the logic thread
//         └─ with_channel_capacity()    runs the platform
//                                       blocks until the game ends
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::game::Game;
use crate::core::platform_bridge::{CoreEvent, PlatformEvent};
use crate::core::room::RoomKey;
use crate::core::CoreSystemsOrchestrator;
use crate::error::{Result, SgeError};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// Everything defaults to [`GameConfig::default`]: a 640x480 window at
/// 60 fps and a 128-event channel.
///
/// # Examples
///
/// ```no_run
/// use sge::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Level { Main }
/// impl RoomKey for Level {}
///
/// EngineBuilder::<Level>::new()
///     .with_fps(30.0)
///     .with_window_text("Demo")
///     .build()
///     .init(|game| {
///         game.register_start_room(Level::Main, Room::new(640.0, 480.0));
///     })
///     .run()
///     .unwrap();
/// ```
pub struct EngineBuilder<R: RoomKey> {
    config: GameConfig,
    _phantom: std::marker::PhantomData<R>,
}

impl<R: RoomKey> EngineBuilder<R> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Replaces all settings, e.g. with a config loaded from TOML.
    ///
    /// # Panics
    ///
    /// Panics if the config's fps or channel capacity is not positive.
    pub fn with_config(self, config: GameConfig) -> Self {
        let fps = config.fps;
        let capacity = config.channel_capacity;
        Self { config, ..self }.with_fps(fps).with_channel_capacity(capacity)
    }

    /// Sets the game's frame rate, which is also the logic thread's tick
    /// rate.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_fps(mut self, fps: f64) -> Self {
        assert!(fps > 0.0, "FPS must be positive, got {}", fps);
        self.config.fps = fps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.channel_capacity = capacity;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_window_text(mut self, text: impl Into<String>) -> Self {
        self.config.window_text = Some(text.into());
        self
    }

    /// Builds the engine and its game.
    pub fn build(self) -> Engine<R> {
        info!(
            "Building engine (FPS: {}, channel: {})",
            self.config.fps, self.config.channel_capacity
        );

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(Game::new(self.config)),
        }
    }
}

impl<R: RoomKey> Default for EngineBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// SGE runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ fps)
///   │     └─► Game::tick()
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Input Polling
///
/// Communication: PlatformEvent (platform → core), CoreEvent (core → platform)
/// ```
pub struct Engine<R: RoomKey> {
    orchestrator: CoreSystemsOrchestrator<R>,
}

impl<R: RoomKey> Engine<R> {
    //--- Initialization ---------------------------------------------------

    /// Sets the game up before it runs: rooms, start room, handler,
    /// renderer.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut Game<R>),
    {
        info!("Initializing game");
        init_fn(self.orchestrator.game_mut());
        info!("Game initialization complete");
        self
    }

    /// Gives up the window and returns the game, to be ticked by hand.
    pub fn into_game(self) -> Game<R> {
        self.orchestrator.into_game()
    }

    //--- Execution --------------------------------------------------------

    /// Starts the engine runtime and blocks until the game ends.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → core and core → platform channels
    /// 2. Spawns the logic thread ticking the game at its fps
    /// 3. Runs the platform event loop (blocks here)
    /// 4. The game ends → core sends Shutdown → event loop exits
    ///
    /// # Errors
    ///
    /// Returns [`SgeError::Platform`] if the window system fails.
    pub fn run(mut self) -> Result<()> {
        let config = self.orchestrator.game_mut().context().config().clone();
        info!("Starting engine runtime (FPS: {})", config.target_fps());

        //--- 1. Create communication channels ----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) = bounded(config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = unbounded::<CoreEvent>();

        //--- 2. Spawn the core logic thread -------------------------------
        let core_handle = self.orchestrator.spawn_core_thread(rx, shutdown_tx);
        info!("Core logic thread spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let platform = Platform::new(&config, tx, shutdown_rx);
        let platform_result = platform.run();
        info!("Platform event loop exited");

        //--- 4. Cleanup: Wait for logic thread to terminate --------------
        match core_handle.join() {
            Ok(()) => info!("Core thread terminated cleanly"),
            Err(e) => error!("Core thread panicked: {:?}", e),
        }

        info!("Engine shutdown complete");
        platform_result.map_err(|e| {
            error!("Platform error: {}", e);
            SgeError::from(e)
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
