//=========================================================================
// Core Systems Orchestrator
//
// Engine subsystems and the logic thread that drives them.
//
// Responsibilities:
// - Declare the engine's core modules (rooms, objects, graphics, ...)
// - Receive platform events through the bridge
// - Tick the game at its target frame rate
// - Tell the platform to close once the game has ended
//
// Notes:
// The orchestrator runs independently from the platform layer. It owns
// the game and ticks it in a background thread. Communication with the
// platform happens only through channels, in both directions.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};

//=== Module Declarations =================================================

pub mod alarms;
pub(crate) mod cache;
pub mod collision;
pub mod game;
pub mod gfx;
pub mod input;
pub mod object;
pub(crate) mod platform_bridge;
pub mod room;

//=== Public API ==========================================================

pub use platform_bridge::TickControl;

//=== Internal Modules ====================================================
use game::Game;
use platform_bridge::{CoreEvent, EventCollector, PlatformEvent};
use room::RoomKey;

//=== CoreSystemsOrchestrator =============================================
//
// Owns the game until the logic thread takes it over.
//
pub(crate) struct CoreSystemsOrchestrator<R: RoomKey> {
    game: Game<R>,
}

impl<R: RoomKey> CoreSystemsOrchestrator<R> {
    //--- Construction -----------------------------------------------------
    pub(crate) fn new(game: Game<R>) -> Self {
        Self { game }
    }

    pub(crate) fn game_mut(&mut self) -> &mut Game<R> {
        &mut self.game
    }

    pub(crate) fn into_game(self) -> Game<R> {
        self.game
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Spawns the logic thread. Each tick:
    //  1. Collects input events from the platform
    //  2. Ticks the game with the measured frame time
    //  3. Sleeps to hold the game's target frame rate
    //  4. Exits when the game ends or the platform disappears
    //
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        shutdown: Sender<CoreEvent>,
    ) -> thread::JoinHandle<()> {
        let mut game = self.game;

        thread::spawn(move || {
            let mut collector = EventCollector::new(receiver);
            let mut last_tick: Option<Instant> = None;

            loop {
                let frame_start = Instant::now();
                let frame_duration = Duration::from_secs_f64(1.0 / game.context().config().target_fps());

                //--- Step 1: Gather platform events ------------------------
                if collector.collect_frame() == TickControl::Exit {
                    info!("Platform gone, core thread exiting");
                    break;
                }

                //--- Step 2: Tick the game ---------------------------------
                let real_time_passed = last_tick
                    .map_or(frame_duration, |last| frame_start.duration_since(last))
                    .as_secs_f64()
                    * 1000.0;
                last_tick = Some(frame_start);

                if game.tick(real_time_passed, collector.take_events()) == TickControl::Exit {
                    info!("Game ended, core thread exiting");
                    if shutdown.send(CoreEvent::Shutdown).is_err() {
                        warn!("Platform already gone, shutdown not delivered");
                    }
                    break;
                }

                //--- Step 3: Maintain pacing -------------------------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
