//=========================================================================
// SGE (Stellar Game Engine) - Library Root
//
// This crate defines the public API surface of the engine.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose the game model (`core`: rooms, objects, graphics, input)
// - Keep the window layer (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use sge::prelude::*;
//
// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
// enum Level { Main }
// impl RoomKey for Level {}
//
// EngineBuilder::<Level>::new()
//     .build()
//     .init(|game| game.register_start_room(Level::Main, Room::new(640.0, 480.0)))
//     .run()
//     .unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the game model and the logic thread. `config` and
// `error` hold the settings and error types shared by everything.
//
pub mod config;
pub mod core;
pub mod error;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the winit window and event loop and is not part
// of the public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use config::GameConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{Result, SgeError};
