//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit) with the logic thread.
//
// This module defines the contract between the platform implementation
// and the game loop, so the window backend can change without touching
// core code.
//
// Components:
// - `interface`: messages in both directions and platform errors
// - `event_collector`: core-side event collection
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub use event_collector::TickControl;

pub(crate) use event_collector::EventCollector;
pub(crate) use interface::{CoreEvent, PlatformError, PlatformEvent};
