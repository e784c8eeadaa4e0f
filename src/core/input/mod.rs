//=========================================================================
// Input System
//=========================================================================
//
// Portable input events and the state tracked from them.
//
// Architecture:
//   platform ──> InputEvent batches ──> StateTracker (queries)
//                                  └──> input hooks (game, room, objects)
//
//=========================================================================

//=== Module Declarations =================================================

mod event;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;
