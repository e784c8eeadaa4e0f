//=========================================================================
// xSGE - Library Root
//
// Extensions for SGE games released under the GNU GPL.
//
// Modules:
// - `transition`: animated transitions between rooms, drawn from a
//   screenshot of the previous room
//
//=========================================================================

pub mod transition;

pub use transition::{Transition, TransitionGame, TransitionHandle, TransitionKind};
