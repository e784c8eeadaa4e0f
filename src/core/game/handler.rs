//=========================================================================
// Game & Room Handlers
//=========================================================================
//
// Event hooks of the game as a whole and of individual rooms. Every
// hook has a default, so a handler only implements what it needs.
//
// Dispatch order for every event: game → room → objects.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{EventContext, StepTime};
use crate::core::input::InputEvent;
use crate::core::room::RoomKey;

//=== Game Handler ========================================================

/// Global event hooks.
///
/// # Minimal Implementation
///
/// ```rust
/// # use sge::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Level { Main }
/// # impl RoomKey for Level {}
/// struct Global;
///
/// impl GameHandler<Level> for Global {
///     fn input(&mut self, ctx: &mut EventContext<'_, Level>, event: &InputEvent) {
///         if let InputEvent::KeyPress { key: KeyCode::Escape, .. } = event {
///             ctx.game.end();
///         }
///     }
/// }
/// ```
pub trait GameHandler<R: RoomKey>: Send + 'static {
    /// Fired once, before the first room starts.
    fn game_start(&mut self, _ctx: &mut EventContext<'_, R>) {}

    /// Fired when the game ends, after the room's `room_end`.
    fn game_end(&mut self, _ctx: &mut EventContext<'_, R>) {}

    fn step(&mut self, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn alarm(&mut self, _ctx: &mut EventContext<'_, R>, _name: &str) {}

    fn input(&mut self, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    /// Fired when the user asks to close the window, after the room's
    /// `close`. Ends the game unless overridden.
    fn close(&mut self, ctx: &mut EventContext<'_, R>) {
        ctx.game.end();
    }

    fn paused_step(&mut self, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn paused_input(&mut self, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    /// Replaces `close` while the game is paused. Does nothing unless
    /// overridden.
    fn paused_close(&mut self, _ctx: &mut EventContext<'_, R>) {}
}

impl<R: RoomKey> GameHandler<R> for () {}

//=== Room Handler ========================================================

/// Event hooks of one room.
pub trait RoomHandler<R: RoomKey>: Send + 'static {
    /// Fired the first time the room starts, before object create
    /// events.
    fn room_start(&mut self, _ctx: &mut EventContext<'_, R>) {}

    /// Fired when the room starts again after running before.
    fn room_resume(&mut self, _ctx: &mut EventContext<'_, R>) {}

    /// Fired when another room starts or the game ends while this room
    /// is running.
    fn room_end(&mut self, _ctx: &mut EventContext<'_, R>) {}

    fn step(&mut self, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn alarm(&mut self, _ctx: &mut EventContext<'_, R>, _name: &str) {}

    fn input(&mut self, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    /// Fired when the user asks to close the window, before the game's
    /// `close`.
    fn close(&mut self, _ctx: &mut EventContext<'_, R>) {}

    fn paused_step(&mut self, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn paused_input(&mut self, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    /// Replaces `close` while the game is paused, before the game's
    /// `paused_close`.
    fn paused_close(&mut self, _ctx: &mut EventContext<'_, R>) {}
}

impl<R: RoomKey> RoomHandler<R> for () {}
