//=========================================================================
// Object Behavior
//=========================================================================
//
// Event hooks of an object. Every hook has a default, so a behavior
// only implements the events it cares about.
//
// Each hook receives the object's own state as `this` and an
// EventContext giving access to the room and the game.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{ObjectId, ObjectState};
use crate::core::game::{EventContext, StepTime};
use crate::core::input::InputEvent;
use crate::core::room::RoomKey;

//=== Behavior Trait ======================================================

/// Event hooks of an object.
///
/// # Minimal Implementation
///
/// ```rust
/// # use sge::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Level { Main }
/// # impl RoomKey for Level {}
/// struct Spinner;
///
/// impl Behavior<Level> for Spinner {
///     fn step(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, Level>, time: StepTime) {
///         this.image_rotation += 90.0 * time.time_passed / 1000.0;
///     }
/// }
/// ```
pub trait Behavior<R: RoomKey>: Send + 'static {
    //--- Lifecycle --------------------------------------------------------

    /// Fired when the object is added to the running room, or when its
    /// room starts.
    fn create(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>) {}

    /// Fired when the object is removed from the running room.
    fn destroy(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>) {}

    //--- Steps ------------------------------------------------------------

    fn begin_step(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn step(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    /// Fired after collision events.
    fn end_step(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    fn alarm(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _name: &str) {}

    /// Fired each time the animation wraps around its frames.
    fn animation_end(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>) {}

    //--- Input ------------------------------------------------------------

    fn input(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    fn paused_input(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _event: &InputEvent) {}

    fn paused_step(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, _time: StepTime) {}

    //--- Collision --------------------------------------------------------

    /// Fired when this object touches `other`.
    ///
    /// `xdirection` is `1` when this object came from the left, `-1`
    /// from the right and `0` when the boxes already overlapped
    /// horizontally last frame; `ydirection` likewise with `1` meaning
    /// from above.
    fn collision(
        &mut self,
        _this: &mut ObjectState,
        _ctx: &mut EventContext<'_, R>,
        _other: ObjectId,
        _xdirection: i8,
        _ydirection: i8,
    ) {
    }

    //--- Motion -----------------------------------------------------------

    /// Moves the object for one frame.
    ///
    /// Override to replace the built-in velocity, acceleration and
    /// deceleration model.
    fn update_position(&mut self, this: &mut ObjectState, ctx: &mut EventContext<'_, R>, delta_mult: f64) {
        default_update_position(self, this, ctx, delta_mult);
    }

    /// Moves the object horizontally by `amount`. Platformers override
    /// this to stop at walls.
    fn move_x(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, amount: f64) {
        this.x += amount;
    }

    fn move_y(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, R>, amount: f64) {
        this.y += amount;
    }
}

impl<R: RoomKey> Behavior<R> for () {}

//=== Default Motion ======================================================

/// New velocity after one frame of acceleration and deceleration.
fn integrate(velocity: f64, acceleration: f64, deceleration: f64, delta_mult: f64) -> f64 {
    let vf = velocity + acceleration * delta_mult;
    let dc = deceleration.abs() * delta_mult;
    if vf.abs() > dc {
        vf - dc.copysign(vf)
    } else {
        0.0
    }
}

/// The built-in motion model, per axis:
/// `vf = vi + a·d`, then deceleration `|dec|·d` pulls `vf` towards zero,
/// and the object moves by `(vi + vf) / 2 · d`.
pub fn default_update_position<R: RoomKey, B: Behavior<R> + ?Sized>(
    behavior: &mut B,
    this: &mut ObjectState,
    ctx: &mut EventContext<'_, R>,
    delta_mult: f64,
) {
    let vi = this.xvelocity;
    if vi != 0.0 || this.xacceleration != 0.0 {
        let vf = integrate(vi, this.xacceleration, this.xdeceleration, delta_mult);
        this.xvelocity = vf;
        behavior.move_x(this, ctx, (vi + vf) / 2.0 * delta_mult);
    }

    let vi = this.yvelocity;
    if vi != 0.0 || this.yacceleration != 0.0 {
        let vf = integrate(vi, this.yacceleration, this.ydeceleration, delta_mult);
        this.yvelocity = vf;
        behavior.move_y(this, ctx, (vi + vf) / 2.0 * delta_mult);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_applies_acceleration() {
        assert_eq!(integrate(2.0, 1.0, 0.0, 1.0), 3.0);
        assert_eq!(integrate(2.0, 1.0, 0.0, 2.0), 4.0);
    }

    #[test]
    fn deceleration_pulls_towards_zero() {
        assert_eq!(integrate(5.0, 0.0, 2.0, 1.0), 3.0);
        assert_eq!(integrate(-5.0, 0.0, 2.0, 1.0), -3.0);
        assert_eq!(integrate(1.0, 0.0, -2.0, 1.0), 0.0);
    }
}
