//=========================================================================
// Game
//=========================================================================
//
// The game as a whole: settings, the room registry, the global handler
// and the per-frame tick.
//
// Architecture:
//   Game<R>
//     ├─ ctx: GameContext<R>            (shared with every hook)
//     ├─ handler: Box<dyn GameHandler>  (global events)
//     ├─ rooms: RoomManager<R>          (registered rooms)
//     └─ renderer: Box<dyn Renderer>    (frame sink)
//
// Tick order:
//   room switch → input → timing → alarms → game/room step
//   → background → objects (begin_step, update, step) → collisions
//   → end_step → previous positions → cache pruning → frame
//
// The game can be ticked by the engine's logic thread or headlessly.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::config::{GameConfig, CACHE_PRUNE_INTERVAL};
use crate::core::collision::{collision_pairs, test_pair};
use crate::core::gfx::{sort_by_z, DrawCommand, Frame, NullRenderer, Renderer};
use crate::core::input::InputEvent;
use crate::core::object::ObjectId;
use crate::core::platform_bridge::TickControl;
use crate::core::room::render::build_views;
use crate::core::room::{Room, RoomKey, RoomManager};
use crate::error::{Result, SgeError};

//=== Module Declarations =================================================

mod context;
mod handler;

//=== Public API ==========================================================

pub use context::{EventContext, GameContext, StepTime};
pub use handler::{GameHandler, RoomHandler};

pub(crate) use context::{dispatch_object, dispatch_room, flush_lifecycle};

//=== Game ================================================================

/// A game: rooms, a global handler and the loop driving them.
///
/// # Examples
///
/// ```
/// # use sge::prelude::*;
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Level { Title }
/// impl RoomKey for Level {}
///
/// let mut game = Game::new(GameConfig::default());
/// game.register_start_room(Level::Title, Room::new(640.0, 480.0));
/// game.tick(1000.0 / 60.0, Vec::new());
/// assert_eq!(game.context().current_room(), Some(Level::Title));
/// ```
pub struct Game<R: RoomKey> {
    ctx: GameContext<R>,
    handler: Box<dyn GameHandler<R>>,
    rooms: RoomManager<R>,
    renderer: Box<dyn Renderer>,
    started: bool,
    ended: bool,
}

impl<R: RoomKey> Game<R> {
    //--- Construction -----------------------------------------------------

    pub fn new(config: GameConfig) -> Self {
        info!(
            "Creating game ({}x{} @ {} fps, delta: {})",
            config.width, config.height, config.fps, config.delta
        );
        Self {
            ctx: GameContext::new(config),
            handler: Box::new(()),
            rooms: RoomManager::new(),
            renderer: Box::new(NullRenderer),
            started: false,
            ended: false,
        }
    }

    /// Registers a room. Rooms pick up the game's object area size and
    /// view size here unless they set their own.
    pub fn register_room(&mut self, key: R, mut room: Room<R>) {
        room.resolve(self.ctx.config());
        self.rooms.register_room(key, room);
    }

    /// Registers the room the game starts in.
    pub fn register_start_room(&mut self, key: R, mut room: Room<R>) {
        room.resolve(self.ctx.config());
        self.rooms.register_start_room(key, room);
    }

    pub fn set_handler(&mut self, handler: impl GameHandler<R>) {
        self.handler = Box::new(handler);
    }

    /// Sets where finished frames go. Defaults to [`NullRenderer`].
    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderer = Box::new(renderer);
    }

    //--- Accessors --------------------------------------------------------

    pub fn context(&self) -> &GameContext<R> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext<R> {
        &mut self.ctx
    }

    pub fn room(&self, key: R) -> Option<&Room<R>> {
        self.rooms.get(key)
    }

    pub fn room_mut(&mut self, key: R) -> Option<&mut Room<R>> {
        self.rooms.get_mut(key)
    }

    /// The running room.
    pub fn current_room(&self) -> Option<&Room<R>> {
        self.ctx.current_room().and_then(|key| self.rooms.get(key))
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room<R>> {
        let key = self.ctx.current_room()?;
        self.rooms.get_mut(key)
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// The last rendered frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.ctx.last_frame()
    }

    //--- Tick -------------------------------------------------------------

    /// Runs one frame. `real_time_passed` is the measured time since the
    /// previous frame in ms; `events` are the inputs gathered meanwhile.
    ///
    /// Returns [`TickControl::Exit`] once the game has ended.
    pub fn tick(&mut self, real_time_passed: f64, events: Vec<InputEvent>) -> TickControl {
        if self.ended {
            return TickControl::Exit;
        }
        if !self.started {
            if let Err(e) = self.start() {
                error!("Game cannot start: {}", e);
                self.ended = true;
                return TickControl::Exit;
            }
        }

        //--- 1. Room switch ----------------------------------------------
        let mut real_time_passed = real_time_passed;
        if let Some(key) = self.ctx.take_room_request() {
            if self.switch_room(key) {
                real_time_passed = 1000.0 / self.ctx.config().target_fps();
            }
        }

        let Some(key) = self.ctx.current_room() else {
            error!("No room is running");
            self.ended = true;
            return TickControl::Exit;
        };

        //--- 2. Input ----------------------------------------------------
        self.ctx.input.update(&events);
        for event in &events {
            self.dispatch_input(key, event);
        }

        //--- 3. Timing ---------------------------------------------------
        let (time_passed, delta_mult) = frame_timing(self.ctx.config(), real_time_passed);
        let time = StepTime {
            time_passed: real_time_passed,
            delta_mult,
        };

        if self.ctx.is_paused() {
            self.paused_step(key, time);
        } else {
            self.step(key, time, time_passed);
        }

        //--- 11. Cache pruning -------------------------------------------
        self.maintain_caches(key, time_passed);

        //--- 12. Frame ---------------------------------------------------
        self.render(key);

        if self.ctx.is_ending() {
            self.finish();
            return TickControl::Exit;
        }
        TickControl::Continue
    }

    //--- Lifecycle --------------------------------------------------------

    /// First tick: game_start, then the start room begins.
    fn start(&mut self) -> Result<()> {
        let key = self.rooms.start_key().ok_or(SgeError::NoStartRoom)?;
        info!("Starting game in room {:?}", key);
        self.started = true;

        let Self { ctx, handler, rooms, .. } = self;
        let room = rooms
            .get_mut(key)
            .ok_or_else(|| SgeError::UnknownRoom(format!("{:?}", key)))?;
        room.current = true;
        ctx.set_current_room(key);
        game_hook(handler.as_mut(), room, ctx, |h, c| h.game_start(c));

        self.enter_room(key);
        Ok(())
    }

    /// Ends the running room, then the game.
    fn finish(&mut self) {
        info!("Game ending");
        if let Some(key) = self.ctx.current_room() {
            let Self { ctx, handler, rooms, .. } = self;
            if let Some(room) = rooms.get_mut(key) {
                dispatch_room(room, ctx, |h, c| h.room_end(c));
                game_hook(handler.as_mut(), room, ctx, |h, c| h.game_end(c));
                room.current = false;
            }
        }
        self.ended = true;
    }

    /// Leaves the running room for `key`. Returns whether it happened.
    fn switch_room(&mut self, key: R) -> bool {
        if !self.rooms.contains(key) {
            warn!("Room {:?} is not registered; staying in the current room", key);
            return false;
        }
        debug!("Switching room: {:?} -> {:?}", self.ctx.current_room(), key);

        self.ctx.unpause();
        if let Some(old) = self.ctx.current_room().filter(|old| *old != key) {
            let Self { ctx, rooms, .. } = self;
            if let Some(room) = rooms.get_mut(old) {
                dispatch_room(room, ctx, |h, c| h.room_end(c));
                room.current = false;
            }
        }
        self.enter_room(key);
        true
    }

    /// Makes `key` the running room and fires its start or resume event,
    /// then any pending create events.
    fn enter_room(&mut self, key: R) {
        let Self { ctx, rooms, .. } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };
        ctx.set_current_room(key);
        room.current = true;
        room.reset_areas();

        if room.started {
            dispatch_room(room, ctx, |h, c| h.room_resume(c));
        } else {
            // Creates queued during room_start fire after it returns
            dispatch_room(room, ctx, |h, c| h.room_start(c));
            room.started = true;
            flush_lifecycle(room, ctx);
        }
    }

    //--- Input --------------------------------------------------------------

    fn dispatch_input(&mut self, key: R, event: &InputEvent) {
        let Self { ctx, handler, rooms, .. } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };

        if let InputEvent::QuitRequest = event {
            info!("Quit requested");
            if ctx.is_paused() {
                dispatch_room(room, ctx, |h, c| h.paused_close(c));
                game_hook(handler.as_mut(), room, ctx, |h, c| h.paused_close(c));
            } else {
                dispatch_room(room, ctx, |h, c| h.close(c));
                game_hook(handler.as_mut(), room, ctx, |h, c| h.close(c));
            }
            return;
        }

        if ctx.is_paused() {
            game_hook(handler.as_mut(), room, ctx, |h, c| h.paused_input(c, event));
            dispatch_room(room, ctx, |h, c| h.paused_input(c, event));
            if !event.is_focus() {
                for id in room.order.clone() {
                    dispatch_object(room, ctx, id, |b, this, c| b.paused_input(this, c, event));
                }
            }
        } else {
            game_hook(handler.as_mut(), room, ctx, |h, c| h.input(c, event));
            dispatch_room(room, ctx, |h, c| h.input(c, event));
            if !event.is_focus() {
                for id in active_objects(room) {
                    dispatch_object(room, ctx, id, |b, this, c| b.input(this, c, event));
                }
            }
        }
    }

    //--- Steps ------------------------------------------------------------

    fn paused_step(&mut self, key: R, time: StepTime) {
        let Self { ctx, handler, rooms, .. } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };
        game_hook(handler.as_mut(), room, ctx, |h, c| h.paused_step(c, time));
        dispatch_room(room, ctx, |h, c| h.paused_step(c, time));
        for id in room.order.clone() {
            dispatch_object(room, ctx, id, |b, this, c| b.paused_step(this, c, time));
        }
    }

    fn step(&mut self, key: R, time: StepTime, time_passed: f64) {
        let Self { ctx, handler, rooms, .. } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };
        let delta_mult = time.delta_mult;

        //--- 4. Alarms ---------------------------------------------------
        for name in ctx.alarms.tick(delta_mult) {
            game_hook(handler.as_mut(), room, ctx, |h, c| h.alarm(c, &name));
        }
        for name in room.alarms.tick(delta_mult) {
            dispatch_room(room, ctx, |h, c| h.alarm(c, &name));
        }

        //--- 5. Game & room step -----------------------------------------
        game_hook(handler.as_mut(), room, ctx, |h, c| h.step(c, time));
        dispatch_room(room, ctx, |h, c| h.step(c, time));

        //--- 6. Background -----------------------------------------------
        room.background.update(time_passed);

        //--- 7. Objects --------------------------------------------------
        for id in active_objects(room) {
            if !is_active(room, id) {
                continue;
            }
            dispatch_object(room, ctx, id, |b, this, c| b.begin_step(this, c, time));
            dispatch_object(room, ctx, id, |b, this, c| {
                for _ in 0..this.advance_animation(time_passed) {
                    b.animation_end(this, c);
                }
                for name in this.alarms.tick(delta_mult) {
                    b.alarm(this, c, &name);
                }
                b.update_position(this, c, delta_mult);
            });
            dispatch_object(room, ctx, id, |b, this, c| b.step(this, c, time));
        }

        //--- 8. Collisions -----------------------------------------------
        if ctx.config().collision_events_enabled {
            for (a, b) in collision_pairs(room) {
                if !is_active(room, a) {
                    continue;
                }
                if let Some((xdir, ydir)) = test_pair(room, a, b) {
                    dispatch_object(room, ctx, a, |bh, this, c| bh.collision(this, c, b, xdir, ydir));
                    dispatch_object(room, ctx, b, |bh, this, c| bh.collision(this, c, a, -xdir, -ydir));
                }
            }
        }

        //--- 9. End step -------------------------------------------------
        for id in active_objects(room) {
            dispatch_object(room, ctx, id, |b, this, c| b.end_step(this, c, time));
        }

        //--- 10. Previous positions --------------------------------------
        for object in room.objects.values_mut() {
            object.state.store_previous_position();
        }
    }

    //--- Maintenance & Rendering --------------------------------------------

    fn maintain_caches(&mut self, key: R, time_passed: f64) {
        let Self { ctx, rooms, .. } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };
        room.masks.advance(time_passed);
        if ctx.advance_prune_timer(time_passed, CACHE_PRUNE_INTERVAL) {
            ctx.images.prune();
            room.masks.prune();
        }
    }

    fn render(&mut self, key: R) {
        let Self {
            ctx, rooms, renderer, ..
        } = self;
        let Some(room) = rooms.get_mut(key) else {
            return;
        };

        let views = build_views(room, &mut ctx.images);
        let mut window = ctx.take_window_projections();
        if ctx.is_paused() {
            if let Some(sprite) = ctx.pause_sprite().cloned() {
                let x = (ctx.width() as f64 - sprite.width() as f64) / 2.0 + sprite.origin_x;
                let y = (ctx.height() as f64 - sprite.height() as f64) / 2.0 + sprite.origin_y;
                window.push(DrawCommand::sprite(&sprite, 0, x, y, f64::MAX));
            }
        }
        sort_by_z(&mut window);

        let frame = Frame {
            width: ctx.width(),
            height: ctx.height(),
            views,
            window,
        };
        renderer.render(&frame);
        ctx.set_last_frame(frame);
    }
}

impl<R: RoomKey> std::fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("rooms", &self.rooms.len())
            .field("current_room", &self.ctx.current_room())
            .field("started", &self.started)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

//=== Helpers =============================================================

/// `(time_passed, delta_mult)` for a frame that really took
/// `real_time_passed` ms.
fn frame_timing(config: &GameConfig, real_time_passed: f64) -> (f64, f64) {
    let nominal = 1000.0 / config.fps;
    if config.delta {
        let time_passed = real_time_passed.min(1000.0 / config.delta_min);
        (time_passed, time_passed / nominal)
    } else {
        (nominal, 1.0)
    }
}

fn game_hook<R, F>(handler: &mut dyn GameHandler<R>, room: &mut Room<R>, game: &mut GameContext<R>, hook: F)
where
    R: RoomKey,
    F: FnOnce(&mut dyn GameHandler<R>, &mut EventContext<'_, R>),
{
    {
        let mut ctx = EventContext {
            room: &mut *room,
            game: &mut *game,
        };
        hook(handler, &mut ctx);
    }
    flush_lifecycle(room, game);
}

fn is_active<R: RoomKey>(room: &Room<R>, id: ObjectId) -> bool {
    room.object(id).is_some_and(|state| state.active)
}

fn active_objects<R: RoomKey>(room: &Room<R>) -> Vec<ObjectId> {
    room.order.iter().copied().filter(|id| is_active(room, *id)).collect()
}

//=========================================================================
// Unit Tests
//=========================================================================
