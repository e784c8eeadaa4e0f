//=========================================================================
// Game Context
//=========================================================================
//
// Shared data handed to every event hook.
//
// Contains the state hooks read and write:
// - config, global alarms and input state
// - room switch requests, pause and end flags
// - window projections and the last rendered frame
//
// EventContext bundles the running room with the game context; all
// hooks receive it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::alarms::Alarms;
use crate::core::game::RoomHandler;
use crate::core::gfx::{Color, DrawCommand, Font, Frame, Pixmap, ShapeStyle, Sprite, TextStyle};
use crate::core::input::StateTracker;
use crate::core::object::{Behavior, Object, ObjectId, ObjectState};
use crate::core::room::render::ImageCache;
use crate::core::room::{Lifecycle, Room, RoomKey};

//=== StepTime ============================================================

/// Timing of the current frame, passed to step hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTime {
    /// Milliseconds since the previous frame, as measured.
    pub time_passed: f64,

    /// Factor to scale per-frame amounts by. `1.0` unless delta timing
    /// is on.
    pub delta_mult: f64,
}

impl StepTime {
    /// Timing of a frame that ran exactly at `fps`.
    pub fn nominal(fps: f64) -> Self {
        Self {
            time_passed: 1000.0 / fps,
            delta_mult: 1.0,
        }
    }
}

//=== GameContext =========================================================

/// Game-wide state accessible to every hook through
/// [`EventContext::game`].
pub struct GameContext<R: RoomKey> {
    config: GameConfig,

    /// Global alarms; their events go to the game handler.
    pub alarms: Alarms,

    pub(crate) input: StateTracker,

    paused: bool,
    pause_sprite: Option<Arc<Sprite>>,
    ending: bool,

    /// Last requested room switch; applied at the start of next tick.
    room_request: Option<R>,
    current_room: Option<R>,

    window_projections: Vec<DrawCommand>,
    pub(crate) images: ImageCache,
    last_frame: Option<Frame>,
    prune_timer: f64,
}

impl<R: RoomKey> GameContext<R> {
    pub(crate) fn new(config: GameConfig) -> Self {
        let images = ImageCache::new(config.cache_life);
        Self {
            config,
            alarms: Alarms::new(),
            input: StateTracker::new(),
            paused: false,
            pause_sprite: None,
            ending: false,
            room_request: None,
            current_room: None,
            window_projections: Vec::new(),
            images,
            last_frame: None,
            prune_timer: 0.0,
        }
    }

    //--- Settings ---------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Mutable settings. Size changes affect rooms registered later.
    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn fps(&self) -> f64 {
        self.config.fps
    }

    //--- Input ------------------------------------------------------------

    /// Keyboard, mouse and joystick state as of this tick.
    pub fn input(&self) -> &StateTracker {
        &self.input
    }

    //--- Rooms ------------------------------------------------------------

    /// Switches to another room at the start of the next tick. When
    /// called several times in one tick, the last request wins.
    pub fn start_room(&mut self, key: R) {
        if let Some(previous) = self.room_request.replace(key) {
            debug!("Room request {:?} superseded by {:?}", previous, key);
        }
    }

    /// Key of the running room.
    pub fn current_room(&self) -> Option<R> {
        self.current_room
    }

    pub(crate) fn take_room_request(&mut self) -> Option<R> {
        self.room_request.take()
    }

    pub(crate) fn set_current_room(&mut self, key: R) {
        self.current_room = Some(key);
    }

    //--- Pause & End ------------------------------------------------------

    /// Pauses the game: only paused hooks run until [`unpause`](Self::unpause).
    /// `sprite` is shown centered on the window meanwhile.
    pub fn pause(&mut self, sprite: Option<Arc<Sprite>>) {
        debug!("Game paused");
        self.paused = true;
        self.pause_sprite = sprite;
    }

    pub fn unpause(&mut self) {
        if self.paused {
            debug!("Game unpaused");
        }
        self.paused = false;
        self.pause_sprite = None;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn pause_sprite(&self) -> Option<&Arc<Sprite>> {
        self.pause_sprite.as_ref()
    }

    /// Ends the game once the current tick is over.
    pub fn end(&mut self) {
        self.ending = true;
    }

    pub fn is_ending(&self) -> bool {
        self.ending
    }

    //--- Window Projections -----------------------------------------------

    /// Draws on the window, above all views, for the current frame only.
    pub fn project(&mut self, command: DrawCommand) {
        self.window_projections.push(command);
    }

    pub fn project_dot(&mut self, x: f64, y: f64, z: f64, color: Color) {
        self.project(DrawCommand::dot(x, y, z, color));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn project_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, z: f64, color: Color, thickness: u32) {
        self.project(DrawCommand::line(x1, y1, x2, y2, z, color, thickness));
    }

    pub fn project_rectangle(&mut self, x: f64, y: f64, z: f64, width: f64, height: f64, style: ShapeStyle) {
        self.project(DrawCommand::rectangle(x, y, z, width, height, style));
    }

    pub fn project_ellipse(&mut self, x: f64, y: f64, z: f64, width: f64, height: f64, style: ShapeStyle) {
        self.project(DrawCommand::ellipse(x, y, z, width, height, style));
    }

    pub fn project_circle(&mut self, x: f64, y: f64, z: f64, radius: f64, style: ShapeStyle) {
        self.project(DrawCommand::circle(x, y, z, radius, style));
    }

    pub fn project_polygon(&mut self, points: &[(f64, f64)], z: f64, style: ShapeStyle) {
        self.project(DrawCommand::polygon(points, z, style));
    }

    pub fn project_sprite(&mut self, sprite: &Sprite, frame: usize, x: f64, y: f64, z: f64) {
        self.project(DrawCommand::sprite(sprite, frame, x, y, z));
    }

    pub fn project_text(&mut self, font: &Font, text: &str, x: f64, y: f64, z: f64, style: &TextStyle) {
        self.project(DrawCommand::text(font, text, x, y, z, style));
    }

    pub(crate) fn take_window_projections(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.window_projections)
    }

    //--- Frames -----------------------------------------------------------

    /// The last rendered frame, composited.
    pub fn screenshot(&self) -> Option<Pixmap> {
        self.last_frame.as_ref().map(Frame::composite)
    }

    pub(crate) fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub(crate) fn set_last_frame(&mut self, frame: Frame) {
        self.last_frame = Some(frame);
    }

    /// Advances the cache clock; returns true when a prune is due.
    pub(crate) fn advance_prune_timer(&mut self, time_passed: f64, interval: f64) -> bool {
        self.images.advance(time_passed);
        self.prune_timer += time_passed;
        if self.prune_timer >= interval {
            self.prune_timer = 0.0;
            true
        } else {
            false
        }
    }
}

//=== EventContext ========================================================

/// What a hook can reach: the running room and the game.
pub struct EventContext<'a, R: RoomKey> {
    pub room: &'a mut Room<R>,
    pub game: &'a mut GameContext<R>,
}

impl<'a, R: RoomKey> EventContext<'a, R> {
    /// Adds an object to the running room. Its create event fires
    /// before this returns.
    pub fn add(&mut self, object: Object<R>) -> ObjectId {
        let id = self.room.add(object);
        flush_lifecycle(self.room, self.game);
        id
    }

    /// Adds a new object built from a state and a behavior.
    pub fn spawn<B: Behavior<R>>(&mut self, state: ObjectState, behavior: B) -> ObjectId {
        self.add(Object::new(state, behavior))
    }

    /// Removes an object from the running room, firing its destroy
    /// event. Destroying the object whose hook is running takes effect
    /// when the hook returns.
    pub fn destroy(&mut self, id: ObjectId) {
        if self.room.remove(id) {
            flush_lifecycle(self.room, self.game);
        }
    }
}

//=== Dispatch ============================================================

/// Runs a hook of one object. The object is detached from the room for
/// the duration of the hook and handed over as `this`.
pub(crate) fn dispatch_object<R, F>(room: &mut Room<R>, game: &mut GameContext<R>, id: ObjectId, hook: F) -> bool
where
    R: RoomKey,
    F: FnOnce(&mut dyn Behavior<R>, &mut ObjectState, &mut EventContext<'_, R>),
{
    let Some(mut object) = room.detach(id) else {
        return false;
    };
    {
        let mut ctx = EventContext {
            room: &mut *room,
            game: &mut *game,
        };
        hook(object.behavior.as_mut(), &mut object.state, &mut ctx);
    }
    room.restore(object);
    flush_lifecycle(room, game);
    true
}

/// Runs a hook of the room's handler, if it has one.
pub(crate) fn dispatch_room<R, F>(room: &mut Room<R>, game: &mut GameContext<R>, hook: F)
where
    R: RoomKey,
    F: FnOnce(&mut dyn RoomHandler<R>, &mut EventContext<'_, R>),
{
    if let Some(mut handler) = room.handler.take() {
        {
            let mut ctx = EventContext {
                room: &mut *room,
                game: &mut *game,
            };
            hook(handler.as_mut(), &mut ctx);
        }
        // A hook may install a new handler; keep it
        if room.handler.is_none() {
            room.handler = Some(handler);
        }
    }
    flush_lifecycle(room, game);
}

/// Fires pending create and destroy events of a running room until no
/// more are queued.
pub(crate) fn flush_lifecycle<R: RoomKey>(room: &mut Room<R>, game: &mut GameContext<R>) {
    if !(room.current && room.started) {
        return;
    }
    loop {
        room.collect_destroyed();
        let events = room.lifecycle.take();
        if events.is_empty() {
            break;
        }
        for event in events {
            match event {
                Lifecycle::Create(id) => {
                    dispatch_object(room, game, id, |behavior, this, ctx| behavior.create(this, ctx));
                }
                Lifecycle::Destroy(mut object) => {
                    let mut ctx = EventContext {
                        room: &mut *room,
                        game: &mut *game,
                    };
                    object.behavior.destroy(&mut object.state, &mut ctx);
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestRoom {
        A,
        B,
    }

    impl RoomKey for TestRoom {}

    static CREATED: AtomicUsize = AtomicUsize::new(0);
    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    /// Spawns a child on create, and destroys itself when stepped.
    struct Parent;

    impl Behavior<TestRoom> for Parent {
        fn create(&mut self, this: &mut ObjectState, ctx: &mut EventContext<'_, TestRoom>) {
            CREATED.fetch_add(1, Ordering::SeqCst);
            ctx.spawn(ObjectState::new(this.x + 10.0, this.y), Child);
        }

        fn step(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, TestRoom>, _time: StepTime) {
            this.destroy();
        }

        fn destroy(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, TestRoom>) {
            DESTROYED.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Child;

    impl Behavior<TestRoom> for Child {
        fn create(&mut self, _this: &mut ObjectState, _ctx: &mut EventContext<'_, TestRoom>) {
            CREATED.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn running_room() -> Room<TestRoom> {
        let mut room = Room::new(100.0, 100.0);
        room.current = true;
        room.started = true;
        room
    }

    #[test]
    fn room_request_last_wins() {
        let mut game: GameContext<TestRoom> = GameContext::new(GameConfig::default());
        game.start_room(TestRoom::A);
        game.start_room(TestRoom::B);
        assert_eq!(game.take_room_request(), Some(TestRoom::B));
        assert_eq!(game.take_room_request(), None);
    }

    #[test]
    fn pause_and_end_flags() {
        let mut game: GameContext<TestRoom> = GameContext::new(GameConfig::default());
        game.pause(None);
        assert!(game.is_paused());
        game.unpause();
        assert!(!game.is_paused());
        game.end();
        assert!(game.is_ending());
    }

    #[test]
    fn create_cascades_and_destroy_fires() {
        let mut room = running_room();
        let mut game = GameContext::new(GameConfig::default());

        let parent = room.add(Object::new(ObjectState::new(0.0, 0.0), Parent));
        flush_lifecycle(&mut room, &mut game);
        assert_eq!(CREATED.load(Ordering::SeqCst), 2);
        assert_eq!(room.len(), 2);

        dispatch_object(&mut room, &mut game, parent, |b, this, ctx| {
            b.step(this, ctx, StepTime::nominal(60.0))
        });
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 1);
        assert!(!room.contains(parent));
        assert_eq!(room.len(), 1);
    }

    #[test]
    fn idle_room_defers_creates() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        let mut game = GameContext::new(GameConfig::default());
        room.add(Object::new(ObjectState::new(0.0, 0.0), ()));

        flush_lifecycle(&mut room, &mut game);
        assert_eq!(room.lifecycle.len(), 1);
    }

    #[test]
    fn prune_timer_fires_on_interval() {
        let mut game: GameContext<TestRoom> = GameContext::new(GameConfig::default());
        assert!(!game.advance_prune_timer(5000.0, 8000.0));
        assert!(game.advance_prune_timer(3000.0, 8000.0));
        assert!(!game.advance_prune_timer(100.0, 8000.0));
    }
}
