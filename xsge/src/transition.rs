//=========================================================================
// Room Transitions
//
// Animated transitions from one room to the next.
//
// A transition starts from a sprite of the room being left, usually a
// screenshot, and wears it away over a fixed duration while the new
// room runs underneath.
//
// Usage:
// ```text
//     TransitionGame::new(handler)  ──handle()──>  TransitionHandle
//           │                                          │
//           │   <── Transition (channel) ──────────────┤ start_room()
//           │                                          │ show()
//           └─ step(): update the active transition
//                      and project it over the window
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::marker::PhantomData;

//=== External Crates =====================================================
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== SGE Imports =========================================================
use sge::core::game::{EventContext, GameContext, GameHandler, StepTime};
use sge::core::gfx::{BlendMode, Color, ShapeStyle, Sprite};
use sge::core::input::InputEvent;
use sge::core::room::RoomKey;

//=== Constants ===========================================================

/// Duration used by [`TransitionHandle::start_room_default`], in
/// milliseconds.
pub const DEFAULT_DURATION: f64 = 1500.0;

/// Side of one cell of the matrix wipe, in pixels.
const MATRIX_CELL: u32 = 16;

//=== TransitionKind ======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionKind {
    /// Fade out to black, then fade in.
    #[default]
    Fade,
    /// Gradually replace the old room with the new one.
    Dissolve,
    /// Pixelate the old room, then fade into the new one.
    Pixelate,
    /// Wipe from left to right.
    WipeLeft,
    /// Wipe from right to left.
    WipeRight,
    /// Wipe from top to bottom.
    WipeTop,
    /// Wipe from bottom to top.
    WipeBottom,
    /// Erase the old room in random square cells.
    WipeMatrix,
}

//=== Transition ==========================================================

/// One running transition.
///
/// # Examples
///
/// ```
/// use sge::core::gfx::{Color, Pixmap, Sprite};
/// use xsge::{Transition, TransitionKind};
///
/// let shot = Sprite::from_pixmap(Pixmap::filled(100, 10, Color::RED));
/// let mut wipe = Transition::new(TransitionKind::WipeLeft, shot, 1000.0);
///
/// assert!(wipe.update(500.0));
/// assert_eq!(wipe.sprite().get_pixel(10, 5, 0), Some(Color::TRANSPARENT));
/// assert_eq!(wipe.sprite().get_pixel(60, 5, 0), Some(Color::RED));
///
/// assert!(!wipe.update(500.0));
/// ```
#[derive(Debug)]
pub struct Transition {
    kind: TransitionKind,
    sprite: Sprite,
    duration: f64,
    time_passed: f64,
    complete_last: f64,
    /// Cells the matrix wipe has not erased yet, filled on first use.
    remaining: Option<Vec<(u32, u32)>>,
    rng: StdRng,
}

impl Transition {
    //--- Construction -----------------------------------------------------

    /// Creates a transition wearing `sprite` away over `duration`
    /// milliseconds. A non-positive duration makes it finish at once.
    pub fn new(kind: TransitionKind, sprite: Sprite, duration: f64) -> Self {
        Self {
            kind,
            sprite,
            duration,
            time_passed: 0.0,
            complete_last: 0.0,
            remaining: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Starts from the last frame the game rendered. Returns `None`
    /// before the first frame.
    pub fn from_screenshot<R: RoomKey>(game: &GameContext<R>, kind: TransitionKind, duration: f64) -> Option<Self> {
        let shot = game.screenshot()?;
        Some(Self::new(kind, Sprite::from_pixmap(shot), duration))
    }

    /// Makes the matrix wipe's cell order reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// The sprite in its current, partly worn-away state.
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_passed(&self) -> f64 {
        self.time_passed
    }

    /// Fraction of the duration passed so far, in `[0, 1]`.
    pub fn complete(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.time_passed / self.duration).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.duration <= 0.0 || self.time_passed >= self.duration
    }

    //--- Update -----------------------------------------------------------

    /// Advances by `time_passed` milliseconds and applies the effect for
    /// the new completion. Returns whether the transition is still
    /// running.
    pub fn update(&mut self, time_passed: f64) -> bool {
        if self.is_finished() {
            return false;
        }

        self.time_passed += time_passed;
        if self.time_passed >= self.duration {
            return false;
        }

        let complete = self.time_passed / self.duration;
        match self.kind {
            TransitionKind::Fade => self.fade(complete),
            TransitionKind::Dissolve => self.dissolve(complete),
            TransitionKind::Pixelate => self.pixelate(complete),
            TransitionKind::WipeLeft => {
                let (w, h) = self.size();
                self.sprite.draw_erase(0.0, 0.0, w * complete, h, None);
            }
            TransitionKind::WipeRight => {
                let (w, h) = self.size();
                let erased = w * complete;
                self.sprite.draw_erase(w - erased, 0.0, erased, h, None);
            }
            TransitionKind::WipeTop => {
                let (w, h) = self.size();
                self.sprite.draw_erase(0.0, 0.0, w, h * complete, None);
            }
            TransitionKind::WipeBottom => {
                let (w, h) = self.size();
                let erased = h * complete;
                self.sprite.draw_erase(0.0, h - erased, w, erased, None);
            }
            TransitionKind::WipeMatrix => self.wipe_matrix(complete),
        }
        self.complete_last = complete;
        true
    }

    /// Projects the sprite over the whole window.
    pub fn project<R: RoomKey>(&self, game: &mut GameContext<R>, z: f64) {
        game.project_sprite(&self.sprite, 0, 0.0, 0.0, z);
    }

    //--- Effects ----------------------------------------------------------

    fn size(&self) -> (f64, f64) {
        (self.sprite.width() as f64, self.sprite.height() as f64)
    }

    fn cover(&mut self, color: Color, blend: BlendMode) {
        let (w, h) = self.size();
        self.sprite
            .draw_rectangle(0.0, 0.0, w, h, ShapeStyle::filled(color), None, blend);
    }

    /// Darkens by the progress made this update during the first half,
    /// then shows black with shrinking opacity.
    fn fade(&mut self, complete: f64) {
        if complete < 0.5 {
            let c = channel((complete - self.complete_last) * 2.0);
            self.cover(Color::rgb(c, c, c), BlendMode::RgbSubtract);
        } else {
            let alpha = channel(1.0 - (complete - 0.5) * 2.0);
            self.sprite.draw_clear(None);
            self.cover(Color::rgba(0, 0, 0, alpha), BlendMode::Normal);
        }
    }

    fn dissolve(&mut self, complete: f64) {
        let alpha = channel(complete - self.complete_last);
        self.cover(Color::rgba(0, 0, 0, alpha), BlendMode::RgbaSubtract);
    }

    /// Downscales and restores the sprite during the first half, which
    /// loses detail progressively, then dissolves it.
    fn pixelate(&mut self, complete: f64) {
        let (w, h) = self.size();
        if complete < 0.5 {
            let shrink = 1.0 - complete * 2.0;
            let sw = (w * shrink).max(1.0) as u32;
            let sh = (h * shrink).max(1.0) as u32;
            self.sprite.resize(sw, sh);
            self.sprite.resize(w as u32, h as u32);
        } else {
            let alpha = channel((complete - self.complete_last) * 2.0);
            self.cover(Color::rgba(0, 0, 0, alpha), BlendMode::RgbaSubtract);
        }
    }

    fn wipe_matrix(&mut self, complete: f64) {
        let (w, h) = self.size();
        let cell = MATRIX_CELL as f64;
        let cols = (w / cell).round() as u32;
        let rows = (h / cell).round() as u32;

        let remaining = self
            .remaining
            .get_or_insert_with(|| (0..cols).flat_map(|x| (0..rows).map(move |y| (x, y))).collect());

        let mut count = ((cols * rows) as f64 * (complete - self.complete_last)).round() as usize;
        while count > 0 && !remaining.is_empty() {
            count -= 1;
            let (x, y) = remaining.swap_remove(self.rng.gen_range(0..remaining.len()));
            self.sprite
                .draw_erase((x * MATRIX_CELL) as f64, (y * MATRIX_CELL) as f64, cell, cell, None);
        }
    }
}

fn channel(fraction: f64) -> u8 {
    (fraction * 255.0).round().clamp(0.0, 255.0) as u8
}

//=== TransitionHandle ====================================================

/// Queues transitions for a [`TransitionGame`] from any event hook.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    sender: Sender<Transition>,
}

impl TransitionHandle {
    /// Shows `transition` from the next game step on, replacing any
    /// transition still running.
    pub fn show(&self, transition: Transition) {
        if self.sender.send(transition).is_err() {
            debug!("Transition layer gone, transition dropped");
        }
    }

    /// Starts `room`, transitioning from a screenshot of the current
    /// one. Without a screenshot the room starts immediately.
    pub fn start_room<R: RoomKey>(
        &self,
        ctx: &mut EventContext<'_, R>,
        room: R,
        kind: TransitionKind,
        duration: f64,
    ) {
        match Transition::from_screenshot(ctx.game, kind, duration) {
            Some(transition) => {
                debug!("Starting room {:?} with {:?} transition", room, kind);
                self.show(transition);
            }
            None => debug!("No frame rendered yet, starting room {:?} without transition", room),
        }
        ctx.game.start_room(room);
    }

    /// [`start_room`](Self::start_room) with a fade of
    /// [`DEFAULT_DURATION`].
    pub fn start_room_default<R: RoomKey>(&self, ctx: &mut EventContext<'_, R>, room: R) {
        self.start_room(ctx, room, TransitionKind::default(), DEFAULT_DURATION);
    }
}

//=== TransitionGame ======================================================

/// Game handler that runs transitions on top of another handler.
///
/// Every hook is forwarded to the wrapped handler first. The game step
/// then advances the active transition and projects it at window
/// position `(0, 0)`.
pub struct TransitionGame<R: RoomKey, H: GameHandler<R>> {
    inner: H,
    sender: Sender<Transition>,
    receiver: Receiver<Transition>,
    active: Option<Transition>,
    z: f64,
    _room: PhantomData<R>,
}

impl<R: RoomKey, H: GameHandler<R>> TransitionGame<R, H> {
    pub fn new(inner: H) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            inner,
            sender,
            receiver,
            active: None,
            z: 0.0,
            _room: PhantomData,
        }
    }

    /// Sets the z of the projected transition. Default: 0.0
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn handle(&self) -> TransitionHandle {
        TransitionHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn active(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    fn advance(&mut self, game: &mut GameContext<R>, time_passed: f64) {
        if let Some(next) = self.receiver.try_iter().last() {
            debug!("Showing {:?} transition ({} ms)", next.kind(), next.duration());
            self.active = Some(next);
        }

        let running = match self.active.as_mut() {
            Some(transition) => {
                let running = transition.update(time_passed);
                if running {
                    transition.project(game, self.z);
                }
                running
            }
            None => return,
        };

        if !running {
            debug!("Transition finished");
            self.active = None;
        }
    }
}

impl<R: RoomKey, H: GameHandler<R>> GameHandler<R> for TransitionGame<R, H> {
    fn game_start(&mut self, ctx: &mut EventContext<'_, R>) {
        self.inner.game_start(ctx);
    }

    fn game_end(&mut self, ctx: &mut EventContext<'_, R>) {
        self.inner.game_end(ctx);
    }

    fn step(&mut self, ctx: &mut EventContext<'_, R>, time: StepTime) {
        self.inner.step(ctx, time);
        self.advance(ctx.game, time.time_passed);
    }

    fn alarm(&mut self, ctx: &mut EventContext<'_, R>, name: &str) {
        self.inner.alarm(ctx, name);
    }

    fn input(&mut self, ctx: &mut EventContext<'_, R>, event: &InputEvent) {
        self.inner.input(ctx, event);
    }

    fn close(&mut self, ctx: &mut EventContext<'_, R>) {
        self.inner.close(ctx);
    }

    fn paused_step(&mut self, ctx: &mut EventContext<'_, R>, time: StepTime) {
        self.inner.paused_step(ctx, time);
    }

    fn paused_input(&mut self, ctx: &mut EventContext<'_, R>, event: &InputEvent) {
        self.inner.paused_input(ctx, event);
    }

    fn paused_close(&mut self, ctx: &mut EventContext<'_, R>) {
        self.inner.paused_close(ctx);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
