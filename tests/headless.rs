//=========================================================================
// Headless Game Tests
//
// Drives whole games through `Game::tick` without a window: input in,
// object state and frames out.
//
//=========================================================================

use std::sync::{Arc, Mutex};

use sge::prelude::*;

//=== Fixtures ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Level {
    Menu,
    Play,
}

impl RoomKey for Level {}

type Log = Arc<Mutex<Vec<&'static str>>>;

fn frame_ms() -> f64 {
    1000.0 / GameConfig::default().fps
}

/// Moves right while the right arrow is held.
struct Player;

impl Behavior<Level> for Player {
    fn input(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, Level>, event: &InputEvent) {
        match event {
            InputEvent::KeyPress { key: KeyCode::ArrowRight, .. } => this.xvelocity = 3.0,
            InputEvent::KeyRelease { key: KeyCode::ArrowRight, .. } => this.xvelocity = 0.0,
            _ => {}
        }
    }
}

/// Fires one bullet two frames after it is created.
struct Turret;

impl Behavior<Level> for Turret {
    fn create(&mut self, this: &mut ObjectState, _ctx: &mut EventContext<'_, Level>) {
        this.alarms.set("fire", 2.0);
    }

    fn alarm(&mut self, this: &mut ObjectState, ctx: &mut EventContext<'_, Level>, name: &str) {
        if name == "fire" {
            let bullet = ObjectState::new(this.x, this.y)
                .with_kind("bullet")
                .with_velocity(5.0, 0.0);
            ctx.spawn(bullet, Bullet);
        }
    }
}

struct Bullet;

impl Behavior<Level> for Bullet {}

/// Escape ends the game.
struct Global {
    log: Log,
}

impl GameHandler<Level> for Global {
    fn input(&mut self, ctx: &mut EventContext<'_, Level>, event: &InputEvent) {
        if let InputEvent::KeyPress { key: KeyCode::Escape, .. } = event {
            ctx.game.end();
        }
    }

    fn game_end(&mut self, _ctx: &mut EventContext<'_, Level>) {
        self.log.lock().unwrap().push("game_end");
    }
}

/// Space leaves the menu for the play room.
struct Menu {
    log: Log,
}

impl RoomHandler<Level> for Menu {
    fn input(&mut self, ctx: &mut EventContext<'_, Level>, event: &InputEvent) {
        if let InputEvent::KeyPress { key: KeyCode::Space, .. } = event {
            ctx.game.start_room(Level::Play);
        }
    }

    fn room_end(&mut self, _ctx: &mut EventContext<'_, Level>) {
        self.log.lock().unwrap().push("menu_end");
    }
}

struct Play {
    log: Log,
}

impl RoomHandler<Level> for Play {
    fn room_start(&mut self, _ctx: &mut EventContext<'_, Level>) {
        self.log.lock().unwrap().push("play_start");
    }

    fn room_end(&mut self, _ctx: &mut EventContext<'_, Level>) {
        self.log.lock().unwrap().push("play_end");
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build(log: &Log) -> Game<Level> {
    init_logging();
    let mut game = EngineBuilder::<Level>::new().build().into_game();
    game.set_handler(Global { log: log.clone() });
    game.register_start_room(
        Level::Menu,
        Room::new(640.0, 480.0).with_handler(Menu { log: log.clone() }),
    );
    game.register_room(
        Level::Play,
        Room::new(640.0, 480.0)
            .with_handler(Play { log: log.clone() })
            .with_object(Object::new(ObjectState::new(100.0, 50.0).with_kind("player"), Player))
            .with_object(Object::new(ObjectState::new(10.0, 10.0).with_kind("turret"), Turret)),
    );
    game
}

fn count_kind(game: &Game<Level>, kind: &str) -> usize {
    game.current_room()
        .map_or(0, |room| room.objects().filter(|o| o.has_kind(kind)).count())
}

//=========================================================================
// Scenarios
//=========================================================================

#[test]
fn menu_to_play_to_quit() {
    let log: Log = Arc::default();
    let mut game = build(&log);

    assert_eq!(game.tick(frame_ms(), Vec::new()), TickControl::Continue);
    assert_eq!(game.context().current_room(), Some(Level::Menu));

    game.tick(frame_ms(), vec![InputEvent::key_press(KeyCode::Space)]);
    game.tick(frame_ms(), Vec::new());
    assert_eq!(game.context().current_room(), Some(Level::Play));
    assert!(game.room(Level::Play).unwrap().has_started());

    assert_eq!(
        game.tick(frame_ms(), vec![InputEvent::key_press(KeyCode::Escape)]),
        TickControl::Exit
    );
    assert_eq!(*log.lock().unwrap(), vec!["menu_end", "play_start", "play_end", "game_end"]);

    assert_eq!(game.tick(frame_ms(), Vec::new()), TickControl::Exit);
}

#[test]
fn held_key_moves_player() {
    let log: Log = Arc::default();
    let mut game = build(&log);
    game.tick(frame_ms(), vec![InputEvent::key_press(KeyCode::Space)]);
    game.tick(frame_ms(), Vec::new());
    assert_eq!(game.context().current_room(), Some(Level::Play));

    let player_x = |game: &Game<Level>| {
        game.current_room()
            .and_then(|room| room.objects().find(|o| o.has_kind("player")).map(|o| o.x))
    };
    let start = player_x(&game).unwrap();

    game.tick(frame_ms(), vec![InputEvent::key_press(KeyCode::ArrowRight)]);
    game.tick(frame_ms(), Vec::new());
    assert_eq!(player_x(&game), Some(start + 6.0));
    assert!(game.context().input().is_key_down(KeyCode::ArrowRight));

    game.tick(frame_ms(), vec![InputEvent::key_release(KeyCode::ArrowRight)]);
    game.tick(frame_ms(), Vec::new());
    assert_eq!(player_x(&game), Some(start + 6.0));
}

#[test]
fn alarm_spawns_bullet_once() {
    let log: Log = Arc::default();
    let mut game = build(&log);
    game.tick(frame_ms(), vec![InputEvent::key_press(KeyCode::Space)]);

    for _ in 0..4 {
        game.tick(frame_ms(), Vec::new());
    }
    assert_eq!(count_kind(&game, "bullet"), 1);

    for _ in 0..4 {
        game.tick(frame_ms(), Vec::new());
    }
    assert_eq!(count_kind(&game, "bullet"), 1);
}

#[test]
fn every_tick_renders_a_window_sized_frame() {
    let log: Log = Arc::default();
    let mut game = build(&log);
    game.set_renderer(SoftwareRenderer::new());

    game.tick(frame_ms(), Vec::new());
    let shot = game.context().screenshot().unwrap();
    assert_eq!((shot.width(), shot.height()), (640, 480));
    assert_eq!(shot.get(320, 240), Some(Color::BLACK));
}

#[test]
fn quit_request_without_handler_override_ends_game() {
    let log: Log = Arc::default();
    let mut game = build(&log);
    game.tick(frame_ms(), Vec::new());

    assert_eq!(game.tick(frame_ms(), vec![InputEvent::QuitRequest]), TickControl::Exit);
    assert!(game.has_ended());
    assert_eq!(*log.lock().unwrap(), vec!["menu_end", "game_end"]);
}
