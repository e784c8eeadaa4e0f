//=========================================================================
// Rooms
//=========================================================================
//
// A room is a level or screen: its size, views, background and the
// objects living in it.
//
// Architecture:
//   Room<R>
//     ├─ objects: HashMap<ObjectId, Object<R>>   (+ order: insertion order)
//     ├─ areas: ObjectAreas                      (spatial grid)
//     ├─ masks: MaskCache                        (collision masks)
//     ├─ lifecycle: LifecycleQueue               (pending create/destroy)
//     └─ handler: Box<dyn RoomHandler<R>>        (room events)
//
// Flow:
//   add(obj) ──> Create queued ──> fired by the game once the room runs
//   remove(id) ──> Destroy queued (running room only)
//
// Object areas are refreshed lazily: every object handed out mutably is
// marked dirty and re-registered before the next spatial query.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::alarms::Alarms;
use crate::core::collision::MaskCache;
use crate::core::game::RoomHandler;
use crate::core::gfx::{Background, Color, DrawCommand, Font, Pixmap, ShapeStyle, Sprite, TextStyle};
use crate::core::object::{Object, ObjectId, ObjectState};

//=== Module Declarations =================================================

mod lifecycle;
mod object_areas;
pub(crate) mod render;
mod room_manager;
mod view;

//=== Public API ==========================================================

pub use room_manager::RoomKey;
pub use view::View;

pub(crate) use lifecycle::{Lifecycle, LifecycleQueue};
pub(crate) use object_areas::ObjectAreas;
pub(crate) use room_manager::RoomManager;

//=== Room ================================================================

/// A level or screen of the game.
pub struct Room<R: RoomKey> {
    width: f64,
    height: f64,
    views: Vec<View>,

    pub background: Background,

    /// Offset of the background relative to the room.
    pub background_x: f64,
    pub background_y: f64,

    pub alarms: Alarms,

    object_area_size: Option<(f64, f64)>,

    pub(crate) objects: HashMap<ObjectId, Object<R>>,
    pub(crate) order: Vec<ObjectId>,
    pub(crate) areas: ObjectAreas,
    pub(crate) masks: MaskCache,
    pub(crate) lifecycle: LifecycleQueue<R>,
    pub(crate) handler: Option<Box<dyn RoomHandler<R>>>,

    /// Objects whose state may have moved since areas were refreshed.
    dirty: HashSet<ObjectId>,

    /// Objects currently running one of their hooks, outside the map.
    detached: HashSet<ObjectId>,

    /// Removal requested for a detached object.
    doomed: HashSet<ObjectId>,

    projections: Vec<DrawCommand>,

    /// Whether this is the game's current room.
    pub(crate) current: bool,

    /// Whether the room has started at least once.
    pub(crate) started: bool,
}

impl<R: RoomKey> Room<R> {
    //--- Construction -----------------------------------------------------

    /// An empty room of the given size with a black background.
    ///
    /// Until registered with a game, object areas span the whole room
    /// and views have no size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            views: Vec::new(),
            background: Background::default(),
            background_x: 0.0,
            background_y: 0.0,
            alarms: Alarms::new(),
            object_area_size: None,
            objects: HashMap::new(),
            order: Vec::new(),
            areas: ObjectAreas::new(width, height, width, height),
            masks: MaskCache::new(GameConfig::default().cache_life),
            lifecycle: LifecycleQueue::new(),
            handler: None,
            dirty: HashSet::new(),
            detached: HashSet::new(),
            doomed: HashSet::new(),
            projections: Vec::new(),
            current: false,
            started: false,
        }
    }

    pub fn with_views(mut self, views: Vec<View>) -> Self {
        self.views = Vec::new();
        for view in views {
            self.add_view(view);
        }
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Sets the cell size of the collision grid.
    pub fn with_object_area_size(mut self, width: f64, height: f64) -> Self {
        self.object_area_size = Some((width, height));
        self.rebuild_areas();
        self
    }

    pub fn with_handler(mut self, handler: impl RoomHandler<R>) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Adds an object, builder style.
    pub fn with_object(mut self, object: Object<R>) -> Self {
        self.add(object);
        self
    }

    /// Applies game-wide defaults once the room is registered.
    pub(crate) fn resolve(&mut self, config: &GameConfig) {
        if self.object_area_size.is_none() {
            let (w, h) = config.default_object_area();
            self.object_area_size = Some((w as f64, h as f64));
            self.rebuild_areas();
        }
        self.masks = MaskCache::new(config.cache_life);
        if self.views.is_empty() {
            self.add_view(View::new(0.0, 0.0));
        }
        let (gw, gh) = (config.width as f64, config.height as f64);
        for view in &mut self.views {
            view.resolve(gw, gh);
        }
    }

    //--- Size & Views -----------------------------------------------------

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Resizes the room, rebuilding the object areas and keeping views
    /// inside it.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rebuild_areas();
        for view in &mut self.views {
            view.set_bounds(width, height);
        }
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut [View] {
        &mut self.views
    }

    pub fn add_view(&mut self, mut view: View) {
        view.set_bounds(self.width, self.height);
        self.views.push(view);
    }

    pub fn remove_view(&mut self, index: usize) -> Option<View> {
        (index < self.views.len()).then(|| self.views.remove(index))
    }

    //--- Objects ----------------------------------------------------------

    /// Adds an object. Its create event fires once the room is running.
    pub fn add(&mut self, object: Object<R>) -> ObjectId {
        let id = object.id();
        if self.objects.contains_key(&id) || self.detached.contains(&id) {
            warn!("Object {:?} is already in this room", id);
            return id;
        }
        self.areas.update(id, object.state.area_rect());
        self.objects.insert(id, object);
        self.order.push(id);
        self.lifecycle.push(Lifecycle::Create(id));
        id
    }

    /// Removes an object. Its destroy event fires if the room is
    /// running and its create event already fired.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        if self.detached.contains(&id) {
            self.doomed.insert(id);
            return true;
        }
        let Some(object) = self.objects.remove(&id) else {
            debug!("Object {:?} not found in room, skipping removal", id);
            return false;
        };
        self.forget(id);
        let never_created = self.lifecycle.cancel_create(id);
        if self.current && !never_created {
            self.lifecycle.push(Lifecycle::Destroy(object));
        }
        true
    }

    fn forget(&mut self, id: ObjectId) {
        self.order.retain(|o| *o != id);
        self.areas.remove(id);
        self.dirty.remove(&id);
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids of all objects, in the order they were added.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.order.clone()
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectState> {
        self.objects.get(&id).map(|o| &o.state)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectState> {
        let object = self.objects.get_mut(&id)?;
        self.dirty.insert(id);
        Some(&mut object.state)
    }

    /// All objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectState> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.objects.get(id).map(|o| &o.state))
    }

    /// Objects registered in an object area the rectangle touches.
    /// This is a broad phase; use the collision queries for exact
    /// overlap.
    pub fn objects_at(&mut self, x: f64, y: f64, width: f64, height: f64) -> Vec<ObjectId> {
        self.refresh_areas();
        self.areas
            .query(x, y, width, height)
            .into_iter()
            .filter(|id| self.objects.contains_key(id))
            .collect()
    }

    //--- Object Areas -----------------------------------------------------

    fn rebuild_areas(&mut self) {
        let (aw, ah) = self.object_area_size.unwrap_or((self.width, self.height));
        self.areas = ObjectAreas::new(self.width, self.height, aw, ah);
        for (id, object) in &self.objects {
            self.areas.update(*id, object.state.area_rect());
        }
        self.dirty.clear();
    }

    /// Re-registers every object touched since the last refresh.
    pub(crate) fn refresh_areas(&mut self) {
        for id in std::mem::take(&mut self.dirty) {
            if let Some(object) = self.objects.get(&id) {
                self.areas.update(id, object.state.area_rect());
            }
        }
    }

    pub(crate) fn reset_areas(&mut self) {
        self.rebuild_areas();
    }

    //--- Dispatch ---------------------------------------------------------

    /// Takes an object out of the map while one of its hooks runs.
    pub(crate) fn detach(&mut self, id: ObjectId) -> Option<Object<R>> {
        let object = self.objects.remove(&id)?;
        self.detached.insert(id);
        Some(object)
    }

    /// Puts a detached object back, or queues its destroy event if it
    /// was destroyed meanwhile.
    pub(crate) fn restore(&mut self, object: Object<R>) {
        let id = object.id();
        self.detached.remove(&id);
        let doomed = self.doomed.remove(&id) || object.state.is_destroyed();

        if doomed {
            self.forget(id);
            let never_created = self.lifecycle.cancel_create(id);
            if self.current && !never_created {
                self.lifecycle.push(Lifecycle::Destroy(object));
            }
        } else {
            self.objects.insert(id, object);
            self.dirty.insert(id);
        }
    }

    /// Queues removal of objects destroyed through `object_mut`.
    pub(crate) fn collect_destroyed(&mut self) {
        let doomed: Vec<ObjectId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.state.is_destroyed()))
            .collect();
        for id in doomed {
            self.remove(id);
        }
    }

    //--- Projections ------------------------------------------------------

    /// Draws an image in the room for the current frame only.
    pub fn project(&mut self, command: DrawCommand) {
        self.projections.push(command);
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

    pub fn project_pixmap(&mut self, pixmap: Pixmap, x: f64, y: f64, z: f64) {
        self.project(DrawCommand::new(Arc::new(pixmap), x, y, z));
    }

    pub(crate) fn projections(&self) -> &[DrawCommand] {
        &self.projections
    }

    pub(crate) fn clear_projections(&mut self) {
        self.projections.clear();
    }

    //--- Status -----------------------------------------------------------

    /// Whether this room is the one the game is running.
    pub fn is_current(&self) -> bool {
        self.current
    }

    pub fn has_started(&self) -> bool {
        self.started
    }
}

impl<R: RoomKey> std::fmt::Debug for Room<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("views", &self.views)
            .field("objects", &self.order.len())
            .field("current", &self.current)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestRoom {
        Main,
    }

    impl RoomKey for TestRoom {}

    fn object(x: f64, y: f64) -> Object<TestRoom> {
        Object::new(ObjectState::new(x, y), ())
    }

    //=====================================================================
    // Membership
    //=====================================================================

    #[test]
    fn add_keeps_insertion_order_and_queues_create() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        let a = room.add(object(0.0, 0.0));
        let b = room.add(object(5.0, 5.0));

        assert_eq!(room.object_ids(), vec![a, b]);
        assert_eq!(room.lifecycle.len(), 2);
        assert!(room.lifecycle.has_pending_create(a));
    }

    #[test]
    fn removing_uncreated_object_fires_nothing() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        room.current = true;
        let a = room.add(object(0.0, 0.0));

        assert!(room.remove(a));
        assert!(room.lifecycle.is_empty());
        assert!(!room.remove(a));
    }

    #[test]
    fn removing_from_running_room_queues_destroy() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        room.current = true;
        let a = room.add(object(0.0, 0.0));
        room.lifecycle.take();

        room.remove(a);
        let events = room.lifecycle.take();
        assert!(matches!(&events[..], [Lifecycle::Destroy(o)] if o.id() == a));
    }

    #[test]
    fn removing_from_idle_room_is_silent() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        let a = room.add(object(0.0, 0.0));
        room.lifecycle.take();

        room.remove(a);
        assert!(room.lifecycle.is_empty());
        assert!(room.is_empty());
    }

    //=====================================================================
    // Dispatch
    //=====================================================================

    #[test]
    fn detached_object_is_restored() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        let a = room.add(object(0.0, 0.0));

        let mut obj = room.detach(a).unwrap();
        assert!(room.object(a).is_none());
        assert_eq!(room.object_ids(), vec![a]);

        obj.state.x = 50.0;
        room.restore(obj);
        assert_eq!(room.object(a).map(|s| s.x), Some(50.0));
    }

    #[test]
    fn destroy_during_dispatch_removes_on_restore() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        room.current = true;
        let a = room.add(object(0.0, 0.0));
        room.lifecycle.take();

        let obj = room.detach(a).unwrap();
        assert!(room.remove(a));
        room.restore(obj);

        assert!(!room.contains(a));
        assert!(room.is_empty());
        assert_eq!(room.lifecycle.len(), 1);
    }

    #[test]
    fn destroy_flag_is_collected() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0);
        let a = room.add(object(0.0, 0.0));
        room.object_mut(a).unwrap().destroy();
        room.collect_destroyed();
        assert!(!room.contains(a));
    }

    //=====================================================================
    // Object Areas
    //=====================================================================

    #[test]
    fn objects_at_follows_moved_objects() {
        let mut room: Room<TestRoom> = Room::new(200.0, 200.0).with_object_area_size(50.0, 50.0);
        let a = room.add(object(10.0, 10.0));
        assert_eq!(room.objects_at(0.0, 0.0, 20.0, 20.0), vec![a]);

        room.object_mut(a).unwrap().x = 150.0;
        assert!(room.objects_at(0.0, 0.0, 20.0, 20.0).is_empty());
        assert_eq!(room.objects_at(140.0, 0.0, 20.0, 20.0), vec![a]);
    }

    #[test]
    fn objects_outside_room_live_in_void() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0).with_object_area_size(50.0, 50.0);
        let a = room.add(object(-30.0, 10.0));
        assert_eq!(room.objects_at(-100.0, -100.0, 10.0, 10.0), vec![a]);
        assert!(room.objects_at(60.0, 60.0, 10.0, 10.0).is_empty());
    }

    //=====================================================================
    // Views & Config
    //=====================================================================

    #[test]
    fn resolve_applies_game_defaults() {
        let config = GameConfig {
            width: 320,
            height: 240,
            ..GameConfig::default()
        };
        let mut room: Room<TestRoom> = Room::new(1000.0, 1000.0);
        room.resolve(&config);

        assert_eq!(room.views().len(), 1);
        assert_eq!(room.views()[0].width(), 320.0);
        assert_eq!(room.areas.grid_size(), (4, 5));
    }

    #[test]
    fn views_are_kept_inside_room() {
        let mut room: Room<TestRoom> =
            Room::new(300.0, 300.0).with_views(vec![View::new(250.0, 0.0).with_size(100.0, 100.0)]);
        assert_eq!(room.views()[0].x(), 200.0);

        room.views_mut()[0].set_x(-5.0);
        assert_eq!(room.views()[0].x(), 0.0);
    }
}
