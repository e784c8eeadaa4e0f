//=========================================================================
// Objects
//=========================================================================
//
// Things that live in rooms: a player, an enemy, a wall.
//
// Architecture:
//   Object<R>
//     ├─ state: ObjectState         (position, sprite, motion, collision)
//     └─ behavior: Box<dyn Behavior<R>>  (event hooks)
//
// The room stores both halves. While one of an object's hooks runs, the
// object is detached from the room and its state is handed to the hook
// as `this`; every other object stays reachable through the room.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::alarms::Alarms;
use crate::core::collision::{Mask, MaskKey};
use crate::core::gfx::{BlendMode, Color, Sprite};
use crate::core::room::RoomKey;

//=== Module Declarations =================================================

mod behavior;

//=== Public API ==========================================================

pub use behavior::{default_update_position, Behavior};

//=== ObjectId ============================================================

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique handle of an object. Ids grow with creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

//=== ObjectState =========================================================

/// Data of one object.
///
/// Velocity is stored per axis; [`speed`](Self::speed) and
/// [`move_direction`](Self::move_direction) are derived from it, so the
/// two views never disagree. Directions are degrees counter-clockwise
/// with 0 pointing right, in a y-down world.
#[derive(Debug, Clone)]
pub struct ObjectState {
    id: ObjectId,

    pub x: f64,
    pub y: f64,
    pub z: f64,

    sprite: Option<Arc<Sprite>>,

    pub visible: bool,

    /// Inactive objects get no input, step, alarm, motion or animation.
    pub active: bool,

    /// Whether this object looks for collisions with others.
    pub checks_collisions: bool,

    /// Whether other objects (and room queries) can collide with this
    /// one. Intangible objects never collide.
    pub tangible: bool,

    pub bbox_x: f64,
    pub bbox_y: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,

    /// Keeps the origin on the same point of the image when it is
    /// scaled, flipped or rotated.
    pub regulate_origin: bool,

    pub collision_ellipse: bool,
    pub collision_precise: bool,

    pub xvelocity: f64,
    pub yvelocity: f64,
    pub xacceleration: f64,
    pub yacceleration: f64,
    pub xdeceleration: f64,
    pub ydeceleration: f64,

    image_index: usize,
    pub image_origin_x: Option<f64>,
    pub image_origin_y: Option<f64>,

    /// Animation rate in frames per second. Negative plays backwards.
    pub image_fps: f64,
    pub image_xscale: f64,
    pub image_yscale: f64,

    /// Counter-clockwise rotation in degrees.
    pub image_rotation: f64,
    pub image_alpha: u8,
    pub image_blend: Option<Color>,
    pub image_blend_mode: BlendMode,

    pub alarms: Alarms,

    pub xstart: f64,
    pub ystart: f64,
    pub xprevious: f64,
    pub yprevious: f64,

    /// Object type, used by `Other::Kind` collision filters.
    pub kind: &'static str,
    pub tags: Vec<&'static str>,

    anim_count: f64,
    destroyed: bool,
}

impl ObjectState {
    //--- Construction -----------------------------------------------------

    /// An object at `(x, y)` with no sprite and a `1×1` bounding box.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: ObjectId::next(),
            x,
            y,
            z: 0.0,
            sprite: None,
            visible: true,
            active: true,
            checks_collisions: true,
            tangible: true,
            bbox_x: 0.0,
            bbox_y: 0.0,
            bbox_width: 1.0,
            bbox_height: 1.0,
            regulate_origin: false,
            collision_ellipse: false,
            collision_precise: false,
            xvelocity: 0.0,
            yvelocity: 0.0,
            xacceleration: 0.0,
            yacceleration: 0.0,
            xdeceleration: 0.0,
            ydeceleration: 0.0,
            image_index: 0,
            image_origin_x: None,
            image_origin_y: None,
            image_fps: 0.0,
            image_xscale: 1.0,
            image_yscale: 1.0,
            image_rotation: 0.0,
            image_alpha: 255,
            image_blend: None,
            image_blend_mode: BlendMode::RgbMultiply,
            alarms: Alarms::new(),
            xstart: x,
            ystart: y,
            xprevious: x,
            yprevious: y,
            kind: "",
            tags: Vec::new(),
            anim_count: 0.0,
            destroyed: false,
        }
    }

    /// Sets the sprite, taking bounding box and animation rate from it.
    pub fn with_sprite(mut self, sprite: Arc<Sprite>) -> Self {
        self.image_fps = sprite.fps;
        self.set_sprite(Some(sprite));
        self.reset_bbox();
        self
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_bbox(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bbox_x = x;
        self.bbox_y = y;
        self.bbox_width = width;
        self.bbox_height = height;
        self
    }

    pub fn with_velocity(mut self, xvelocity: f64, yvelocity: f64) -> Self {
        self.xvelocity = xvelocity;
        self.yvelocity = yvelocity;
        self
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tag(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }

    /// Sets `collision_ellipse` and `collision_precise`.
    pub fn with_collision_shape(mut self, ellipse: bool, precise: bool) -> Self {
        self.collision_ellipse = ellipse;
        self.collision_precise = precise;
        self
    }

    pub fn with_flags(mut self, visible: bool, active: bool, checks_collisions: bool, tangible: bool) -> Self {
        self.visible = visible;
        self.active = active;
        self.checks_collisions = checks_collisions;
        self.tangible = tangible;
        self
    }

    //--- Identity & Lifecycle ---------------------------------------------

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Removes the object from its room once the running event returns.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    //--- Sprite & Image ---------------------------------------------------

    pub fn sprite(&self) -> Option<&Arc<Sprite>> {
        self.sprite.as_ref()
    }

    /// Changes the sprite. The image index wraps into the new frame
    /// count; the bounding box is left alone.
    pub fn set_sprite(&mut self, sprite: Option<Arc<Sprite>>) {
        self.sprite = sprite;
        self.set_image_index(self.image_index);
    }

    /// Resets the bounding box to the sprite's suggestion, or to
    /// `0, 0, 1, 1` without a sprite.
    pub fn reset_bbox(&mut self) {
        match &self.sprite {
            Some(s) => {
                self.bbox_x = s.bbox_x;
                self.bbox_y = s.bbox_y;
                self.bbox_width = s.bbox_width;
                self.bbox_height = s.bbox_height;
            }
            None => {
                self.bbox_x = 0.0;
                self.bbox_y = 0.0;
                self.bbox_width = 1.0;
                self.bbox_height = 1.0;
            }
        }
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn set_image_index(&mut self, index: usize) {
        let frames = self.sprite.as_ref().map_or(1, |s| s.frames().max(1));
        self.image_index = index % frames;
    }

    /// Animation rate as a factor of the game frame rate.
    pub fn image_speed(&self, game_fps: f64) -> f64 {
        self.image_fps / game_fps
    }

    pub fn set_image_speed(&mut self, speed: f64, game_fps: f64) {
        self.image_fps = speed * game_fps;
    }

    /// Origin of the displayed image, relative to its unrotated
    /// top-left corner.
    pub fn image_origin(&self) -> (f64, f64) {
        let Some(sprite) = &self.sprite else {
            return (self.image_origin_x.unwrap_or(0.0), self.image_origin_y.unwrap_or(0.0));
        };
        if !self.regulate_origin {
            return (
                self.image_origin_x.unwrap_or(sprite.origin_x),
                self.image_origin_y.unwrap_or(sprite.origin_y),
            );
        }

        let (xs, ys) = (self.image_xscale, self.image_yscale);
        let (w, h) = (sprite.width() as f64, sprite.height() as f64);
        let ox = if xs < 0.0 { w - sprite.origin_x } else { sprite.origin_x } * xs.abs();
        let oy = if ys < 0.0 { h - sprite.origin_y } else { sprite.origin_y } * ys.abs();
        if self.image_rotation % 360.0 == 0.0 {
            return (ox, oy);
        }

        let (nw, nh) = (w * xs.abs(), h * ys.abs());
        let (dx, dy) = (ox - nw / 2.0, oy - nh / 2.0);
        let (sin, cos) = self.image_rotation.to_radians().sin_cos();
        (dx * cos + dy * sin + nw / 2.0, -dx * sin + dy * cos + nh / 2.0)
    }

    /// Top-left corner of the displayed (transformed) image.
    pub fn image_position(&self) -> (f64, f64) {
        let (ox, oy) = self.image_origin();
        let (cx, cy) = self.rotation_offset();
        (self.x - ox - cx, self.y - oy - cy)
    }

    /// How far rotation grows the image beyond its unrotated size, per
    /// side.
    fn rotation_offset(&self) -> (f64, f64) {
        let Some(sprite) = &self.sprite else {
            return (0.0, 0.0);
        };
        let (xs, ys, rot) = (self.image_xscale, self.image_yscale, self.image_rotation);
        let (nw, nh) = sprite.transformed_size(xs, ys, 0.0);
        let (rw, rh) = sprite.transformed_size(xs, ys, rot);
        (
            (rw as f64 - nw as f64) / 2.0,
            (rh as f64 - nh as f64) / 2.0,
        )
    }

    //--- Motion -----------------------------------------------------------

    pub fn speed(&self) -> f64 {
        self.xvelocity.hypot(self.yvelocity)
    }

    /// Changes the speed keeping the direction of motion.
    pub fn set_speed(&mut self, speed: f64) {
        let (sin, cos) = self.move_direction().to_radians().sin_cos();
        self.xvelocity = speed * cos;
        self.yvelocity = -speed * sin;
    }

    /// Direction of motion in degrees, counter-clockwise from the right.
    pub fn move_direction(&self) -> f64 {
        (-self.yvelocity).atan2(self.xvelocity).to_degrees()
    }

    /// Changes the direction keeping the speed.
    pub fn set_move_direction(&mut self, degrees: f64) {
        let speed = self.speed();
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.xvelocity = speed * cos;
        self.yvelocity = -speed * sin;
    }

    //--- Bounding Box -----------------------------------------------------

    pub fn bbox_left(&self) -> f64 {
        self.x + self.bbox_x
    }

    pub fn set_bbox_left(&mut self, value: f64) {
        self.x = value - self.bbox_x;
    }

    pub fn bbox_right(&self) -> f64 {
        self.bbox_left() + self.bbox_width
    }

    pub fn set_bbox_right(&mut self, value: f64) {
        self.x = value - self.bbox_width - self.bbox_x;
    }

    pub fn bbox_top(&self) -> f64 {
        self.y + self.bbox_y
    }

    pub fn set_bbox_top(&mut self, value: f64) {
        self.y = value - self.bbox_y;
    }

    pub fn bbox_bottom(&self) -> f64 {
        self.bbox_top() + self.bbox_height
    }

    pub fn set_bbox_bottom(&mut self, value: f64) {
        self.y = value - self.bbox_height - self.bbox_y;
    }

    /// Bounding box at the previous frame's position.
    pub(crate) fn previous_bbox(&self) -> (f64, f64, f64, f64) {
        let left = self.xprevious + self.bbox_x;
        let top = self.yprevious + self.bbox_y;
        (left, left + self.bbox_width, top, top + self.bbox_height)
    }

    /// Rectangle used for object areas: the bounding box widened to the
    /// sprite rectangle.
    pub(crate) fn area_rect(&self) -> (f64, f64, f64, f64) {
        let (mut x, mut y) = (self.bbox_left(), self.bbox_top());
        let (mut w, mut h) = (self.bbox_width, self.bbox_height);
        if let Some(sprite) = &self.sprite {
            let (ox, oy) = self.image_origin();
            x = x.min(self.x - ox);
            y = y.min(self.y - oy);
            w = w.max(sprite.width() as f64);
            h = h.max(sprite.height() as f64);
        }
        (x, y, w, h)
    }

    //--- Collision Mask ---------------------------------------------------

    pub(crate) fn uses_mask(&self) -> bool {
        (self.collision_precise && self.sprite.is_some()) || self.collision_ellipse
    }

    pub(crate) fn mask_key(&self) -> MaskKey {
        match (&self.sprite, self.collision_precise, self.collision_ellipse) {
            (Some(sprite), true, _) => MaskKey::Precise {
                sprite: sprite.cache_key(),
                frame: self.image_index,
                xscale: self.image_xscale.to_bits(),
                yscale: self.image_yscale.to_bits(),
                rotation: self.image_rotation.to_bits(),
            },
            (_, _, true) => MaskKey::Ellipse(self.bbox_width as usize, self.bbox_height as usize),
            _ => MaskKey::Full(self.bbox_width as usize, self.bbox_height as usize),
        }
    }

    /// The collision mask: the opaque pixels of the current image when
    /// precise, an ellipse filling the bounding box, or the full box.
    pub fn mask(&self) -> Mask {
        match (&self.sprite, self.collision_precise, self.collision_ellipse) {
            (Some(sprite), true, _) => sprite.precise_mask(
                self.image_index,
                self.image_xscale,
                self.image_yscale,
                self.image_rotation,
            ),
            (_, _, true) => Mask::ellipse(self.bbox_width as usize, self.bbox_height as usize),
            _ => Mask::full(self.bbox_width as usize, self.bbox_height as usize),
        }
    }

    /// Left edge of the mask in the room.
    pub fn mask_x(&self) -> f64 {
        if self.collision_precise && self.sprite.is_some() {
            self.image_position().0
        } else {
            self.bbox_left()
        }
    }

    /// Top edge of the mask in the room.
    pub fn mask_y(&self) -> f64 {
        if self.collision_precise && self.sprite.is_some() {
            self.image_position().1
        } else {
            self.bbox_top()
        }
    }

    //--- Per-Frame Update -------------------------------------------------

    /// Advances the animation by `time_passed` ms. Returns how many
    /// times it wrapped around the frame count.
    pub(crate) fn advance_animation(&mut self, time_passed: f64) -> usize {
        let Some(sprite) = &self.sprite else {
            return 0;
        };
        if self.image_fps == 0.0 || !self.image_fps.is_finite() {
            return 0;
        }
        let frames = sprite.frames().max(1) as i64;
        let frame_time = 1000.0 / self.image_fps;

        self.anim_count += time_passed;
        let mut index = self.image_index as i64 + (self.anim_count / frame_time).trunc() as i64;
        self.anim_count %= frame_time.abs();

        let mut wraps = 0;
        while index >= frames {
            index -= frames;
            wraps += 1;
        }
        while index < 0 {
            index += frames;
            wraps += 1;
        }
        self.image_index = index as usize;
        wraps
    }

    pub(crate) fn store_previous_position(&mut self) {
        self.xprevious = self.x;
        self.yprevious = self.y;
    }
}

//=== Object ==============================================================

/// An object ready to be added to a room: its state plus its behavior.
pub struct Object<R: RoomKey> {
    pub(crate) state: ObjectState,
    pub(crate) behavior: Box<dyn Behavior<R>>,
}

impl<R: RoomKey> Object<R> {
    pub fn new<B: Behavior<R>>(state: ObjectState, behavior: B) -> Self {
        Self {
            state,
            behavior: Box::new(behavior),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.state.id
    }

    pub fn state(&self) -> &ObjectState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }
}

impl<R: RoomKey> std::fmt::Debug for Object<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object").field("state", &self.state).finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gfx::Pixmap;

    fn sprite(w: u32, h: u32, frames: usize) -> Arc<Sprite> {
        let mut s = Sprite::from_pixmap(Pixmap::filled(w, h, Color::WHITE));
        for _ in 1..frames {
            s.append_frame();
        }
        Arc::new(s)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    //=====================================================================
    // Defaults
    //=====================================================================

    #[test]
    fn defaults_without_sprite() {
        let obj = ObjectState::new(3.0, 4.0);
        assert_eq!((obj.bbox_width, obj.bbox_height), (1.0, 1.0));
        assert_eq!((obj.xstart, obj.ystart), (3.0, 4.0));
        assert_eq!((obj.xprevious, obj.yprevious), (3.0, 4.0));
        assert!(obj.visible && obj.active && obj.tangible && obj.checks_collisions);
    }

    #[test]
    fn sprite_sets_bbox_and_fps() {
        let s = Arc::new(Sprite::new(16, 8).with_origin(8.0, 4.0).with_fps(12.0));
        let obj = ObjectState::new(0.0, 0.0).with_sprite(s);
        assert_eq!((obj.bbox_x, obj.bbox_y), (-8.0, -4.0));
        assert_eq!((obj.bbox_width, obj.bbox_height), (16.0, 8.0));
        assert_eq!(obj.image_fps, 12.0);
        assert_eq!(obj.image_speed(60.0), 0.2);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ObjectState::new(0.0, 0.0);
        let b = ObjectState::new(0.0, 0.0);
        assert!(b.id() > a.id());
    }

    #[test]
    fn sprite_change_wraps_image_index() {
        let mut obj = ObjectState::new(0.0, 0.0).with_sprite(sprite(2, 2, 4));
        obj.set_image_index(3);
        obj.set_sprite(Some(sprite(2, 2, 2)));
        assert_eq!(obj.image_index(), 1);
    }

    //=====================================================================
    // Motion
    //=====================================================================

    #[test]
    fn speed_and_direction_stay_coherent() {
        let mut obj = ObjectState::new(0.0, 0.0).with_velocity(3.0, -4.0);
        assert!(close(obj.speed(), 5.0));

        obj.set_move_direction(90.0);
        assert!(close(obj.xvelocity, 0.0));
        assert!(close(obj.yvelocity, -5.0));

        obj.set_speed(2.0);
        assert!(close(obj.yvelocity, -2.0));
        assert!(close(obj.move_direction(), 90.0));
    }

    #[test]
    fn bbox_edges_move_object() {
        let mut obj = ObjectState::new(10.0, 10.0).with_bbox(-2.0, -3.0, 4.0, 6.0);
        assert_eq!(obj.bbox_right(), 12.0);
        obj.set_bbox_right(20.0);
        assert_eq!(obj.x, 18.0);
        obj.set_bbox_top(0.0);
        assert_eq!(obj.y, 3.0);
        assert_eq!(obj.bbox_bottom(), 6.0);
    }

    //=====================================================================
    // Animation
    //=====================================================================

    #[test]
    fn animation_wraps_and_counts() {
        let mut obj = ObjectState::new(0.0, 0.0).with_sprite(sprite(2, 2, 3));
        obj.image_fps = 10.0;
        assert_eq!(obj.advance_animation(250.0), 0);
        assert_eq!(obj.image_index(), 2);
        assert_eq!(obj.advance_animation(100.0), 1);
        assert_eq!(obj.image_index(), 0);
    }

    #[test]
    fn reverse_animation_wraps_too() {
        let mut obj = ObjectState::new(0.0, 0.0).with_sprite(sprite(2, 2, 3));
        obj.image_fps = -10.0;
        assert_eq!(obj.advance_animation(100.0), 1);
        assert_eq!(obj.image_index(), 2);
    }

    #[test]
    fn zero_fps_holds_frame() {
        let mut obj = ObjectState::new(0.0, 0.0).with_sprite(sprite(2, 2, 3));
        obj.image_fps = 0.0;
        assert_eq!(obj.advance_animation(5000.0), 0);
        assert_eq!(obj.image_index(), 0);
    }

    //=====================================================================
    // Origin & Mask
    //=====================================================================

    #[test]
    fn regulated_origin_follows_flip_and_scale() {
        let s = Arc::new(Sprite::new(10, 4).with_origin(2.0, 1.0));
        let mut obj = ObjectState::new(0.0, 0.0).with_sprite(s);
        assert_eq!(obj.image_origin(), (2.0, 1.0));

        obj.regulate_origin = true;
        obj.image_xscale = -2.0;
        assert_eq!(obj.image_origin(), (16.0, 1.0));
    }

    #[test]
    fn regulated_origin_rotates_with_image() {
        let s = Arc::new(Sprite::new(4, 2).with_origin(0.0, 0.0));
        let mut obj = ObjectState::new(100.0, 100.0).with_sprite(s);
        obj.regulate_origin = true;
        obj.image_rotation = 90.0;

        // Rotated image is 2x4; the old top-left corner is now bottom-left.
        let (px, py) = obj.image_position();
        assert!(close(px, 100.0));
        assert!(close(py, 96.0));
    }

    #[test]
    fn mask_follows_collision_shape() {
        let s = sprite(4, 4, 1);
        let mut obj = ObjectState::new(5.0, 5.0).with_sprite(s).with_bbox(1.0, 1.0, 2.0, 2.0);
        assert_eq!(obj.mask(), Mask::full(2, 2));
        assert_eq!(obj.mask_x(), 6.0);

        obj.collision_precise = true;
        assert_eq!(obj.mask().width(), 4);
        assert_eq!(obj.mask_x(), 5.0);
        assert!(matches!(obj.mask_key(), MaskKey::Precise { .. }));

        obj.collision_precise = false;
        obj.collision_ellipse = true;
        assert_eq!(obj.mask(), Mask::ellipse(2, 2));
    }

    #[test]
    fn area_rect_covers_sprite_and_bbox() {
        let s = Arc::new(Sprite::new(8, 8).with_origin(4.0, 4.0));
        let obj = ObjectState::new(20.0, 20.0).with_sprite(s).with_bbox(-6.0, 0.0, 2.0, 2.0);
        assert_eq!(obj.area_rect(), (14.0, 16.0, 8.0, 8.0));
    }
}
