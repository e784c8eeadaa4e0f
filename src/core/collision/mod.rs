//=========================================================================
// Collision Detection
//=========================================================================
//
// Rectangle and mask tests, room queries and the collision event pass.
//
// Architecture:
//   shape query  ──> Room::objects_at(rect) ──> candidates
//                                               ├─ bbox test   (plain objects)
//                                               └─ mask test   (precise / ellipse)
//
// Shape masks and object masks are cached per room (TtlCache keyed by
// MaskKey) and pruned with the other caches.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::cache::TtlCache;
use crate::core::object::{ObjectId, ObjectState};
use crate::core::room::{Room, RoomKey};

//=== Module Declarations =================================================

mod mask;

//=== Public API ==========================================================

pub use mask::Mask;

//=== Primitive Tests =====================================================

/// Whether two rectangles overlap. Touching edges do not count.
/// Negative sizes extend to the left/top.
#[allow(clippy::too_many_arguments)]
pub fn rectangles_collide(
    x1: f64,
    y1: f64,
    w1: f64,
    h1: f64,
    x2: f64,
    y2: f64,
    w2: f64,
    h2: f64,
) -> bool {
    let (x1, w1) = normalize(x1, w1);
    let (y1, h1) = normalize(y1, h1);
    let (x2, w2) = normalize(x2, w2);
    let (y2, h2) = normalize(y2, h2);
    x1 < x2 + w2 && x1 + w1 > x2 && y1 < y2 + h2 && y1 + h1 > y2
}

fn normalize(pos: f64, size: f64) -> (f64, f64) {
    if size < 0.0 {
        (pos + size, -size)
    } else {
        (pos, size)
    }
}

/// Whether two masks share a set pixel. Positions are rounded to whole
/// pixels first.
pub fn masks_collide(x1: f64, y1: f64, mask1: &Mask, x2: f64, y2: f64, mask2: &Mask) -> bool {
    let (x1, y1) = (x1.round() as i64, y1.round() as i64);
    let (x2, y2) = (x2.round() as i64, y2.round() as i64);

    let left = x1.max(x2);
    let right = (x1 + mask1.width() as i64).min(x2 + mask2.width() as i64);
    let top = y1.max(y2);
    let bottom = (y1 + mask1.height() as i64).min(y2 + mask2.height() as i64);

    for y in top..bottom {
        for x in left..right {
            let a = mask1.get((x - x1) as usize, (y - y1) as usize);
            if a && mask2.get((x - x2) as usize, (y - y2) as usize) {
                return true;
            }
        }
    }
    false
}

//=== Other ===============================================================

/// Filter restricting which objects a query reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Other {
    /// Every tangible object.
    #[default]
    Any,

    /// One specific object.
    Object(ObjectId),

    /// Any object of a set.
    Objects(Vec<ObjectId>),

    /// Objects whose `kind` matches.
    Kind(&'static str),

    /// Objects carrying a tag.
    Tag(&'static str),
}

impl Other {
    pub fn matches(&self, obj: &ObjectState) -> bool {
        match self {
            Self::Any => true,
            Self::Object(id) => obj.id() == *id,
            Self::Objects(ids) => ids.contains(&obj.id()),
            Self::Kind(kind) => obj.has_kind(kind),
            Self::Tag(tag) => obj.has_tag(tag),
        }
    }
}

//=== Mask Cache ==========================================================

/// Identifies a generated mask in the room's mask cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MaskKey {
    Full(usize, usize),
    Ellipse(usize, usize),
    Circle(u64),
    Line { x1: i64, y1: i64, x2: i64, y2: i64 },
    Precise {
        sprite: (u64, u64),
        frame: usize,
        xscale: u64,
        yscale: u64,
        rotation: u64,
    },
}

pub(crate) type MaskCache = TtlCache<MaskKey, Arc<Mask>>;

pub(crate) fn object_mask(cache: &mut MaskCache, obj: &ObjectState) -> Arc<Mask> {
    cache.get_or_insert_with(obj.mask_key(), || Arc::new(obj.mask()))
}

//=== Shape Queries =======================================================

/// A query shape placed in the room.
struct Shape {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    mask: Arc<Mask>,
    /// Plain rectangles test plain objects by bounding box.
    rectangle: bool,
}

fn shape_collisions<R: RoomKey>(room: &mut Room<R>, shape: &Shape, other: &Other) -> Vec<ObjectId> {
    let candidates = room.objects_at(shape.x, shape.y, shape.width, shape.height);
    let mut hits = Vec::new();

    for id in candidates {
        let Some(obj) = room.objects.get(&id) else {
            continue;
        };
        let state = &obj.state;
        if !state.tangible || !other.matches(state) {
            continue;
        }

        let hit = if shape.rectangle && !state.uses_mask() {
            rectangles_collide(
                shape.x,
                shape.y,
                shape.width,
                shape.height,
                state.bbox_left(),
                state.bbox_top(),
                state.bbox_width,
                state.bbox_height,
            )
        } else {
            let mask = object_mask(&mut room.masks, state);
            masks_collide(shape.x, shape.y, &shape.mask, state.mask_x(), state.mask_y(), &mask)
        };
        if hit {
            hits.push(id);
        }
    }
    hits
}

/// Objects colliding with a rectangle.
pub fn rectangle<R: RoomKey>(
    room: &mut Room<R>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    other: &Other,
) -> Vec<ObjectId> {
    let (x, width) = normalize(x, width);
    let (y, height) = normalize(y, height);
    let (w, h) = (width.round() as usize, height.round() as usize);
    let mask = room
        .masks
        .get_or_insert_with(MaskKey::Full(w, h), || Arc::new(Mask::full(w, h)));
    let shape = Shape { x, y, width, height, mask, rectangle: true };
    shape_collisions(room, &shape, other)
}

/// Objects colliding with the ellipse filling a rectangle.
pub fn ellipse<R: RoomKey>(
    room: &mut Room<R>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    other: &Other,
) -> Vec<ObjectId> {
    let (x, width) = normalize(x, width);
    let (y, height) = normalize(y, height);
    let (w, h) = (width.round() as usize, height.round() as usize);
    let mask = room
        .masks
        .get_or_insert_with(MaskKey::Ellipse(w, h), || Arc::new(Mask::ellipse(w, h)));
    let shape = Shape { x, y, width, height, mask, rectangle: false };
    shape_collisions(room, &shape, other)
}

/// Objects colliding with a circle centered on `(x, y)`.
pub fn circle<R: RoomKey>(room: &mut Room<R>, x: f64, y: f64, radius: f64, other: &Other) -> Vec<ObjectId> {
    let radius = radius.abs();
    let mask = room
        .masks
        .get_or_insert_with(MaskKey::Circle(radius.to_bits()), || Arc::new(Mask::circle(radius)));
    let d = radius * 2.0;
    let shape = Shape {
        x: x - radius,
        y: y - radius,
        width: d,
        height: d,
        mask,
        rectangle: false,
    };
    shape_collisions(room, &shape, other)
}

/// Objects colliding with a one-pixel line.
pub fn line<R: RoomKey>(
    room: &mut Room<R>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    other: &Other,
) -> Vec<ObjectId> {
    let (x1, y1) = (x1.round() as i64, y1.round() as i64);
    let (x2, y2) = (x2.round() as i64, y2.round() as i64);
    let (x, y) = (x1.min(x2), y1.min(y2));
    let w = (x1 - x2).unsigned_abs() as usize + 1;
    let h = (y1 - y2).unsigned_abs() as usize + 1;

    let key = MaskKey::Line {
        x1: x1 - x,
        y1: y1 - y,
        x2: x2 - x,
        y2: y2 - y,
    };
    let mask = room.masks.get_or_insert_with(key, || {
        Arc::new(Mask::line(x1 - x, y1 - y, x2 - x, y2 - y, w, h))
    });
    let shape = Shape {
        x: x as f64,
        y: y as f64,
        width: w as f64,
        height: h as f64,
        mask,
        rectangle: false,
    };
    shape_collisions(room, &shape, other)
}

//=== Object Queries ======================================================

/// Whether `a` and `b` overlap, with `a` shifted by `(dx, dy)`.
fn states_collide(cache: &mut MaskCache, a: &ObjectState, dx: f64, dy: f64, b: &ObjectState) -> bool {
    if a.uses_mask() || b.uses_mask() {
        let mask_a = object_mask(cache, a);
        let mask_b = object_mask(cache, b);
        masks_collide(
            a.mask_x() + dx,
            a.mask_y() + dy,
            &mask_a,
            b.mask_x(),
            b.mask_y(),
            &mask_b,
        )
    } else {
        rectangles_collide(
            a.bbox_left() + dx,
            a.bbox_top() + dy,
            a.bbox_width,
            a.bbox_height,
            b.bbox_left(),
            b.bbox_top(),
            b.bbox_width,
            b.bbox_height,
        )
    }
}

/// Objects colliding with `this`, optionally as if `this` stood at
/// `at`. Intangible objects collide with nothing.
pub fn object<R: RoomKey>(
    room: &mut Room<R>,
    this: &ObjectState,
    at: Option<(f64, f64)>,
    other: &Other,
) -> Vec<ObjectId> {
    if !this.tangible {
        return Vec::new();
    }
    let (dx, dy) = at.map_or((0.0, 0.0), |(x, y)| (x - this.x, y - this.y));

    let (qx, qy, qw, qh) = if this.uses_mask() {
        let mask = object_mask(&mut room.masks, this);
        (this.mask_x(), this.mask_y(), mask.width() as f64, mask.height() as f64)
    } else {
        (this.bbox_left(), this.bbox_top(), this.bbox_width, this.bbox_height)
    };
    let candidates = room.objects_at(qx + dx, qy + dy, qw, qh);

    let mut hits = Vec::new();
    for id in candidates {
        if id == this.id() {
            continue;
        }
        let Some(obj) = room.objects.get(&id) else {
            continue;
        };
        let state = &obj.state;
        if state.tangible && other.matches(state) && states_collide(&mut room.masks, this, dx, dy, state) {
            hits.push(id);
        }
    }
    hits
}

//=== Collision Events ====================================================

/// Directions of a collision from the previous-frame bounding boxes of
/// both objects.
pub(crate) fn directions(this: &ObjectState, other: &ObjectState) -> (i8, i8) {
    let (sl, sr, st, sb) = this.previous_bbox();
    let (ol, or, ot, ob) = other.previous_bbox();

    let xdir = if sr <= ol {
        1
    } else if sl >= or {
        -1
    } else {
        0
    };
    let ydir = if sb <= ot {
        1
    } else if st >= ob {
        -1
    } else {
        0
    };
    (xdir, ydir)
}

/// Candidate pairs for the collision event pass, in checker order.
///
/// Every tangible object lists the tangible objects sharing one of its
/// object areas. A checker then tests its list, removing itself from
/// each partner's list so no pair is tested twice.
pub(crate) fn collision_pairs<R: RoomKey>(room: &mut Room<R>) -> Vec<(ObjectId, ObjectId)> {
    room.refresh_areas();
    let colliders: Vec<ObjectId> = room
        .order
        .iter()
        .copied()
        .filter(|id| room.objects.get(id).is_some_and(|o| o.state.tangible))
        .collect();

    let mut lists: std::collections::HashMap<ObjectId, Vec<ObjectId>> = colliders
        .iter()
        .map(|&id| {
            let neighbours = room
                .areas
                .neighbours(id)
                .into_iter()
                .filter(|other| *other != id && colliders.contains(other))
                .collect();
            (id, neighbours)
        })
        .collect();

    let mut pairs = Vec::new();
    for &id in &colliders {
        let checks = room.objects.get(&id).is_some_and(|o| o.state.checks_collisions);
        if !checks {
            continue;
        }
        let partners = lists.get(&id).cloned().unwrap_or_default();
        for other in partners {
            if let Some(list) = lists.get_mut(&other) {
                list.retain(|x| *x != id);
            }
            pairs.push((id, other));
        }
    }
    pairs
}

/// Whether the pair currently collides; returns the directions if so.
pub(crate) fn test_pair<R: RoomKey>(room: &mut Room<R>, a: ObjectId, b: ObjectId) -> Option<(i8, i8)> {
    let (Some(oa), Some(ob)) = (room.objects.get(&a), room.objects.get(&b)) else {
        return None;
    };
    let (sa, sb) = (&oa.state, &ob.state);
    if !sa.tangible || !sb.tangible {
        return None;
    }
    if states_collide(&mut room.masks, sa, 0.0, 0.0, sb) {
        Some(directions(sa, sb))
    } else {
        None
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
