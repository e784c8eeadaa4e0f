//=========================================================================
// Room Rendering
//=========================================================================
//
// Turns the current state of a room into per-view display lists.
//
// Flow (per view):
//   background layers (tiled) ─┐
//   visible objects in view   ─┼─> stable z sort ─> ViewFrame
//   room projections          ─┘
//
// Everything is positioned in room coordinates first, then shifted by
// the view position.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::{Room, RoomKey, View};
use crate::core::cache::TtlCache;
use crate::core::gfx::{sort_by_z, BackgroundLayer, BlendMode, DrawCommand, Pixmap, Sprite, ViewFrame};
use crate::core::object::ObjectState;

//=== Image Cache =========================================================

/// Identifies a transformed sprite frame in the image cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ImageKey {
    sprite: (u64, u64),
    frame: usize,
    xscale: u64,
    yscale: u64,
    rotation: u64,
    alpha: u8,
    blend: Option<(u32, BlendMode)>,
}

pub(crate) type ImageCache = TtlCache<ImageKey, Arc<Pixmap>>;

/// A transformed sprite frame, generated once and reused while in use.
#[allow(clippy::too_many_arguments)]
pub(crate) fn cached_image(
    cache: &mut ImageCache,
    sprite: &Sprite,
    frame: usize,
    xscale: f64,
    yscale: f64,
    rotation: f64,
    alpha: u8,
    blend: Option<(crate::core::gfx::Color, BlendMode)>,
) -> Arc<Pixmap> {
    let key = ImageKey {
        sprite: sprite.cache_key(),
        frame,
        xscale: xscale.to_bits(),
        yscale: yscale.to_bits(),
        rotation: rotation.to_bits(),
        alpha,
        blend: blend.map(|(c, m)| (c.to_int(), m)),
    };
    cache.get_or_insert_with(key, || {
        Arc::new(sprite.image(frame, xscale, yscale, rotation, alpha, blend))
    })
}

//=== Background Tiling ===================================================

/// Top-left corners of every copy of a layer that may be visible, in
/// view coordinates.
///
/// `x`/`y` is the layer position on the view. Repeating layers are
/// moved to their first visible copy, then tiled across the view.
pub(crate) fn layer_positions(
    layer: &BackgroundLayer,
    x: f64,
    y: f64,
    img_w: f64,
    img_h: f64,
    view_w: f64,
    view_h: f64,
) -> Vec<(f64, f64)> {
    let xs = axis_positions(x, img_w, view_w, layer.repeat_left, layer.repeat_right);
    let ys = axis_positions(y, img_h, view_h, layer.repeat_up, layer.repeat_down);

    let mut positions = Vec::with_capacity(xs.len() * ys.len());
    for &py in &ys {
        for &px in &xs {
            positions.push((px, py));
        }
    }
    positions
}

/// Tile positions along one axis. `back` repeats towards negative
/// coordinates, `forward` towards positive ones.
fn axis_positions(pos: f64, size: f64, view: f64, back: bool, forward: bool) -> Vec<f64> {
    let size = size.max(1.0);
    let mut pos = pos;
    if forward && (back || pos < 0.0) {
        pos = pos.rem_euclid(size) - size;
    } else if back && pos + size > view {
        pos = pos.rem_euclid(size) + size * (view / size).ceil();
    }

    let step = size as i64;
    if forward && (back || pos < view) {
        let end = (view + size) as i64;
        (pos as i64..end).step_by(step as usize).map(|p| p as f64).collect()
    } else if back && pos + size > 0.0 {
        let mut out = Vec::new();
        let mut p = pos as i64;
        while p > -step {
            out.push(p as f64);
            p -= step;
        }
        out
    } else {
        vec![pos]
    }
}

//=== Frame Building ======================================================

/// Whether an object's image rectangle touches the view.
fn in_view(view: &View, x: f64, y: f64, w: f64, h: f64) -> bool {
    x + w >= view.x() && x <= view.x() + view.width() && y + h >= view.y() && y <= view.y() + view.height()
}

fn object_command(state: &ObjectState, sprite: &Sprite, view: &View, images: &mut ImageCache) -> Option<DrawCommand> {
    let blend = state.image_blend.map(|c| (c, state.image_blend_mode));
    let image = cached_image(
        images,
        sprite,
        state.image_index(),
        state.image_xscale,
        state.image_yscale,
        state.image_rotation,
        state.image_alpha,
        blend,
    );

    let (ox, oy) = state.image_origin();
    let (w, h) = (image.width() as f64, image.height() as f64);
    if !in_view(view, state.x - ox, state.y - oy, w, h) {
        return None;
    }
    let (x, y) = state.image_position();
    Some(DrawCommand::new(image, x, y, state.z))
}

/// Display list of one view: background layers, visible objects and
/// room projections, sorted by z and shifted into view coordinates.
pub(crate) fn build_view<R: RoomKey>(room: &mut Room<R>, view: &View, images: &mut ImageCache) -> ViewFrame {
    let (view_x, view_y) = (view.x(), view.y());
    let (view_w, view_h) = (view.width(), view.height());
    let vx = view_x - room.background_x;
    let vy = view_y - room.background_y;

    let mut commands = Vec::new();

    for layer in room.background.layers() {
        let frame = layer.image_index();
        let image = cached_image(images, &layer.sprite, frame, 1.0, 1.0, 0.0, 255, None);
        let x = layer.x - vx * layer.xscroll_rate - layer.sprite.origin_x;
        let y = layer.y - vy * layer.yscroll_rate - layer.sprite.origin_y;
        let (img_w, img_h) = (image.width() as f64, image.height() as f64);

        for (px, py) in layer_positions(layer, x, y, img_w, img_h, view_w, view_h) {
            commands.push(DrawCommand::new(Arc::clone(&image), px + view_x, py + view_y, layer.z));
        }
    }

    for id in room.objects_at(view_x, view_y, view_w, view_h) {
        let Some(object) = room.objects.get(&id) else {
            continue;
        };
        let state = &object.state;
        if !state.visible {
            continue;
        }
        let Some(sprite) = state.sprite() else {
            continue;
        };
        if let Some(cmd) = object_command(state, sprite, view, images) {
            commands.push(cmd);
        }
    }

    commands.extend(room.projections().iter().cloned());
    sort_by_z(&mut commands);
    for cmd in &mut commands {
        cmd.x -= view_x;
        cmd.y -= view_y;
    }

    ViewFrame {
        xport: view.xport,
        yport: view.yport,
        width: view_w.max(0.0).round() as u32,
        height: view_h.max(0.0).round() as u32,
        wport: view.wport().max(0.0).round() as u32,
        hport: view.hport().max(0.0).round() as u32,
        background: room.background.color,
        commands,
    }
}

/// Display lists of every view of the room. Room projections are
/// consumed.
pub(crate) fn build_views<R: RoomKey>(room: &mut Room<R>, images: &mut ImageCache) -> Vec<ViewFrame> {
    let views = room.views().to_vec();
    let frames = views.iter().map(|view| build_view(room, view, images)).collect();
    room.clear_projections();
    frames
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gfx::{Background, Color};
    use crate::core::object::Object;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestRoom {
        Main,
    }

    impl RoomKey for TestRoom {}

    fn images() -> ImageCache {
        ImageCache::new(1000.0)
    }

    fn square(size: u32, color: Color) -> Arc<Sprite> {
        Arc::new(Sprite::from_pixmap(Pixmap::filled(size, size, color)))
    }

    //=====================================================================
    // Tiling
    //=====================================================================

    #[test]
    fn single_layer_is_drawn_once() {
        assert_eq!(axis_positions(10.0, 20.0, 100.0, false, false), vec![10.0]);
    }

    #[test]
    fn forward_repeat_covers_view() {
        assert_eq!(axis_positions(30.0, 40.0, 100.0, false, true), vec![30.0, 70.0, 110.0]);
    }

    #[test]
    fn full_repeat_starts_before_view() {
        assert_eq!(
            axis_positions(30.0, 40.0, 100.0, true, true),
            vec![-10.0, 30.0, 70.0, 110.0]
        );
    }

    #[test]
    fn backward_repeat_walks_left() {
        assert_eq!(axis_positions(30.0, 40.0, 100.0, true, false), vec![30.0, -10.0]);
    }

    //=====================================================================
    // Views
    //=====================================================================

    #[test]
    fn objects_are_shifted_into_view_and_sorted() {
        let mut room: Room<TestRoom> = Room::new(400.0, 400.0)
            .with_views(vec![View::new(100.0, 100.0).with_size(100.0, 100.0)]);
        let front = ObjectState::new(120.0, 130.0).with_sprite(square(4, Color::RED)).with_z(5.0);
        let back = ObjectState::new(150.0, 150.0).with_sprite(square(4, Color::BLUE));
        let hidden = ObjectState::new(10.0, 10.0).with_sprite(square(4, Color::LIME));
        room.add(Object::new(front, ()));
        room.add(Object::new(back, ()));
        room.add(Object::new(hidden, ()));

        let frames = build_views(&mut room, &mut images());
        let cmds = &frames[0].commands;
        assert_eq!(cmds.len(), 2);
        assert_eq!((cmds[0].x, cmds[0].y, cmds[0].z), (50.0, 50.0, 0.0));
        assert_eq!((cmds[1].x, cmds[1].y, cmds[1].z), (20.0, 30.0, 5.0));
    }

    #[test]
    fn invisible_objects_are_skipped() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0)
            .with_views(vec![View::new(0.0, 0.0).with_size(100.0, 100.0)]);
        let mut state = ObjectState::new(10.0, 10.0).with_sprite(square(4, Color::RED));
        state.visible = false;
        room.add(Object::new(state, ()));

        assert!(build_views(&mut room, &mut images())[0].commands.is_empty());
    }

    #[test]
    fn projections_last_one_frame() {
        let mut room: Room<TestRoom> = Room::new(100.0, 100.0)
            .with_views(vec![View::new(0.0, 0.0).with_size(50.0, 50.0)]);
        room.project_dot(5.0, 5.0, 0.0, Color::WHITE);

        let mut cache = images();
        assert_eq!(build_views(&mut room, &mut cache)[0].commands.len(), 1);
        assert!(build_views(&mut room, &mut cache)[0].commands.is_empty());
    }

    #[test]
    fn background_layer_scrolls_with_view() {
        let layer = BackgroundLayer::new(square(10, Color::RED), 0.0, 0.0, -1.0).with_scroll_rates(0.5, 1.0);
        let mut room: Room<TestRoom> = Room::new(200.0, 200.0)
            .with_views(vec![View::new(40.0, 0.0).with_size(50.0, 50.0)])
            .with_background(Background::new(vec![layer], Color::BLACK));

        let frames = build_views(&mut room, &mut images());
        let frame = &frames[0];
        assert_eq!(frame.background, Color::BLACK);
        assert_eq!(frame.commands.len(), 1);
        assert_eq!((frame.commands[0].x, frame.commands[0].y), (-20.0, 0.0));
    }
}
