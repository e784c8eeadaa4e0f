//=========================================================================
// Backgrounds
//=========================================================================
//
// A room background is a fill color plus layers of (possibly tiled,
// possibly animated) sprites drawn behind or between objects by z.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::color::Color;
use super::sprite::Sprite;

//=== BackgroundLayer =====================================================

/// One sprite layer of a background.
///
/// `xscroll_rate`/`yscroll_rate` are factors of the inverse view
/// movement: `1` scrolls with the room, `0` stays fixed on screen.
#[derive(Debug, Clone)]
pub struct BackgroundLayer {
    pub sprite: Arc<Sprite>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xscroll_rate: f64,
    pub yscroll_rate: f64,
    pub repeat_left: bool,
    pub repeat_right: bool,
    pub repeat_up: bool,
    pub repeat_down: bool,

    image_index: usize,
    anim_count: f64,
}

impl BackgroundLayer {
    pub fn new(sprite: Arc<Sprite>, x: f64, y: f64, z: f64) -> Self {
        Self {
            sprite,
            x,
            y,
            z,
            xscroll_rate: 1.0,
            yscroll_rate: 1.0,
            repeat_left: false,
            repeat_right: false,
            repeat_up: false,
            repeat_down: false,
            image_index: 0,
            anim_count: 0.0,
        }
    }

    pub fn with_scroll_rates(mut self, xscroll_rate: f64, yscroll_rate: f64) -> Self {
        self.xscroll_rate = xscroll_rate;
        self.yscroll_rate = yscroll_rate;
        self
    }

    /// Tiles the layer in the given directions.
    pub fn with_repeat(mut self, left: bool, right: bool, up: bool, down: bool) -> Self {
        self.repeat_left = left;
        self.repeat_right = right;
        self.repeat_up = up;
        self.repeat_down = down;
        self
    }

    /// Tiles the layer in every direction.
    pub fn tiled(self) -> Self {
        self.with_repeat(true, true, true, true)
    }

    /// Current animation frame.
    pub fn image_index(&self) -> usize {
        self.image_index
    }

    /// Advances the animation by `time_passed` milliseconds.
    ///
    /// A negative sprite fps plays the frames backwards; zero stops the
    /// animation.
    pub fn update(&mut self, time_passed: f64) {
        let fps = self.sprite.fps;
        if fps == 0.0 || !fps.is_finite() {
            return;
        }
        let frame_time = 1000.0 / fps;
        let frames = self.sprite.frames() as i64;

        self.anim_count += time_passed;
        let advance = (self.anim_count / frame_time).trunc() as i64;
        self.anim_count = self.anim_count.rem_euclid(frame_time.abs());
        self.image_index = (self.image_index as i64 + advance).rem_euclid(frames) as usize;
    }
}

//=== Background ==========================================================

/// Background layers plus the color shown where no layer is drawn.
#[derive(Debug, Clone)]
pub struct Background {
    layers: Vec<BackgroundLayer>,
    pub color: Color,
}

impl Background {
    /// Creates a background; layers are kept sorted by z (stable).
    pub fn new(layers: Vec<BackgroundLayer>, color: Color) -> Self {
        let mut background = Self {
            layers: Vec::with_capacity(layers.len()),
            color,
        };
        for layer in layers {
            background.add_layer(layer);
        }
        background
    }

    /// Inserts a layer after every layer with a lower or equal z.
    pub fn add_layer(&mut self, layer: BackgroundLayer) {
        let index = self.layers.partition_point(|l| l.z <= layer.z);
        self.layers.insert(index, layer);
    }

    pub fn layers(&self) -> &[BackgroundLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [BackgroundLayer] {
        &mut self.layers
    }

    pub(crate) fn update(&mut self, time_passed: f64) {
        for layer in &mut self.layers {
            layer.update(time_passed);
        }
    }
}

impl Default for Background {
    /// No layers on black.
    fn default() -> Self {
        Self::new(Vec::new(), Color::BLACK)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn animated(frames: usize, fps: f64) -> Arc<Sprite> {
        let mut sprite = Sprite::new(4, 4).with_fps(fps);
        for _ in 1..frames {
            sprite.append_frame();
        }
        Arc::new(sprite)
    }

    #[test]
    fn animation_advances_and_wraps() {
        let mut layer = BackgroundLayer::new(animated(3, 10.0), 0.0, 0.0, 0.0);
        layer.update(150.0);
        assert_eq!(layer.image_index(), 1);
        layer.update(150.0);
        assert_eq!(layer.image_index(), 0);
    }

    #[test]
    fn negative_fps_runs_backwards() {
        let mut layer = BackgroundLayer::new(animated(4, -10.0), 0.0, 0.0, 0.0);
        layer.update(100.0);
        assert_eq!(layer.image_index(), 3);
    }

    #[test]
    fn zero_fps_does_not_animate() {
        let mut layer = BackgroundLayer::new(animated(2, 0.0), 0.0, 0.0, 0.0);
        layer.update(10_000.0);
        assert_eq!(layer.image_index(), 0);
    }

    #[test]
    fn layers_sorted_by_z_keeping_insertion_order() {
        let sprite = animated(1, 0.0);
        let background = Background::new(
            vec![
                BackgroundLayer::new(sprite.clone(), 1.0, 0.0, 5.0),
                BackgroundLayer::new(sprite.clone(), 2.0, 0.0, -1.0),
                BackgroundLayer::new(sprite, 3.0, 0.0, 5.0),
            ],
            Color::BLUE,
        );
        let xs: Vec<f64> = background.layers().iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![2.0, 1.0, 3.0]);
    }
}
