//=========================================================================
// Tile Grid
//=========================================================================
//
// A grid of sprites drawn as one image. Tiles are stored in sections of
// `section_length` tiles; how a section maps to the screen depends on
// the render method.
//
//   Orthogonal: section j is row j, tile i sits at
//               (i * tile_width, j * tile_height).
//   Isometric:  section j is a half-height row, tile i sits at
//               (i * tile_width + odd(j) * tile_width / 2,
//                j * tile_height / 2).
//
// Later tiles are drawn over earlier ones. Only the first frame of each
// tile sprite is used and the tile's own origin is ignored.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::pixmap::{BlendMode, Pixmap};
use super::sprite::Sprite;

//=== Render Method =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMethod {
    #[default]
    Orthogonal,
    Isometric,
}

//=== Tile Grid ===========================================================

/// A grid of tile sprites that renders to a single sprite.
///
/// `None` leaves a cell empty.
#[derive(Debug, Clone)]
pub struct TileGrid {
    pub tiles: Vec<Option<Arc<Sprite>>>,
    pub render_method: RenderMethod,
    pub section_length: usize,
    pub tile_width: u32,
    pub tile_height: u32,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl TileGrid {
    pub fn new(tiles: Vec<Option<Arc<Sprite>>>, section_length: usize, tile_width: u32, tile_height: u32) -> Self {
        Self {
            tiles,
            render_method: RenderMethod::Orthogonal,
            section_length: section_length.max(1),
            tile_width,
            tile_height,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn with_render_method(mut self, method: RenderMethod) -> Self {
        self.render_method = method;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Number of sections, counting a trailing partial one.
    pub fn sections(&self) -> usize {
        self.tiles.len().div_ceil(self.section_length.max(1))
    }

    pub fn width(&self) -> u32 {
        let full = self.section_length as u32 * self.tile_width;
        match self.render_method {
            RenderMethod::Orthogonal => full,
            RenderMethod::Isometric => full + self.tile_width / 2,
        }
    }

    pub fn height(&self) -> u32 {
        let sections = self.sections() as u32;
        match self.render_method {
            RenderMethod::Orthogonal => sections * self.tile_height,
            RenderMethod::Isometric => {
                let half = self.tile_height / 2;
                sections * half + half
            }
        }
    }

    /// Top-left corner of tile `index` relative to the grid.
    pub fn tile_position(&self, index: usize) -> (i64, i64) {
        let len = self.section_length.max(1);
        let (i, j) = ((index % len) as i64, (index / len) as i64);
        let (w, h) = (self.tile_width as i64, self.tile_height as i64);
        match self.render_method {
            RenderMethod::Orthogonal => (i * w, j * h),
            RenderMethod::Isometric => (i * w + (j % 2) * (w / 2), j * (h / 2)),
        }
    }

    //--- Rendering --------------------------------------------------------

    /// Draws every tile onto `dest` with the grid's top-left at `(x, y)`.
    pub fn draw_onto(&self, dest: &mut Pixmap, x: i64, y: i64, blend: BlendMode) {
        for (index, tile) in self.tiles.iter().enumerate() {
            let Some(sprite) = tile else { continue };
            let (tx, ty) = self.tile_position(index);
            if let Ok(image) = sprite.frame(0) {
                dest.blit(image, x + tx, y + ty, blend);
            }
        }
    }

    /// Renders the whole grid into a one-frame sprite of exactly
    /// `width() x height()` pixels with the grid's origin.
    pub fn render(&self) -> Sprite {
        let (w, h) = (self.width(), self.height());
        debug!("Rendering {} tiles into a {}x{} sprite", self.tiles.len(), w, h);
        let mut canvas = Pixmap::new(w, h);
        self.draw_onto(&mut canvas, 0, 0, BlendMode::Normal);
        Sprite::from_pixmap(canvas).with_origin(self.origin_x, self.origin_y)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
