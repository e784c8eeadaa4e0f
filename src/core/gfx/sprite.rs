//=========================================================================
// Sprite
//=========================================================================
//
// Animated image: one or more equally sized RGBA frames plus the
// suggested origin, bounding box and animation rate objects use.
//
// Architecture:
//   frames: Vec<Pixmap> ──image()──> transformed Pixmap (render)
//                       └─precise_mask()──> Mask (collision)
//
// Every mutation bumps `revision`; (id, revision) keys the caches of
// transformed images and masks. A clone is a new sprite with a new id.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

//=== Internal Dependencies ===============================================

use super::color::Color;
use super::font::{Font, TextStyle};
use super::pixmap::{BlendMode, Pixmap, ShapeStyle};
use crate::core::collision::Mask;
use crate::error::{Result, SgeError};

//=== Sprite Identity =====================================================

static NEXT_SPRITE_ID: AtomicU64 = AtomicU64::new(1);

fn next_sprite_id() -> u64 {
    NEXT_SPRITE_ID.fetch_add(1, Ordering::Relaxed)
}

//=== Sprite ==============================================================

/// An animated image with suggested origin, bounding box and frame rate.
///
/// # Examples
///
/// ```
/// use sge::core::gfx::{Color, ShapeStyle, Sprite};
///
/// let mut ball = Sprite::new(16, 16).with_origin(8.0, 8.0);
/// ball.draw_circle(8.0, 8.0, 8.0, ShapeStyle::filled(Color::RED), None, Default::default());
///
/// assert_eq!(ball.bbox_x, -8.0);
/// assert_eq!(ball.get_pixel(8, 8, 0), Some(Color::RED));
/// ```
#[derive(Debug)]
pub struct Sprite {
    width: u32,
    height: u32,
    frames: Vec<Pixmap>,

    /// Suggested horizontal origin, relative to the left edge.
    pub origin_x: f64,

    /// Suggested vertical origin, relative to the top edge.
    pub origin_y: f64,

    /// Suggested animation rate in frames per second.
    pub fps: f64,

    /// When `false`, frames render fully opaque regardless of alpha.
    pub transparent: bool,

    pub bbox_x: f64,
    pub bbox_y: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,

    id: u64,
    revision: u64,
}

impl Sprite {
    //--- Construction -----------------------------------------------------

    /// Creates a sprite with one blank (transparent) frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_pixmap(Pixmap::new(width, height))
    }

    /// Wraps a single pixmap as a one-frame sprite.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        let (width, height) = (pixmap.width(), pixmap.height());
        Self {
            width,
            height,
            frames: vec![pixmap],
            origin_x: 0.0,
            origin_y: 0.0,
            fps: 60.0,
            transparent: true,
            bbox_x: 0.0,
            bbox_y: 0.0,
            bbox_width: width as f64,
            bbox_height: height as f64,
            id: next_sprite_id(),
            revision: 0,
        }
    }

    /// Builds a sprite from several frames. Frames are scaled to the
    /// size of the first one.
    pub fn from_frames(frames: Vec<Pixmap>) -> Result<Self> {
        let mut iter = frames.into_iter();
        let first = iter.next().ok_or(SgeError::FrameOutOfRange { index: 0, count: 0 })?;
        let mut sprite = Self::from_pixmap(first);
        let (w, h) = (sprite.width, sprite.height);
        sprite.frames.extend(iter.map(|f| f.scaled(w, h)));
        Ok(sprite)
    }

    /// Loads a PNG, JPEG or BMP file as a one-frame sprite.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading sprite from {}", path.display());
        let img = image::open(path)?.to_rgba8();
        Ok(Self::from_pixmap(Pixmap::from_rgba_image(&img)))
    }

    /// Loads a horizontal strip and splits it into `frames` frames.
    pub fn from_strip(path: impl AsRef<Path>, frames: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading {}-frame sprite strip from {}", frames, path.display());
        let img = image::open(path)?.to_rgba8();
        Self::split_strip(&Pixmap::from_rgba_image(&img), frames)
    }

    /// Loads a grid of equally sized tiles, one frame per tile, ordered
    /// left to right and then top to bottom.
    ///
    /// `(x, y)` is the top-left tile; `xsep`/`ysep` is the gap between
    /// columns and rows.
    #[allow(clippy::too_many_arguments)]
    pub fn from_tileset(
        path: impl AsRef<Path>,
        x: i64,
        y: i64,
        columns: usize,
        rows: usize,
        xsep: i64,
        ysep: i64,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading {}x{} tileset from {}", columns, rows, path.display());
        let img = image::open(path)?.to_rgba8();
        Self::cut_tileset(&Pixmap::from_rgba_image(&img), x, y, columns, rows, xsep, ysep, width, height)
    }

    #[allow(clippy::too_many_arguments)]
    fn cut_tileset(
        tileset: &Pixmap,
        x: i64,
        y: i64,
        columns: usize,
        rows: usize,
        xsep: i64,
        ysep: i64,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let tiles = (0..rows as i64)
            .flat_map(|i| (0..columns as i64).map(move |j| (i, j)))
            .map(|(i, j)| {
                let tx = x + (width as i64 + xsep) * j;
                let ty = y + (height as i64 + ysep) * i;
                tileset.recanvased(width, height, -tx, -ty)
            })
            .collect();
        Self::from_frames(tiles)
    }

    /// Renders `text` into a new one-frame sprite exactly the size of the
    /// text box. The origin sits where `style`'s alignment anchors it.
    pub fn from_text(font: &Font, text: &str, style: &TextStyle) -> Self {
        let block = font.render_box(text, style);
        let (w, h) = (block.width() as i64, block.height() as i64);
        let origin_x = -style.halign.offset(w) as f64;
        let origin_y = -style.valign.offset(h) as f64;
        Self::from_pixmap(block).with_origin(origin_x, origin_y)
    }

    fn split_strip(strip: &Pixmap, frames: usize) -> Result<Self> {
        let width = strip.width();
        if frames == 0 || width as usize % frames != 0 {
            return Err(SgeError::InvalidStrip { width, frames });
        }
        let frame_width = width / frames as u32;
        let pieces = (0..frames as i64)
            .map(|i| {
                strip.recanvased(frame_width, strip.height(), -(i * frame_width as i64), 0)
            })
            .collect();
        Self::from_frames(pieces)
    }

    /// Sets the origin and moves the default bounding box with it.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self.bbox_x = -x;
        self.bbox_y = -y;
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_bbox(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bbox_x = x;
        self.bbox_y = y;
        self.bbox_width = width;
        self.bbox_height = height;
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frames (always at least one).
    pub fn frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Result<&Pixmap> {
        self.frames.get(index).ok_or(SgeError::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })
    }

    /// Animation rate as a factor of the game frame rate.
    pub fn speed(&self, game_fps: f64) -> f64 {
        self.fps / game_fps
    }

    pub fn set_speed(&mut self, speed: f64, game_fps: f64) {
        self.fps = speed * game_fps;
    }

    /// Identity and revision, used as a cache key.
    pub fn cache_key(&self) -> (u64, u64) {
        (self.id, self.revision)
    }

    pub fn get_pixel(&self, x: i64, y: i64, frame: usize) -> Option<Color> {
        self.frames[frame % self.frames.len()].get(x, y)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn target_frames(&self, frame: Option<usize>) -> std::ops::Range<usize> {
        match frame {
            Some(i) => {
                let i = i % self.frames.len();
                i..i + 1
            }
            None => 0..self.frames.len(),
        }
    }

    fn for_frames(&mut self, frame: Option<usize>, mut f: impl FnMut(&mut Pixmap)) {
        for i in self.target_frames(frame) {
            f(&mut self.frames[i]);
        }
        self.touch();
    }

    //--- Frame Management -------------------------------------------------

    pub fn append_frame(&mut self) {
        self.frames.push(Pixmap::new(self.width, self.height));
        self.touch();
    }

    /// Inserts a blank frame in front of `index`.
    pub fn insert_frame(&mut self, index: usize) -> Result<()> {
        if index > self.frames.len() {
            return Err(SgeError::FrameOutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        self.frames.insert(index, Pixmap::new(self.width, self.height));
        self.touch();
        Ok(())
    }

    /// Deletes a frame. The last remaining frame cannot be deleted.
    pub fn delete_frame(&mut self, index: usize) -> Result<()> {
        if index >= self.frames.len() {
            return Err(SgeError::FrameOutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        if self.frames.len() == 1 {
            return Err(SgeError::LastFrame);
        }
        self.frames.remove(index);
        self.touch();
        Ok(())
    }

    /// Appends the frames of another sprite, scaled to this size.
    pub fn extend(&mut self, other: &Sprite) {
        let (w, h) = (self.width, self.height);
        self.frames.extend(other.frames.iter().map(|f| f.scaled(w, h)));
        self.touch();
    }

    /// One single-frame sprite per frame, sharing this sprite's settings.
    pub fn split_frames(&self) -> Vec<Sprite> {
        self.frames
            .iter()
            .map(|f| Sprite {
                frames: vec![f.clone()],
                id: next_sprite_id(),
                revision: 0,
                ..self.settings_only()
            })
            .collect()
    }

    fn settings_only(&self) -> Sprite {
        Sprite {
            width: self.width,
            height: self.height,
            frames: Vec::new(),
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            fps: self.fps,
            transparent: self.transparent,
            bbox_x: self.bbox_x,
            bbox_y: self.bbox_y,
            bbox_width: self.bbox_width,
            bbox_height: self.bbox_height,
            id: 0,
            revision: 0,
        }
    }

    //--- Drawing ----------------------------------------------------------
    //
    // `frame: None` draws on every frame; `Some(i)` wraps modulo the
    // frame count.
    //

    pub fn draw_dot(&mut self, x: f64, y: f64, color: Color, frame: Option<usize>, blend: BlendMode) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        self.for_frames(frame, |p| p.blend_pixel(x, y, color, blend));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        thickness: u32,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        let a = (x1.round() as i64, y1.round() as i64);
        let b = (x2.round() as i64, y2.round() as i64);
        self.for_frames(frame, |p| p.draw_line(a, b, color, thickness, blend));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_rectangle(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: ShapeStyle,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        let (w, h) = (width.round() as i64, height.round() as i64);
        self.for_frames(frame, |p| p.draw_rectangle(x, y, w, h, style, blend));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_ellipse(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: ShapeStyle,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        self.for_frames(frame, |p| p.draw_ellipse(x, y, width, height, style, blend));
    }

    /// Draws a circle centered on `(x, y)`.
    pub fn draw_circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        style: ShapeStyle,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        let d = radius * 2.0;
        self.draw_ellipse(x - radius, y - radius, d, d, style, frame, blend);
    }

    pub fn draw_polygon(
        &mut self,
        points: &[(f64, f64)],
        style: ShapeStyle,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        self.for_frames(frame, |p| p.draw_polygon(points, style, blend));
    }

    /// Draws frame `image` of `other` with its origin at `(x, y)`.
    pub fn draw_sprite(
        &mut self,
        other: &Sprite,
        image: usize,
        x: f64,
        y: f64,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        let src = other.base_image(image);
        let x = (x - other.origin_x).round() as i64;
        let y = (y - other.origin_y).round() as i64;
        self.for_frames(frame, |p| p.blit(&src, x, y, blend));
    }

    /// Draws `text` anchored at `(x, y)` according to `style`'s
    /// alignment.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        font: &Font,
        text: &str,
        x: f64,
        y: f64,
        style: &TextStyle,
        frame: Option<usize>,
        blend: BlendMode,
    ) {
        let block = font.render_box(text, style);
        let x = x.round() as i64 + style.halign.offset(block.width() as i64);
        let y = y.round() as i64 + style.valign.offset(block.height() as i64);
        self.for_frames(frame, |p| p.blit(&block, x, y, blend));
    }

    /// Makes a rectangle fully transparent.
    pub fn draw_erase(&mut self, x: f64, y: f64, width: f64, height: f64, frame: Option<usize>) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        let (w, h) = (width.round() as i64, height.round() as i64);
        self.for_frames(frame, |p| p.fill_rect(x, y, w, h, Color::TRANSPARENT));
    }

    pub fn draw_clear(&mut self, frame: Option<usize>) {
        self.for_frames(frame, Pixmap::clear);
    }

    //--- Transforms -------------------------------------------------------

    /// Mirrors horizontally.
    pub fn mirror(&mut self, frame: Option<usize>) {
        self.for_frames(frame, |p| *p = p.flipped(true, false));
    }

    /// Flips vertically.
    pub fn flip(&mut self, frame: Option<usize>) {
        self.for_frames(frame, |p| *p = p.flipped(false, true));
    }

    /// Scales every frame to a new size. Destructive.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        for f in &mut self.frames {
            *f = f.scaled(width, height);
        }
        self.width = width;
        self.height = height;
        self.touch();
    }

    /// Scales the frame contents about the origin without changing the
    /// sprite size. Scaling up can crop.
    pub fn scale(&mut self, xscale: f64, yscale: f64, frame: Option<usize>) {
        let (xscale, yscale) = (xscale.abs(), yscale.abs());
        let sw = ((self.width as f64 * xscale) as u32).max(1);
        let sh = ((self.height as f64 * yscale) as u32).max(1);
        let xdiff = (self.origin_x - self.origin_x * xscale) as i64;
        let ydiff = (self.origin_y - self.origin_y * yscale) as i64;
        let (w, h) = (self.width, self.height);
        self.for_frames(frame, |p| *p = p.scaled(sw, sh).recanvased(w, h, xdiff, ydiff));
    }

    /// Resizes by adding or removing empty space. The origin is scaled
    /// with the canvas and frames keep their position relative to it.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        let xscale = width as f64 / self.width.max(1) as f64;
        let yscale = height as f64 / self.height.max(1) as f64;
        let xdiff = (self.origin_x * xscale - self.origin_x) as i64;
        let ydiff = (self.origin_y * yscale - self.origin_y) as i64;
        for f in &mut self.frames {
            *f = f.recanvased(width, height, xdiff, ydiff);
        }
        self.width = width;
        self.height = height;
        self.origin_x *= xscale;
        self.origin_y *= yscale;
        self.touch();
    }

    /// Rotates clockwise about the center.
    ///
    /// With `adaptive_resize` the sprite grows to fit the rotated image
    /// and the origin moves by half the size change; other frames are
    /// re-centered on the new canvas. Otherwise the rotated image is
    /// cropped to the current size.
    pub fn rotate(&mut self, degrees: f64, adaptive_resize: bool, frame: Option<usize>) {
        let (w, h) = (self.width, self.height);
        let (nw, nh) = Pixmap::rotated_size(w, h, degrees);
        let targets = self.target_frames(frame);

        for i in targets.clone() {
            let rotated = self.frames[i].rotated(degrees);
            self.frames[i] = if adaptive_resize {
                rotated
            } else {
                let dx = -((nw as f64 - w as f64) / 2.0) as i64;
                let dy = -((nh as f64 - h as f64) / 2.0) as i64;
                rotated.recanvased(w, h, dx, dy)
            };
        }

        if adaptive_resize {
            let xdiff = (nw as f64 - w as f64) / 2.0;
            let ydiff = (nh as f64 - h as f64) / 2.0;
            self.origin_x += xdiff;
            self.origin_y += ydiff;
            self.width = nw;
            self.height = nh;
            for i in (0..self.frames.len()).filter(|i| !targets.contains(i)) {
                self.frames[i] = self.frames[i].recanvased(nw, nh, xdiff as i64, ydiff as i64);
            }
        }
        self.touch();
    }

    /// Replaces every pixel of one color with another.
    pub fn swap_color(&mut self, old: Color, new: Color, frame: Option<usize>) {
        self.for_frames(frame, |p| {
            for y in 0..p.height() as i64 {
                for x in 0..p.width() as i64 {
                    if p.get(x, y) == Some(old) {
                        p.set(x, y, new);
                    }
                }
            }
        });
    }

    /// Returns an independent copy with a new identity.
    pub fn copy(&self) -> Sprite {
        self.clone()
    }

    /// Saves all frames side by side as one image.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut strip = Pixmap::new(self.width * self.frames.len() as u32, self.height);
        for (i, f) in self.frames.iter().enumerate() {
            strip.blit(f, i as i64 * self.width as i64, 0, BlendMode::Normal);
        }
        strip.to_rgba_image().save(path)?;
        Ok(())
    }

    //--- Rendering --------------------------------------------------------

    /// Frame pixels with the transparency setting applied.
    fn base_image(&self, frame: usize) -> Pixmap {
        let mut img = self.frames[frame % self.frames.len()].clone();
        if !self.transparent {
            img.tint(Color::rgba(0, 0, 0, 255), BlendMode::RgbaMaximum);
        }
        img
    }

    /// Size of `image()` output for the given transform.
    pub fn transformed_size(&self, xscale: f64, yscale: f64, rotation: f64) -> (u32, u32) {
        if xscale == 0.0 || yscale == 0.0 {
            return (1, 1);
        }
        let w = (self.width as f64 * xscale.abs()).round() as u32;
        let h = (self.height as f64 * yscale.abs()).round() as u32;
        if rotation == 0.0 {
            (w, h)
        } else {
            Pixmap::rotated_size(w, h, -rotation)
        }
    }

    fn transformed(&self, frame: usize, xscale: f64, yscale: f64, rotation: f64) -> Pixmap {
        if xscale == 0.0 || yscale == 0.0 {
            return Pixmap::new(1, 1);
        }
        let w = (self.width as f64 * xscale.abs()).round() as u32;
        let h = (self.height as f64 * yscale.abs()).round() as u32;
        let mut img = self
            .base_image(frame)
            .flipped(xscale < 0.0, yscale < 0.0)
            .scaled(w, h);
        if rotation != 0.0 {
            img = img.rotated(-rotation);
        }
        img
    }

    /// Returns a transformed copy of a frame.
    ///
    /// Negative scales flip. `rotation` is counter-clockwise in degrees.
    /// `blend` tints the result with a color (`RgbMultiply` is the usual
    /// mode).
    pub fn image(
        &self,
        frame: usize,
        xscale: f64,
        yscale: f64,
        rotation: f64,
        alpha: u8,
        blend: Option<(Color, BlendMode)>,
    ) -> Pixmap {
        let mut img = self.transformed(frame, xscale, yscale, rotation);
        img.multiply_alpha(alpha);
        if let Some((color, mode)) = blend {
            img.tint(color, mode);
        }
        img
    }

    /// Collision mask of a transformed frame: opaque pixels are set.
    pub fn precise_mask(&self, frame: usize, xscale: f64, yscale: f64, rotation: f64) -> Mask {
        Mask::from_pixmap(&self.transformed(frame, xscale, yscale, rotation))
    }
}

//--- Trait Implementations -----------------------------------------------

impl Clone for Sprite {
    fn clone(&self) -> Self {
        Sprite {
            frames: self.frames.clone(),
            id: next_sprite_id(),
            revision: 0,
            ..self.settings_only()
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::super::font::{HAlign, VAlign};
    use super::*;

    fn solid(w: u32, h: u32, color: Color) -> Sprite {
        Sprite::from_pixmap(Pixmap::filled(w, h, color))
    }

    //=====================================================================
    // Defaults & Frames
    //=====================================================================

    #[test]
    fn defaults() {
        let s = Sprite::new(10, 20).with_origin(2.0, 3.0);
        assert_eq!(s.frames(), 1);
        assert_eq!(s.fps, 60.0);
        assert_eq!((s.bbox_x, s.bbox_y), (-2.0, -3.0));
        assert_eq!((s.bbox_width, s.bbox_height), (10.0, 20.0));
        assert_eq!(s.speed(30.0), 2.0);
    }

    #[test]
    fn frame_management() {
        let mut s = Sprite::new(4, 4);
        s.append_frame();
        s.insert_frame(0).unwrap();
        assert_eq!(s.frames(), 3);
        assert!(matches!(s.insert_frame(9), Err(SgeError::FrameOutOfRange { .. })));

        s.delete_frame(2).unwrap();
        s.delete_frame(0).unwrap();
        assert!(matches!(s.delete_frame(0), Err(SgeError::LastFrame)));
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn strip_is_split_into_frames() {
        let mut strip = Pixmap::new(6, 2);
        strip.set(2, 0, Color::RED);
        strip.set(4, 1, Color::BLUE);
        let s = Sprite::split_strip(&strip, 3).unwrap();
        assert_eq!((s.width(), s.height(), s.frames()), (2, 2, 3));
        assert_eq!(s.get_pixel(0, 0, 1), Some(Color::RED));
        assert_eq!(s.get_pixel(0, 1, 2), Some(Color::BLUE));

        assert!(matches!(
            Sprite::split_strip(&strip, 4),
            Err(SgeError::InvalidStrip { .. })
        ));
    }

    #[test]
    fn clone_gets_new_identity_and_mutation_bumps_revision() {
        let mut s = Sprite::new(2, 2);
        let (id, rev) = s.cache_key();
        assert_ne!(s.clone().cache_key().0, id);

        s.draw_dot(0.0, 0.0, Color::RED, None, BlendMode::Normal);
        assert_eq!(s.cache_key().0, id);
        assert!(s.cache_key().1 > rev);
    }

    //=====================================================================
    // Drawing
    //=====================================================================

    #[test]
    fn drawing_targets_one_or_all_frames() {
        let mut s = Sprite::new(3, 3);
        s.append_frame();
        s.draw_dot(1.0, 1.0, Color::RED, Some(3), BlendMode::Normal);
        assert_eq!(s.get_pixel(1, 1, 1), Some(Color::RED));
        assert_eq!(s.get_pixel(1, 1, 0), Some(Color::TRANSPARENT));

        s.draw_rectangle(0.0, 0.0, 3.0, 3.0, ShapeStyle::filled(Color::BLUE), None, BlendMode::Normal);
        assert_eq!(s.get_pixel(2, 2, 0), Some(Color::BLUE));
        assert_eq!(s.get_pixel(2, 2, 1), Some(Color::BLUE));

        s.draw_erase(0.0, 0.0, 1.0, 1.0, None);
        assert_eq!(s.get_pixel(0, 0, 1), Some(Color::TRANSPARENT));
        s.draw_clear(Some(0));
        assert_eq!(s.get_pixel(2, 2, 0), Some(Color::TRANSPARENT));
        assert_eq!(s.get_pixel(2, 2, 1), Some(Color::BLUE));
    }

    #[test]
    fn draw_sprite_honours_origin() {
        let mut canvas = Sprite::new(10, 10);
        let stamp = solid(2, 2, Color::LIME).with_origin(1.0, 1.0);
        canvas.draw_sprite(&stamp, 0, 5.0, 5.0, None, BlendMode::Normal);
        assert_eq!(canvas.get_pixel(4, 4, 0), Some(Color::LIME));
        assert_eq!(canvas.get_pixel(5, 5, 0), Some(Color::LIME));
        assert_eq!(canvas.get_pixel(6, 6, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn tileset_frames_skip_separators() {
        let mut sheet = Pixmap::new(7, 4);
        sheet.set(1, 1, Color::RED);
        sheet.set(4, 1, Color::BLUE);
        sheet.set(1, 3, Color::LIME);
        let s = Sprite::cut_tileset(&sheet, 1, 1, 2, 2, 1, 0, 2, 2).unwrap();
        assert_eq!((s.width(), s.height(), s.frames()), (2, 2, 4));
        assert_eq!(s.get_pixel(0, 0, 0), Some(Color::RED));
        assert_eq!(s.get_pixel(0, 0, 1), Some(Color::BLUE));
        assert_eq!(s.get_pixel(0, 0, 2), Some(Color::LIME));
        assert_eq!(s.get_pixel(0, 0, 3), Some(Color::TRANSPARENT));
    }

    fn glyph_font() -> Font {
        Font::from_sprite(std::sync::Arc::new(solid(2, 2, Color::WHITE)), "x", 0, 0, 2)
    }

    #[test]
    fn draw_text_anchors_by_alignment() {
        let mut canvas = Sprite::new(10, 10);
        let style = TextStyle::default()
            .with_color(Color::RED)
            .with_align(HAlign::Right, VAlign::Bottom);
        canvas.draw_text(&glyph_font(), "xx", 10.0, 10.0, &style, None, BlendMode::Normal);
        assert_eq!(canvas.get_pixel(6, 8, 0), Some(Color::RED));
        assert_eq!(canvas.get_pixel(9, 9, 0), Some(Color::RED));
        assert_eq!(canvas.get_pixel(5, 9, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn text_sprite_origin_follows_alignment() {
        let style = TextStyle::default().with_align(
            HAlign::Center,
            VAlign::Middle,
        );
        let s = Sprite::from_text(&glyph_font(), "xxx", &style);
        assert_eq!((s.width(), s.height()), (6, 2));
        assert_eq!((s.origin_x, s.origin_y), (3.0, 1.0));
        assert_eq!(s.get_pixel(5, 1, 0), Some(Color::WHITE));
    }

    #[test]
    fn swap_color_replaces_exact_matches() {
        let mut s = solid(2, 1, Color::RED);
        s.draw_dot(1.0, 0.0, Color::BLUE, None, BlendMode::Normal);
        s.swap_color(Color::RED, Color::WHITE, None);
        assert_eq!(s.get_pixel(0, 0, 0), Some(Color::WHITE));
        assert_eq!(s.get_pixel(1, 0, 0), Some(Color::BLUE));
    }

    //=====================================================================
    // Transforms
    //=====================================================================

    #[test]
    fn adaptive_rotation_moves_origin() {
        let mut s = solid(4, 2, Color::WHITE).with_origin(2.0, 1.0);
        s.rotate(90.0, true, None);
        assert_eq!((s.width(), s.height()), (2, 4));
        assert_eq!((s.origin_x, s.origin_y), (1.0, 2.0));
    }

    #[test]
    fn fixed_rotation_keeps_size() {
        let mut s = solid(4, 2, Color::WHITE);
        s.rotate(90.0, false, None);
        assert_eq!((s.width(), s.height()), (4, 2));
        assert_eq!(s.get_pixel(0, 0, 0), Some(Color::TRANSPARENT));
        assert_eq!(s.get_pixel(1, 0, 0), Some(Color::WHITE));
    }

    #[test]
    fn resize_canvas_keeps_content_relative_to_origin() {
        let mut s = solid(2, 2, Color::RED).with_origin(1.0, 1.0);
        s.resize_canvas(4, 4);
        assert_eq!((s.origin_x, s.origin_y), (2.0, 2.0));
        assert_eq!(s.get_pixel(0, 0, 0), Some(Color::TRANSPARENT));
        assert_eq!(s.get_pixel(1, 1, 0), Some(Color::RED));
    }

    #[test]
    fn image_applies_scale_alpha_and_tint() {
        let s = solid(2, 3, Color::WHITE);
        let img = s.image(0, -2.0, 1.0, 0.0, 128, Some((Color::RED, BlendMode::RgbMultiply)));
        assert_eq!((img.width(), img.height()), (4, 3));
        let px = img.get(0, 0).unwrap();
        assert_eq!((px.red, px.green, px.blue, px.alpha), (255, 0, 0, 128));

        assert_eq!(s.transformed_size(1.0, 1.0, 90.0), (3, 2));
        assert_eq!(s.image(0, 0.0, 1.0, 0.0, 255, None).width(), 1);
    }

    #[test]
    fn opaque_sprites_ignore_alpha() {
        let s = Sprite::new(2, 2).with_transparent(false);
        assert_eq!(s.precise_mask(0, 1.0, 1.0, 0.0).count(), 4);
        let s = Sprite::new(2, 2);
        assert_eq!(s.precise_mask(0, 1.0, 1.0, 0.0).count(), 0);
    }
}
