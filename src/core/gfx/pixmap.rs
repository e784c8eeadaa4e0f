//=========================================================================
// Pixmap
//=========================================================================
//
// Software RGBA pixel buffer shared by sprites, masks and the compositor.
//
// Drawing follows a stamp model:
//   shape → raw pixels on a transparent stamp → blit(stamp, blend) → dest
//
// so a shape with both fill and outline blends as one image.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::color::Color;

//=== BlendMode ===========================================================

/// How source pixels combine with destination pixels.
///
/// `Rgb*` modes leave the destination alpha untouched; `Rgba*` modes
/// apply the same operation to alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Regular alpha compositing.
    #[default]
    Normal,
    RgbaAdd,
    RgbaSubtract,
    RgbaMultiply,
    RgbaScreen,
    RgbaMinimum,
    RgbaMaximum,
    RgbAdd,
    RgbSubtract,
    RgbMultiply,
    RgbScreen,
    RgbMinimum,
    RgbMaximum,
}

impl BlendMode {
    fn affects_alpha(self) -> bool {
        matches!(
            self,
            Self::RgbaAdd
                | Self::RgbaSubtract
                | Self::RgbaMultiply
                | Self::RgbaScreen
                | Self::RgbaMinimum
                | Self::RgbaMaximum
        )
    }

    fn channel(self, d: u8, s: u8) -> u8 {
        let (d, s) = (d as u32, s as u32);
        let out = match self {
            Self::Normal => s,
            Self::RgbaAdd | Self::RgbAdd => (d + s).min(255),
            Self::RgbaSubtract | Self::RgbSubtract => d.saturating_sub(s),
            Self::RgbaMultiply | Self::RgbMultiply => (d * s + 255) >> 8,
            Self::RgbaScreen | Self::RgbScreen => {
                let inv = (255 - d) as f64 / 255.0 * ((255 - s) as f64 / 255.0) * 255.0;
                255 - inv as u32
            }
            Self::RgbaMinimum | Self::RgbMinimum => d.min(s),
            Self::RgbaMaximum | Self::RgbMaximum => d.max(s),
        };
        out as u8
    }

    /// Combines one source pixel into one destination pixel.
    pub fn apply(self, dest: Color, src: Color) -> Color {
        if self == Self::Normal {
            return composite_over(dest, src);
        }
        Color {
            red: self.channel(dest.red, src.red),
            green: self.channel(dest.green, src.green),
            blue: self.channel(dest.blue, src.blue),
            alpha: if self.affects_alpha() {
                self.channel(dest.alpha, src.alpha)
            } else {
                dest.alpha
            },
        }
    }
}

fn composite_over(dest: Color, src: Color) -> Color {
    match src.alpha {
        0 => dest,
        255 => src,
        sa => {
            let sa = sa as f64 / 255.0;
            let da = dest.alpha as f64 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let mix = |s: u8, d: u8| {
                ((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a).round() as u8
            };
            Color {
                red: mix(src.red, dest.red),
                green: mix(src.green, dest.green),
                blue: mix(src.blue, dest.blue),
                alpha: (out_a * 255.0).round() as u8,
            }
        }
    }
}

//=== ShapeStyle ==========================================================

/// Fill and outline for shape drawing. Either part may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    pub outline_thickness: u32,
}

impl ShapeStyle {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            outline: None,
            outline_thickness: 1,
        }
    }

    pub fn outlined(color: Color, thickness: u32) -> Self {
        Self {
            fill: None,
            outline: Some(color),
            outline_thickness: thickness.max(1),
        }
    }
}

//=== Pixmap ==============================================================

/// A rectangular RGBA image, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Pixmap {
    //--- Construction -----------------------------------------------------

    /// Creates a fully transparent pixmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub(crate) fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    pub(crate) fn to_rgba_image(&self) -> image::RgbaImage {
        let raw = self.pixels.iter().flat_map(|&c| <[u8; 4]>::from(c)).collect();
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites a pixel. Writes outside the image are dropped.
    pub fn set(&mut self, x: i64, y: i64, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, blend: BlendMode) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend.apply(self.pixels[i], color);
        }
    }

    //--- Raw Fills --------------------------------------------------------

    /// Overwrites a rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i64);
        let y1 = (y + h).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, color);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }

    /// Applies `blend` with a constant color to every pixel.
    pub fn tint(&mut self, color: Color, blend: BlendMode) {
        for p in &mut self.pixels {
            *p = blend.apply(*p, color);
        }
    }

    /// Scales every pixel's alpha by `alpha / 255`.
    pub fn multiply_alpha(&mut self, alpha: u8) {
        if alpha == 255 {
            return;
        }
        for p in &mut self.pixels {
            p.alpha = ((p.alpha as u32 * alpha as u32 + 127) / 255) as u8;
        }
    }

    //--- Blitting ---------------------------------------------------------

    /// Draws `src` with its top-left corner at `(x, y)`.
    ///
    /// Fully transparent source pixels are skipped for every blend mode.
    pub fn blit(&mut self, src: &Pixmap, x: i64, y: i64, blend: BlendMode) {
        for sy in 0..src.height as i64 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width as i64 {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let color = src.pixels[(sy * src.width as i64 + sx) as usize];
                if color.alpha == 0 {
                    continue;
                }
                self.blend_pixel(dx, dy, color, blend);
            }
        }
    }

    //--- Shape Rasterisation ----------------------------------------------

    /// Raw line with a square brush of `thickness` pixels.
    pub fn stroke_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Color, thickness: u32) {
        let t = thickness.max(1) as i64;
        let offset = (t - 1) / 2;
        for (px, py) in line_points(x1, y1, x2, y2) {
            self.fill_rect(px - offset, py - offset, t, t, color);
        }
    }

    fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color, thickness: u32) {
        let t = (thickness.max(1) as i64).min(w.max(0)).min(h.max(0));
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w - t, y, t, h, color);
    }

    fn ellipse_pixels(x: f64, y: f64, w: f64, h: f64) -> impl Iterator<Item = (i64, i64)> {
        let a = w / 2.0;
        let b = h / 2.0;
        let cx = x + a;
        let cy = y + b;
        let (x0, x1) = (x.floor() as i64, (x + w).ceil() as i64);
        let (y0, y1) = (y.floor() as i64, (y + h).ceil() as i64);
        (y0..y1).flat_map(move |py| {
            (x0..x1).filter_map(move |px| {
                if a <= 0.0 || b <= 0.0 {
                    return None;
                }
                let nx = (px as f64 + 0.5 - cx) / a;
                let ny = (py as f64 + 0.5 - cy) / b;
                (nx * nx + ny * ny <= 1.0).then_some((px, py))
            })
        })
    }

    fn fill_ellipse(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        for (px, py) in Self::ellipse_pixels(x, y, w, h) {
            self.set(px, py, color);
        }
    }

    fn stroke_ellipse(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, thickness: u32) {
        let t = thickness.max(1) as f64;
        let inner: std::collections::HashSet<(i64, i64)> =
            Self::ellipse_pixels(x + t, y + t, w - 2.0 * t, h - 2.0 * t).collect();
        for (px, py) in Self::ellipse_pixels(x, y, w, h) {
            if !inner.contains(&(px, py)) {
                self.set(px, py, color);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

        for py in min_y.max(0)..max_y.min(self.height as i64) {
            let scan = py as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= scan && by > scan) || (by <= scan && ay > scan) {
                    crossings.push(ax + (scan - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let start = (pair[0] - 0.5).ceil() as i64;
                let end = (pair[1] - 0.5).floor() as i64;
                for px in start..=end {
                    self.set(px, py, color);
                }
            }
        }
    }

    //--- Blended Shape Drawing --------------------------------------------

    /// Stamps a shape onto a same-sized transparent layer, then blends it.
    fn draw_stamped(&mut self, blend: BlendMode, draw: impl FnOnce(&mut Pixmap)) {
        let mut stamp = Pixmap::new(self.width, self.height);
        draw(&mut stamp);
        self.blit(&stamp, 0, 0, blend);
    }

    pub fn draw_line(
        &mut self,
        (x1, y1): (i64, i64),
        (x2, y2): (i64, i64),
        color: Color,
        thickness: u32,
        blend: BlendMode,
    ) {
        self.draw_stamped(blend, |s| s.stroke_line(x1, y1, x2, y2, color, thickness));
    }

    pub fn draw_rectangle(&mut self, x: i64, y: i64, w: i64, h: i64, style: ShapeStyle, blend: BlendMode) {
        self.draw_stamped(blend, |s| {
            if let Some(fill) = style.fill {
                s.fill_rect(x, y, w, h, fill);
            }
            if let Some(outline) = style.outline {
                s.stroke_rect(x, y, w, h, outline, style.outline_thickness);
            }
        });
    }

    pub fn draw_ellipse(&mut self, x: f64, y: f64, w: f64, h: f64, style: ShapeStyle, blend: BlendMode) {
        self.draw_stamped(blend, |s| {
            if let Some(fill) = style.fill {
                s.fill_ellipse(x, y, w, h, fill);
            }
            if let Some(outline) = style.outline {
                s.stroke_ellipse(x, y, w, h, outline, style.outline_thickness);
            }
        });
    }

    pub fn draw_polygon(&mut self, points: &[(f64, f64)], style: ShapeStyle, blend: BlendMode) {
        self.draw_stamped(blend, |s| {
            if let Some(fill) = style.fill {
                s.fill_polygon(points, fill);
            }
            if let Some(outline) = style.outline {
                for i in 0..points.len() {
                    let (ax, ay) = points[i];
                    let (bx, by) = points[(i + 1) % points.len()];
                    s.stroke_line(
                        ax.round() as i64,
                        ay.round() as i64,
                        bx.round() as i64,
                        by.round() as i64,
                        outline,
                        style.outline_thickness,
                    );
                }
            }
        });
    }

    //--- Transforms -------------------------------------------------------

    pub fn flipped(&self, horizontal: bool, vertical: bool) -> Pixmap {
        let (w, h) = (self.width as i64, self.height as i64);
        let mut out = Pixmap::new(self.width, self.height);
        for y in 0..h {
            for x in 0..w {
                let sx = if horizontal { w - 1 - x } else { x };
                let sy = if vertical { h - 1 - y } else { y };
                if let Some(c) = self.get(sx, sy) {
                    out.set(x, y, c);
                }
            }
        }
        out
    }

    /// Nearest-neighbour scale to an exact size.
    pub fn scaled(&self, width: u32, height: u32) -> Pixmap {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Pixmap::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height as i64 {
            let sy = ((y as f64 + 0.5) * self.height as f64 / height as f64) as i64;
            for x in 0..width as i64 {
                let sx = ((x as f64 + 0.5) * self.width as f64 / width as f64) as i64;
                let sx = sx.min(self.width as i64 - 1);
                let sy = sy.min(self.height as i64 - 1);
                if let Some(c) = self.get(sx, sy) {
                    out.set(x, y, c);
                }
            }
        }
        out
    }

    /// Size of the image after a clockwise rotation by `degrees`.
    pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
        match quarter_turns(degrees) {
            Some(0) | Some(2) => (width, height),
            Some(_) => (height, width),
            None => {
                let (s, c) = degrees.to_radians().sin_cos();
                let (w, h) = (width as f64, height as f64);
                let nw = (w * c.abs() + h * s.abs() - 1e-9).ceil().max(1.0);
                let nh = (w * s.abs() + h * c.abs() - 1e-9).ceil().max(1.0);
                (nw as u32, nh as u32)
            }
        }
    }

    /// Rotates clockwise by `degrees`, growing the image to fit.
    pub fn rotated(&self, degrees: f64) -> Pixmap {
        let (w, h) = (self.width as i64, self.height as i64);
        let (nw, nh) = Self::rotated_size(self.width, self.height, degrees);
        let mut out = Pixmap::new(nw, nh);

        match quarter_turns(degrees) {
            Some(0) => return self.clone(),
            Some(turns) => {
                for dy in 0..nh as i64 {
                    for dx in 0..nw as i64 {
                        let (sx, sy) = match turns {
                            1 => (dy, h - 1 - dx),
                            2 => (w - 1 - dx, h - 1 - dy),
                            _ => (w - 1 - dy, dx),
                        };
                        if let Some(c) = self.get(sx, sy) {
                            out.set(dx, dy, c);
                        }
                    }
                }
            }
            None => {
                let (s, c) = degrees.to_radians().sin_cos();
                for dy in 0..nh as i64 {
                    for dx in 0..nw as i64 {
                        let u = dx as f64 + 0.5 - nw as f64 / 2.0;
                        let v = dy as f64 + 0.5 - nh as f64 / 2.0;
                        let sx = u * c + v * s + w as f64 / 2.0;
                        let sy = -u * s + v * c + h as f64 / 2.0;
                        if let Some(color) = self.get(sx.floor() as i64, sy.floor() as i64) {
                            out.set(dx, dy, color);
                        }
                    }
                }
            }
        }
        out
    }

    /// Copies the image onto a new canvas, offset by `(dx, dy)`.
    pub fn recanvased(&self, width: u32, height: u32, dx: i64, dy: i64) -> Pixmap {
        let mut out = Pixmap::new(width, height);
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                if let Some(c) = self.get(x, y) {
                    out.set(x + dx, y + dy, c);
                }
            }
        }
        out
    }
}

//=== Helpers =============================================================

/// Number of clockwise quarter turns if `degrees` is a multiple of 90.
fn quarter_turns(degrees: f64) -> Option<u8> {
    let turns = degrees / 90.0;
    if (turns - turns.round()).abs() < 1e-9 {
        Some((turns.round() as i64).rem_euclid(4) as u8)
    } else {
        None
    }
}

/// Bresenham line points, endpoints included.
pub(crate) fn line_points(x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<(i64, i64)> {
    let dx = (x2 - x1).abs();
    let dy = -(y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let (mut x, mut y) = (x1, y1);
    let mut err = dx + dy;
    let mut points = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        points.push((x, y));
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

//=========================================================================
// Unit Tests
//=========================================================================
