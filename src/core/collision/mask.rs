//=========================================================================
// Collision Mask
//=========================================================================
//
// Boolean pixel grid indexed as (x, y). A set pixel counts for
// collision. Masks come from shapes (rectangle, ellipse, circle, line)
// or from the opaque pixels of a sprite frame.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::gfx::pixmap::{line_points, Pixmap};

//=== Mask ================================================================

/// A collision mask. `get(x, y)` is `false` outside the mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    //--- Construction -----------------------------------------------------

    /// Creates an empty (all unset) mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// A rectangle with every pixel set.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// An ellipse filling a `width × height` box.
    ///
    /// Pixel `(x, y)` is set when `((x-a)/a)² + ((y-b)/b)² <= 1` with
    /// `a = width/2` and `b = height/2`.
    pub fn ellipse(width: usize, height: usize) -> Self {
        let mut mask = Self::new(width, height);
        let a = width as f64 / 2.0;
        let b = height as f64 / 2.0;
        if a <= 0.0 || b <= 0.0 {
            return mask;
        }
        for y in 0..height {
            for x in 0..width {
                let nx = (x as f64 - a) / a;
                let ny = (y as f64 - b) / b;
                if nx * nx + ny * ny <= 1.0 {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// A circle of `radius` inside a `2r × 2r` box.
    pub fn circle(radius: f64) -> Self {
        let diameter = (radius * 2.0).max(0.0) as usize;
        let mut mask = Self::new(diameter, diameter);
        for y in 0..diameter {
            for x in 0..diameter {
                let dx = x as f64 - radius;
                let dy = y as f64 - radius;
                if dx * dx + dy * dy <= radius * radius {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// A one-pixel line from `(x1, y1)` to `(x2, y2)` inside a
    /// `width × height` box.
    pub fn line(x1: i64, y1: i64, x2: i64, y2: i64, width: usize, height: usize) -> Self {
        let mut mask = Self::new(width, height);
        for (x, y) in line_points(x1, y1, x2, y2) {
            if x >= 0 && y >= 0 {
                mask.set(x as usize, y as usize, true);
            }
        }
        mask
    }

    /// Sets every pixel whose alpha is above zero.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let (w, h) = (pixmap.width() as usize, pixmap.height() as usize);
        Self {
            width: w,
            height: h,
            bits: pixmap.pixels().iter().map(|c| c.alpha > 0).collect(),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
