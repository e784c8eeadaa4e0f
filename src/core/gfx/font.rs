//=========================================================================
// Sprite Font
//=========================================================================
//
// Bitmap text built from a sprite whose frames are glyphs.
//
// Architecture:
//   text ──split_text()──> lines ──render_line()──> Pixmap per line
//                                       │
//                                       └──render_box()──> aligned text box
//
// Every glyph is `size` pixels tall and keeps the sprite's aspect ratio.
// A line of n characters measures ((glyph_width + hsep) * n,
// glyph_height + vsep).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::color::Color;
use super::pixmap::{BlendMode, Pixmap};
use super::sprite::Sprite;

//=== Alignment ===========================================================

/// Horizontal placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    /// Offset of the left edge from the anchor for a box `extent` wide.
    pub(crate) fn offset(self, extent: i64) -> i64 {
        match self {
            Self::Left => 0,
            Self::Center => -extent / 2,
            Self::Right => -extent,
        }
    }
}

/// Vertical placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    pub(crate) fn offset(self, extent: i64) -> i64 {
        match self {
            Self::Top => 0,
            Self::Middle => -extent / 2,
            Self::Bottom => -extent,
        }
    }
}

//=== Text Style ==========================================================

/// Layout and coloring for a block of text.
///
/// `width` wraps lines at word boundaries; `height` clips the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color: Color,
    pub halign: HAlign,
    pub valign: VAlign,

    /// Outline color and thickness in pixels. A zero thickness draws
    /// no outline.
    pub outline: Option<(Color, u32)>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            color: Color::WHITE,
            halign: HAlign::Left,
            valign: VAlign::Top,
            outline: None,
        }
    }
}

impl TextStyle {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_box(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn with_outline(mut self, color: Color, thickness: u32) -> Self {
        self.outline = Some((color, thickness));
        self
    }

    fn outline_thickness(&self) -> u32 {
        self.outline.map_or(0, |(_, t)| t)
    }
}

//=== Font ================================================================

/// A font whose glyphs are the frames of a sprite.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sge::core::gfx::{Font, Sprite};
///
/// let glyphs = Arc::new(Sprite::new(4, 8));
/// let font = Font::from_sprite(glyphs, "ab", 1, 2, 16);
///
/// assert_eq!(font.glyph_size(), (8, 16));
/// assert_eq!(font.text_size("aba"), (27, 18));
/// ```
#[derive(Debug, Clone)]
pub struct Font {
    sprite: Arc<Sprite>,
    chars: HashMap<char, usize>,
    size: u32,

    /// Extra horizontal space after every glyph.
    pub hsep: u32,

    /// Extra vertical space after every line.
    pub vsep: u32,
}

impl Font {
    /// Maps the i-th character of `chars` to frame i of `sprite`.
    pub fn from_sprite(sprite: Arc<Sprite>, chars: &str, hsep: u32, vsep: u32, size: u32) -> Self {
        let chars = chars.chars().enumerate().map(|(i, c)| (c, i)).collect();
        Self {
            sprite,
            chars,
            size,
            hsep,
            vsep,
        }
    }

    pub fn sprite(&self) -> &Arc<Sprite> {
        &self.sprite
    }

    /// Glyph height in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Width and height of one glyph.
    pub fn glyph_size(&self) -> (u32, u32) {
        let (w, h) = (self.sprite.width(), self.sprite.height());
        if h == 0 {
            return (self.size, self.size);
        }
        let width = (w as f64 * self.size as f64 / h as f64).round() as u32;
        (width, self.size)
    }

    /// Distance between the tops of consecutive lines.
    pub fn line_size(&self) -> u32 {
        self.size + self.vsep
    }

    /// Size of one line of text, ignoring newlines.
    pub fn text_size(&self, line: &str) -> (u32, u32) {
        let (w, h) = self.glyph_size();
        ((w + self.hsep) * line.chars().count() as u32, h + self.vsep)
    }

    /// Frame for `c`, falling back to the other letter case.
    fn glyph(&self, c: char) -> Option<usize> {
        self.chars.get(&c).copied().or_else(|| {
            let swapped = if c.is_uppercase() {
                c.to_lowercase().next()
            } else {
                c.to_uppercase().next()
            };
            swapped.and_then(|s| self.chars.get(&s).copied())
        })
    }

    //--- Layout -----------------------------------------------------------

    /// Splits `text` into display lines.
    ///
    /// Newlines always split. With a `width`, words are packed greedily
    /// onto each line and words wider than `width` are broken between
    /// characters. A single glyph wider than `width` still gets a line
    /// of its own.
    pub fn split_text(&self, text: &str, width: Option<u32>) -> Vec<String> {
        let Some(width) = width else {
            return text.lines().map(str::to_owned).collect();
        };
        let fits = |s: &str| self.text_size(s).0 <= width;

        let mut out = Vec::new();
        for line in text.lines() {
            if fits(line) {
                out.push(line.to_owned());
                continue;
            }

            let mut words = line.split(' ').peekable();
            while let Some(word) = words.next() {
                let mut current = word.to_owned();
                let mut broken = false;
                while !fits(&current) {
                    broken = true;
                    let mut rest = current.chars();
                    let mut start = String::new();
                    while let Some(c) = rest.clone().next() {
                        start.push(c);
                        if !fits(&start) && start.chars().count() > 1 {
                            start.pop();
                            break;
                        }
                        rest.next();
                    }
                    current = rest.collect();
                    out.push(start);
                }
                if broken && current.is_empty() {
                    continue;
                }

                while let Some(next) = words.peek() {
                    let joined = format!("{current} {next}");
                    if !fits(joined.trim_end()) {
                        break;
                    }
                    current = joined;
                    words.next();
                }
                out.push(current.trim_end().to_owned());
            }
        }
        out
    }

    /// Width of the widest display line, clamped to `width`.
    pub fn get_width(&self, text: &str, width: Option<u32>, _height: Option<u32>) -> u32 {
        let widest = self
            .split_text(text, width)
            .iter()
            .map(|line| self.text_size(line).0)
            .max()
            .unwrap_or(0);
        width.map_or(widest, |w| widest.min(w))
    }

    /// Height of all display lines, clamped to `height`.
    pub fn get_height(&self, text: &str, width: Option<u32>, height: Option<u32>) -> u32 {
        let lines = self.split_text(text, width);
        let total = match lines.last() {
            Some(last) => self.line_size() * (lines.len() as u32 - 1) + self.text_size(last).1,
            None => 0,
        };
        height.map_or(total, |h| total.min(h))
    }

    //--- Rendering --------------------------------------------------------

    /// Renders one line with every glyph tinted by `color`.
    pub fn render_line(&self, line: &str, color: Color) -> Pixmap {
        let (w, h) = self.text_size(line);
        let mut out = Pixmap::new(w, h);
        let (gw, gh) = self.glyph_size();
        let xscale = if self.sprite.width() > 0 { gw as f64 / self.sprite.width() as f64 } else { 1.0 };
        let yscale = if self.sprite.height() > 0 { gh as f64 / self.sprite.height() as f64 } else { 1.0 };

        let advance = (gw + self.hsep) as i64;
        for (i, c) in line.chars().enumerate() {
            if let Some(frame) = self.glyph(c) {
                let glyph = self.sprite.image(frame, xscale, yscale, 0.0, 255, Some((color, BlendMode::RgbaMultiply)));
                out.blit(&glyph, i as i64 * advance, 0, BlendMode::Normal);
            }
        }
        out
    }

    /// Renders `text` into a box laid out by `style`.
    ///
    /// The box is the measured text size plus the outline thickness on
    /// every side. Lines are aligned horizontally inside the box and the
    /// whole block is aligned vertically when `style.height` clips it.
    pub fn render_box(&self, text: &str, style: &TextStyle) -> Pixmap {
        let t = style.outline_thickness();
        let lines = self.split_text(text, style.width);
        let width = self.get_width(text, style.width, style.height) + 2 * t;
        let height = self.get_height(text, style.width, style.height) + 2 * t;
        let full_height = self.get_height(text, style.width, None) + 2 * t;
        trace!("Rendering {} line(s) of text into {}x{}", lines.len(), width, height);

        let (t, width_i) = (t as i64, width as i64);
        let line_x = |part: &Pixmap| match style.halign {
            HAlign::Left => t,
            HAlign::Center => (width_i - part.width() as i64) / 2,
            HAlign::Right => width_i - t - part.width() as i64,
        };
        let line_size = self.line_size() as i64;
        let mut block = Pixmap::new(width, full_height);

        // Outlines first so they never cover neighbouring glyphs.
        if let Some((outline, _)) = style.outline.filter(|_| t > 0) {
            for (i, line) in lines.iter().enumerate() {
                let part = self.render_line(line, outline);
                let (x, y) = (line_x(&part), i as i64 * line_size + t);
                for dx in -t..=t {
                    for dy in -t..=t {
                        if dx * dx + dy * dy <= t * t {
                            block.blit(&part, x + dx, y + dy, BlendMode::Normal);
                        }
                    }
                }
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let part = self.render_line(line, style.color);
            block.blit(&part, line_x(&part), i as i64 * line_size + t, BlendMode::Normal);
        }

        let slack = height as i64 - full_height as i64;
        let top = match style.valign {
            VAlign::Top => 0,
            VAlign::Middle => slack / 2,
            VAlign::Bottom => slack,
        };
        let mut out = Pixmap::new(width, height);
        out.blit(&block, 0, top, BlendMode::Normal);
        out
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Two 2x2 glyphs: 'a' is red, 'B' is white.
    fn font(hsep: u32, vsep: u32, size: u32) -> Font {
        let glyphs = Sprite::from_frames(vec![
            Pixmap::filled(2, 2, Color::RED),
            Pixmap::filled(2, 2, Color::WHITE),
        ])
        .unwrap();
        Font::from_sprite(Arc::new(glyphs), "aB", hsep, vsep, size)
    }

    //=====================================================================
    // Metrics
    //=====================================================================

    #[test]
    fn metrics_follow_size_and_separators() {
        let f = font(1, 3, 4);
        assert_eq!(f.glyph_size(), (4, 4));
        assert_eq!(f.line_size(), 7);
        assert_eq!(f.text_size("aaa"), (15, 7));
        assert_eq!(f.get_width("a\naaa", None, None), 15);
        assert_eq!(f.get_height("a\naaa", None, None), 14);
        assert_eq!(f.get_height("a\naaa", None, Some(10)), 10);
        assert_eq!(f.get_height("", None, None), 0);
    }

    //=====================================================================
    // Word Wrap
    //=====================================================================

    #[test]
    fn wraps_at_spaces_and_breaks_long_words() {
        let f = font(0, 0, 2);
        assert_eq!(f.split_text("ab cd ef", Some(10)), vec!["ab cd", "ef"]);
        assert_eq!(f.split_text("abcdefg", Some(6)), vec!["abc", "def", "g"]);
        assert_eq!(f.split_text("one\ntwo", None), vec!["one", "two"]);
        assert_eq!(f.get_width("ab cd ef", Some(10), None), 10);
    }

    #[test]
    fn glyph_wider_than_box_still_advances() {
        let f = font(0, 0, 4);
        assert_eq!(f.split_text("ab", Some(2)), vec!["a", "b"]);
    }

    //=====================================================================
    // Rendering
    //=====================================================================

    #[test]
    fn glyphs_are_tinted_and_case_folded() {
        let f = font(1, 0, 2);
        let line = f.render_line("bA?", Color::WHITE);
        assert_eq!((line.width(), line.height()), (9, 2));
        assert_eq!(line.get(0, 0), Some(Color::WHITE));
        assert_eq!(line.get(3, 1), Some(Color::RED));
        assert_eq!(line.get(2, 0), Some(Color::TRANSPARENT));
        assert_eq!(line.get(6, 0), Some(Color::TRANSPARENT));

        let tinted = f.render_line("b", Color::LIME);
        assert_eq!(tinted.get(0, 0), Some(Color::LIME));
    }

    #[test]
    fn right_aligned_lines_share_a_right_edge() {
        let f = font(0, 0, 2);
        let style = TextStyle::default().with_align(HAlign::Right, VAlign::Top);
        let block = f.render_box("aaa\na", &style);
        assert_eq!((block.width(), block.height()), (6, 4));
        assert_eq!(block.get(0, 2), Some(Color::TRANSPARENT));
        assert_eq!(block.get(5, 3), Some(Color::RED));
    }

    #[test]
    fn outline_surrounds_text() {
        let f = font(0, 0, 2);
        let style = TextStyle::default().with_outline(Color::BLUE, 1);
        let block = f.render_box("a", &style);
        assert_eq!((block.width(), block.height()), (4, 4));
        assert_eq!(block.get(1, 0), Some(Color::BLUE));
        assert_eq!(block.get(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(block.get(1, 1), Some(Color::RED));
    }

    #[test]
    fn clipped_block_aligns_to_bottom() {
        let f = font(0, 0, 2);
        let style = TextStyle::default()
            .with_box(None, Some(2))
            .with_align(HAlign::Left, VAlign::Bottom);
        let block = f.render_box("B\na", &style);
        assert_eq!(block.height(), 2);
        assert_eq!(block.get(0, 0), Some(Color::RED));
    }
}
