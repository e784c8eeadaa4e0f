//=========================================================================
// Frame (Display List & Compositor)
//=========================================================================
//
// Backend-agnostic description of one rendered frame.
//
// Architecture:
//   Room ──build_frame()──> Frame
//                            ├─ views: Vec<ViewFrame>  (view-local, z-sorted)
//                            └─ window: Vec<DrawCommand> (window projections)
//   Frame ──Renderer::render()──> backend (software, null, ...)
//
// Compositing order: each view surface is filled with the background
// color, its commands are blitted in z order, the surface is scaled to
// its port and placed on the window; window projections go on top.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::color::Color;
use super::font::{Font, TextStyle};
use super::pixmap::{BlendMode, Pixmap, ShapeStyle};
use super::sprite::Sprite;

//=== DrawCommand =========================================================

/// An image placed at a position with a z order and blend mode.
///
/// Shape constructors rasterize into a small pixmap whose top-left
/// corner is at `(x, y)`.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub image: Arc<Pixmap>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub blend: BlendMode,
}

impl DrawCommand {
    pub fn new(image: Arc<Pixmap>, x: f64, y: f64, z: f64) -> Self {
        Self {
            image,
            x,
            y,
            z,
            blend: BlendMode::Normal,
        }
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    //--- Shapes -----------------------------------------------------------

    pub fn dot(x: f64, y: f64, z: f64, color: Color) -> Self {
        Self::new(Arc::new(Pixmap::filled(1, 1, color)), x, y, z)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, z: f64, color: Color, thickness: u32) -> Self {
        let t = thickness.max(1);
        let half = (t / 2) as f64;
        let x = x1.min(x2).round() - half;
        let y = y1.min(y2).round() - half;
        let w = ((x1 - x2).abs().round() as u32) + t + 1;
        let h = ((y1 - y2).abs().round() as u32) + t + 1;

        let mut img = Pixmap::new(w, h);
        img.stroke_line(
            (x1.round() - x) as i64,
            (y1.round() - y) as i64,
            (x2.round() - x) as i64,
            (y2.round() - y) as i64,
            color,
            t,
        );
        Self::new(Arc::new(img), x, y, z)
    }

    pub fn rectangle(x: f64, y: f64, z: f64, width: f64, height: f64, style: ShapeStyle) -> Self {
        let (w, h) = (width.round().max(0.0) as u32, height.round().max(0.0) as u32);
        let mut img = Pixmap::new(w, h);
        img.draw_rectangle(0, 0, w as i64, h as i64, style, BlendMode::Normal);
        Self::new(Arc::new(img), x, y, z)
    }

    pub fn ellipse(x: f64, y: f64, z: f64, width: f64, height: f64, style: ShapeStyle) -> Self {
        let (w, h) = (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32);
        let mut img = Pixmap::new(w, h);
        img.draw_ellipse(0.0, 0.0, width, height, style, BlendMode::Normal);
        Self::new(Arc::new(img), x, y, z)
    }

    /// A circle centered on `(x, y)`.
    pub fn circle(x: f64, y: f64, z: f64, radius: f64, style: ShapeStyle) -> Self {
        let d = radius * 2.0;
        Self::ellipse(x - radius, y - radius, z, d, d, style)
    }

    pub fn polygon(points: &[(f64, f64)], z: f64, style: ShapeStyle) -> Self {
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        if points.is_empty() {
            return Self::new(Arc::new(Pixmap::new(0, 0)), 0.0, 0.0, z);
        }

        let pad = style.outline.map_or(0, |_| style.outline_thickness);
        let w = (max_x - min_x).ceil() as u32 + pad + 1;
        let h = (max_y - min_y).ceil() as u32 + pad + 1;
        let local: Vec<(f64, f64)> = points.iter().map(|&(px, py)| (px - min_x, py - min_y)).collect();

        let mut img = Pixmap::new(w, h);
        img.draw_polygon(&local, style, BlendMode::Normal);
        Self::new(Arc::new(img), min_x, min_y, z)
    }

    /// A block of text anchored at `(x, y)` by the style's alignment.
    pub fn text(font: &Font, text: &str, x: f64, y: f64, z: f64, style: &TextStyle) -> Self {
        let img = font.render_box(text, style);
        let x = x + style.halign.offset(img.width() as i64) as f64;
        let y = y + style.valign.offset(img.height() as i64) as f64;
        Self::new(Arc::new(img), x, y, z)
    }

    /// A sprite frame with its origin at `(x, y)`.
    pub fn sprite(sprite: &Sprite, frame: usize, x: f64, y: f64, z: f64) -> Self {
        let img = sprite.image(frame, 1.0, 1.0, 0.0, 255, None);
        Self::new(Arc::new(img), x - sprite.origin_x, y - sprite.origin_y, z)
    }
}

//=== Frame ===============================================================

/// Everything one view shows, in view-local coordinates.
#[derive(Debug, Clone)]
pub struct ViewFrame {
    pub xport: f64,
    pub yport: f64,
    pub width: u32,
    pub height: u32,
    pub wport: u32,
    pub hport: u32,
    pub background: Color,
    /// Sorted by z; equal z keeps submission order.
    pub commands: Vec<DrawCommand>,
}

/// A complete frame: every view plus window projections.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub views: Vec<ViewFrame>,
    /// Window-space projections, sorted by z, drawn above all views.
    pub window: Vec<DrawCommand>,
}

impl Frame {
    /// An empty black frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            views: Vec::new(),
            window: Vec::new(),
        }
    }

    /// Renders the frame into a new pixmap the size of the window.
    pub fn composite(&self) -> Pixmap {
        let mut screen = Pixmap::filled(self.width, self.height, Color::BLACK);

        for view in &self.views {
            let mut surface = Pixmap::filled(view.width, view.height, view.background);
            for cmd in &view.commands {
                blit_command(&mut surface, cmd);
            }
            let scaled = surface.scaled(view.wport, view.hport);
            screen.blit(
                &scaled,
                view.xport.round() as i64,
                view.yport.round() as i64,
                BlendMode::Normal,
            );
        }

        for cmd in &self.window {
            blit_command(&mut screen, cmd);
        }
        screen
    }
}

fn blit_command(target: &mut Pixmap, cmd: &DrawCommand) {
    target.blit(&cmd.image, cmd.x.round() as i64, cmd.y.round() as i64, cmd.blend);
}

/// Stable z sort used for every command list.
pub(crate) fn sort_by_z(commands: &mut [DrawCommand]) {
    commands.sort_by(|a, b| a.z.total_cmp(&b.z));
}

//=== Renderers ===========================================================

/// Consumes finished frames.
pub trait Renderer: Send {
    fn render(&mut self, frame: &Frame);
}

/// Composites frames in software and keeps the last screen image.
#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    screen: Option<Pixmap>,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered screen, if any frame was rendered.
    pub fn screen(&self) -> Option<&Pixmap> {
        self.screen.as_ref()
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&mut self, frame: &Frame) {
        self.screen = Some(frame.composite());
    }
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame) {}
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::super::font::HAlign;
    use super::*;

    fn view(width: u32, height: u32, commands: Vec<DrawCommand>) -> ViewFrame {
        ViewFrame {
            xport: 0.0,
            yport: 0.0,
            width,
            height,
            wport: width,
            hport: height,
            background: Color::BLUE,
            commands,
        }
    }

    #[test]
    fn shapes_are_positioned_by_top_left() {
        let rect = DrawCommand::rectangle(3.0, 4.0, 0.0, 5.0, 2.0, ShapeStyle::filled(Color::RED));
        assert_eq!((rect.x, rect.y), (3.0, 4.0));
        assert_eq!((rect.image.width(), rect.image.height()), (5, 2));

        let circle = DrawCommand::circle(10.0, 10.0, 0.0, 4.0, ShapeStyle::filled(Color::RED));
        assert_eq!((circle.x, circle.y), (6.0, 6.0));
        assert_eq!(circle.image.get(4, 4), Some(Color::RED));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let cmd = DrawCommand::line(5.0, 9.0, 2.0, 3.0, 0.0, Color::WHITE, 1);
        let at = |x: f64, y: f64| cmd.image.get((x - cmd.x) as i64, (y - cmd.y) as i64);
        assert_eq!(at(5.0, 9.0), Some(Color::WHITE));
        assert_eq!(at(2.0, 3.0), Some(Color::WHITE));
    }

    #[test]
    fn polygon_bounds_follow_points() {
        let cmd = DrawCommand::polygon(
            &[(10.0, 10.0), (20.0, 10.0), (10.0, 20.0)],
            0.0,
            ShapeStyle::filled(Color::LIME),
        );
        assert_eq!((cmd.x, cmd.y), (10.0, 10.0));
        assert_eq!(cmd.image.get(1, 1), Some(Color::LIME));
    }

    #[test]
    fn text_is_anchored_by_alignment() {
        let glyphs = Arc::new(Sprite::from_pixmap(Pixmap::filled(2, 2, Color::WHITE)));
        let font = Font::from_sprite(glyphs, "o", 0, 0, 2);
        let style = TextStyle::default().with_align(HAlign::Center, Default::default());
        let cmd = DrawCommand::text(&font, "oo", 10.0, 5.0, 1.0, &style);
        assert_eq!((cmd.x, cmd.y, cmd.z), (8.0, 5.0, 1.0));
        assert_eq!((cmd.image.width(), cmd.image.height()), (4, 2));
    }

    #[test]
    fn sort_is_stable() {
        let dot = |x: f64, z: f64| DrawCommand::dot(x, 0.0, z, Color::WHITE);
        let mut cmds = vec![dot(0.0, 2.0), dot(1.0, 1.0), dot(2.0, 2.0), dot(3.0, 1.0)];
        sort_by_z(&mut cmds);
        let xs: Vec<f64> = cmds.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn composite_draws_views_then_window() {
        let mut frame = Frame::blank(8, 8);
        frame.views.push(view(4, 4, vec![DrawCommand::dot(1.0, 1.0, 0.0, Color::RED)]));
        frame.window.push(DrawCommand::dot(1.0, 1.0, 0.0, Color::WHITE));
        frame.window.push(DrawCommand::dot(6.0, 6.0, 0.0, Color::LIME));

        let screen = frame.composite();
        assert_eq!(screen.get(0, 0), Some(Color::BLUE));
        assert_eq!(screen.get(1, 1), Some(Color::WHITE));
        assert_eq!(screen.get(5, 5), Some(Color::BLACK));
        assert_eq!(screen.get(6, 6), Some(Color::LIME));
    }

    #[test]
    fn view_is_scaled_to_port() {
        let mut frame = Frame::blank(8, 8);
        let mut v = view(2, 2, vec![DrawCommand::dot(0.0, 0.0, 0.0, Color::RED)]);
        v.xport = 4.0;
        v.wport = 4;
        v.hport = 4;
        frame.views.push(v);

        let screen = frame.composite();
        assert_eq!(screen.get(4, 0), Some(Color::RED));
        assert_eq!(screen.get(5, 1), Some(Color::RED));
        assert_eq!(screen.get(6, 2), Some(Color::BLUE));
        assert_eq!(screen.get(3, 0), Some(Color::BLACK));
    }

    #[test]
    fn software_renderer_keeps_last_screen() {
        let mut renderer = SoftwareRenderer::new();
        assert!(renderer.screen().is_none());
        renderer.render(&Frame::blank(2, 2));
        assert_eq!(renderer.screen().map(|s| s.width()), Some(2));
    }
}
