//=========================================================================
// Graphics
//=========================================================================
//
// Colors, pixel buffers, sprites, sprite fonts, tile grids, backgrounds
// and the per-frame display list.
//
// Architecture:
//   Color ── Pixmap ── Sprite ── BackgroundLayer ── Background
//                         ├── Font (glyph frames) ── text boxes
//                         ├── TileGrid ──render()──> Sprite
//                         │
//                         └── DrawCommand ── ViewFrame ── Frame ──> Renderer
//
// All drawing is done in software on RGBA pixmaps; a Renderer decides
// what to do with the finished frame.
//
//=========================================================================

//=== Module Declarations =================================================

mod background;
mod color;
mod font;
mod frame;
pub(crate) mod pixmap;
mod sprite;
mod tilegrid;

//=== Public API ==========================================================

pub use background::{Background, BackgroundLayer};
pub use color::Color;
pub use font::{Font, HAlign, TextStyle, VAlign};
pub use frame::{DrawCommand, Frame, NullRenderer, Renderer, SoftwareRenderer, ViewFrame};
pub use pixmap::{BlendMode, Pixmap, ShapeStyle};
pub use sprite::Sprite;
pub use tilegrid::{RenderMethod, TileGrid};

pub(crate) use frame::sort_by_z;
