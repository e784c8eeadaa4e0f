//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use sge::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine & settings
pub use crate::config::GameConfig;
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{Result, SgeError};

// Game
pub use crate::core::game::{EventContext, Game, GameContext, GameHandler, RoomHandler, StepTime};
pub use crate::core::TickControl;

// Rooms & objects
pub use crate::core::alarms::Alarms;
pub use crate::core::collision::Other;
pub use crate::core::object::{Behavior, Object, ObjectId, ObjectState};
pub use crate::core::room::{Room, RoomKey, View};

// Graphics
pub use crate::core::gfx::{
    Background, BackgroundLayer, BlendMode, Color, DrawCommand, Font, Frame, HAlign, NullRenderer, Pixmap,
    RenderMethod, Renderer, ShapeStyle, SoftwareRenderer, Sprite, TextStyle, TileGrid, VAlign,
};

// Input
pub use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton, StateTracker};
