//=========================================================================
// Game Configuration
//=========================================================================
//
// Global game settings, built in code or loaded from TOML.
//
// Every field has a default, so a config file only needs to name the
// settings it changes:
//
// ```toml
// width = 800
// height = 600
// delta = true
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::Result;

//=== Constants ===========================================================

/// Time between two prunes of the shape and image caches (ms).
pub const CACHE_PRUNE_INTERVAL: f64 = 8000.0;

//=== GameConfig ==========================================================

/// Settings shared by the whole game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game window in pixels.
    pub width: u32,

    /// Height of the game window in pixels.
    pub height: u32,

    /// Target frame rate. Also the logic thread's tick rate.
    pub fps: f64,

    /// Whether delta timing is used.
    pub delta: bool,

    /// Lowest frame rate delta timing compensates for. Slower frames
    /// are treated as if they ran at this rate.
    pub delta_min: f64,

    /// Highest frame rate allowed when delta timing is on. `None` runs
    /// at `fps`.
    pub delta_max: Option<f64>,

    /// Whether collision events fire. Collision queries work either way.
    pub collision_events_enabled: bool,

    /// Window title. `None` uses the platform default.
    pub window_text: Option<String>,

    /// Default object area width for rooms that don't set one.
    /// `None` uses the game width.
    pub object_area_width: Option<u32>,

    /// Default object area height for rooms that don't set one.
    /// `None` uses the game height.
    pub object_area_height: Option<u32>,

    /// Capacity of the platform → core event channel.
    pub channel_capacity: usize,

    /// How long an unused cached mask or image survives (ms).
    pub cache_life: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 60.0,
            delta: false,
            delta_min: 15.0,
            delta_max: None,
            collision_events_enabled: true,
            window_text: None,
            object_area_width: None,
            object_area_height: None,
            channel_capacity: 128,
            cache_life: 15000.0,
        }
    }
}

impl GameConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading game config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Frame rate the loop is paced at.
    ///
    /// With delta timing and a `delta_max`, the game runs as fast as
    /// `delta_max` and slows objects down to compensate.
    pub fn target_fps(&self) -> f64 {
        match (self.delta, self.delta_max) {
            (true, Some(max)) => max,
            _ => self.fps,
        }
    }

    /// Object area size used by rooms that don't set their own.
    pub fn default_object_area(&self) -> (u32, u32) {
        (
            self.object_area_width.unwrap_or(self.width).max(1),
            self.object_area_height.unwrap_or(self.height).max(1),
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SgeError;

    #[test]
    fn defaults_match_engine_defaults() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.fps, 60.0);
        assert!(!config.delta);
        assert_eq!(config.delta_min, 15.0);
        assert!(config.collision_events_enabled);
        assert_eq!(config.default_object_area(), (640, 480));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("width = 800\ndelta = true\n").unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 480);
        assert!(config.delta);
    }

    #[test]
    fn target_fps_uses_delta_max_only_with_delta() {
        let mut config = GameConfig {
            delta_max: Some(240.0),
            ..GameConfig::default()
        };
        assert_eq!(config.target_fps(), 60.0);
        config.delta = true;
        assert_eq!(config.target_fps(), 240.0);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = GameConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, SgeError::Config(_)));
    }

    #[test]
    fn toml_output_parses_back() {
        let config = GameConfig {
            window_text: Some("Pong".to_string()),
            object_area_width: Some(128),
            ..GameConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(GameConfig::from_toml_str(&text).unwrap(), config);
    }
}
