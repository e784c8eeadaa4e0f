//=========================================================================
// Errors
//=========================================================================
//
// Crate-wide error type for fallible engine operations.
//
// Builder misuse (zero fps, zero channel capacity) panics instead, and
// recoverable misuse inside the running game is logged and ignored.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== SgeError ============================================================

/// Errors returned by fallible SGE operations.
#[derive(Error, Debug)]
pub enum SgeError {
    /// A color string was neither a known name nor valid HTML hex.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("frame {index} out of range (sprite has {count} frames)")]
    FrameOutOfRange { index: usize, count: usize },

    /// Sprites always keep at least one frame.
    #[error("cannot delete the only frame of a sprite")]
    LastFrame,

    #[error("invalid sprite strip: {width}px wide image cannot be split into {frames} frames")]
    InvalidStrip { width: u32, frames: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A room key was used before being registered with the game.
    #[error("room {0} is not registered")]
    UnknownRoom(String),

    #[error("no start room has been set")]
    NoStartRoom,

    #[error("platform error: {0}")]
    Platform(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SgeError>;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let err = SgeError::FrameOutOfRange { index: 4, count: 2 };
        assert_eq!(err.to_string(), "frame 4 out of range (sprite has 2 frames)");

        let err = SgeError::InvalidColor("#zz".to_string());
        assert_eq!(err.to_string(), "invalid color: \"#zz\"");
    }

    #[test]
    fn io_errors_convert() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(SgeError::Io(_))));
    }
}
