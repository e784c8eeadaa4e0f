//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Messages crossing the thread boundary, and platform errors.
//
//   platform ──PlatformEvent──> core     (input batches, window loss)
//   core     ──CoreEvent──────> platform (shutdown)
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;
use crate::error::SgeError;

//=== PlatformEvent =======================================================

/// Events sent from platform to core.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Input gathered during one redraw interval.
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    /// The window is gone; the core must stop without further events.
    WindowClosed,
}

//=== CoreEvent ===========================================================

/// Events sent from core to platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoreEvent {
    /// The game has ended; close the window.
    Shutdown,
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
#[derive(Error, Debug)]
pub(crate) enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(String),

    #[error("Event loop error: {0}")]
    EventLoopExecution(String),
}

impl From<PlatformError> for SgeError {
    fn from(err: PlatformError) -> Self {
        SgeError::Platform(err.to_string())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_converts_to_sge_error() {
        let err: SgeError = PlatformError::EventLoopCreation("no display".to_string()).into();
        assert_eq!(err.to_string(), "platform error: Event loop creation failed: no display");
    }

    #[test]
    fn platform_event_is_debug() {
        let debug_str = format!("{:?}", PlatformEvent::WindowClosed);
        assert!(debug_str.contains("WindowClosed"));
    }
}
