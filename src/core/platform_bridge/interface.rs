//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Events (platform → runtime), commands (runtime → platform) and errors.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== PlatformEvent =======================================================

/// Sent over the bounded event channel.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Input gathered since the previous send. Discrete events keep their
    /// order; continuous ones (cursor motion) are coalesced.
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    WindowClosed,
}

//=== PlatformCommand =====================================================

/// Requests the runtime makes of the window backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCommand {
    SetFullscreen(bool),
}

//=== PlatformError =======================================================

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}
