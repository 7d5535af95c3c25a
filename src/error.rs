//=========================================================================
// Errors
//=========================================================================
//
// Error types for every fallible subsystem, plus the top-level
// `GameError` that wraps them for the runtime and the CLI.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::PlatformError;

//=== SceneError ==========================================================

/// Scene registry failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Transition target was never registered.
    #[error("scene not found: {0}")]
    NotFound(String),
}

//=== StoryError ==========================================================

/// Story data loading and validation failures.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to read story file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse story data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scene {0} is defined more than once")]
    Duplicate(String),

    #[error("scene {0} has no events")]
    Empty(String),

    /// A choice or scene points at a scene id nobody registered.
    #[error("{source_id} references unregistered scene {target}")]
    UnknownTarget { source_id: String, target: String },

    #[error("choice {choice} uses unknown emotion {name}")]
    UnknownEmotion { choice: String, name: String },
}

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

//=== SaveError ===========================================================

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save io error: {0}")]
    Io(#[from] io::Error),

    #[error("save data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

//=== CaptureError ========================================================

/// Screenshot write failures. Logged by the harness, never fatal.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture io error: {0}")]
    Io(#[from] io::Error),

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

//=== GameError ===========================================================

/// Top-level error returned by engine construction and execution.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Story(#[from] StoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

//=========================================================================
// Unit Tests
//=========================================================================
