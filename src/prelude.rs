//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use simulate_to_survive::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{GameError, SceneError};
pub use crate::game::headless::{parse_script, HeadlessReport, ScriptStep};

// Configuration and story data
pub use crate::config::GameConfig;
pub use crate::story::Story;

// Game state
pub use crate::emotion::{EmotionKind, EmotionSystem};
pub use crate::game::{Game, GameAction};

// Scene system
pub use crate::core::scene::{Scene, SceneId, SceneView};

// Audio
pub use crate::audio::{AudioKind, AudioSink, LogSink, RecordingSink};
