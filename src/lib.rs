//=========================================================================
// Simulate to Survive: Library Root
//
// Narrative survival game runtime: a scene manager driving story phases,
// an emotion model fed by choices, a debug capture harness, and the
// audio and save plumbing around them.
//
// Typical usage:
// ```no_run
// use simulate_to_survive::config::GameConfig;
// use simulate_to_survive::EngineBuilder;
//
// let config = GameConfig::load_or_create("config/game_config.toml")?;
// EngineBuilder::new().with_config(config).build()?.run()?;
// # Ok::<(), Box<dyn std::error::Error>>(())
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the game-agnostic runtime pieces (input, message bus,
// scenes, shared context). `game` builds the actual menu and story
// scenes on top of it.
//
pub mod audio;
pub mod config;
pub mod core;
pub mod debug;
pub mod diagnostics;
pub mod emotion;
pub mod error;
pub mod game;
pub mod logging;
pub mod prelude;
pub mod save;
pub mod story;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and event loop and is only reachable
// through `Engine::run`.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
pub use error::GameError;
