//=========================================================================
// Engine
//
// Entry point that wires configuration, story, audio and the platform
// channel into a running game.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine ──run()──────────> winit loop
//         │                          │                          │
//         ├─ with_config()           └─run_headless()──> HeadlessDriver
//         ├─ with_story()                                       │
//         ├─ with_audio_sink()              both feed ──> Game::tick()
//         ├─ with_tps()
//         └─ with_channel_capacity()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Sender};
use log::info;

//=== Internal Dependencies ===============================================

use crate::audio::{AudioSink, LogSink};
use crate::config::GameConfig;
use crate::core::platform_bridge::PlatformEvent;
use crate::error::GameError;
use crate::game::headless::{HeadlessDriver, HeadlessReport, ScriptStep};
use crate::game::{self, Game};
use crate::platform::Platform;
use crate::story::Story;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (game ticks per second)
/// - **Channel capacity**: 128 events
/// - **Config**: [`GameConfig::default`]
/// - **Story**: the built-in prologue
/// - **Audio sink**: [`LogSink`]
///
/// # Examples
///
/// ```no_run
/// use simulate_to_survive::config::GameConfig;
/// use simulate_to_survive::EngineBuilder;
///
/// let config = GameConfig::load_or_create("config/game_config.toml")?;
/// EngineBuilder::new()
///     .with_config(config)
///     .with_tps(60.0)
///     .build()?
///     .run()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    config: GameConfig,
    story: Option<Story>,
    audio_sink: Option<Box<dyn AudioSink>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            config: GameConfig::default(),
            story: None,
            audio_sink: None,
        }
    }

    /// Sets the target ticks per second.
    ///
    /// Every tick advances the game clock by `1 / tps` seconds, in windowed
    /// and headless runs alike.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the platform → game channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the built-in story.
    pub fn with_story(mut self, story: Story) -> Self {
        self.story = Some(story);
        self
    }

    pub fn with_audio_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio_sink = Some(sink);
        self
    }

    /// Builds the game and enters the main menu.
    ///
    /// # Errors
    ///
    /// Fails when the story cannot be loaded or references unregistered
    /// scenes.
    pub fn build(self) -> Result<Engine, GameError> {
        info!("Building engine (TPS: {}, channel: {})", self.tps, self.channel_capacity);

        let story = match self.story {
            Some(story) => story,
            None => Story::builtin()?,
        };
        let sink = self.audio_sink.unwrap_or_else(|| Box::new(LogSink));
        let audio = game::audio_manager(&self.config, sink);

        let (sender, receiver) = bounded(self.channel_capacity);
        let game = Game::new(self.config, story, audio, receiver, self.tps)?;

        Ok(Engine { game, sender })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// A built game plus the sending half of its event channel.
pub struct Engine {
    game: Game,
    sender: Sender<PlatformEvent>,
}

impl Engine {
    //--- Execution --------------------------------------------------------

    /// Opens the window and runs until the game exits or the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Platform`] if the event loop or the window
    /// cannot be created.
    pub fn run(self) -> Result<(), GameError> {
        info!("Starting windowed runtime (TPS: {})", self.game.tps());

        Platform::new(self.game, self.sender).run()?;

        info!("Engine shutdown complete");
        Ok(())
    }

    /// Plays `script` without a window, then ticks `settle_ticks` more.
    pub fn run_headless(&mut self, script: &[ScriptStep], settle_ticks: u64) -> HeadlessReport {
        info!("Starting headless runtime (TPS: {})", self.game.tps());
        HeadlessDriver::new(self.sender.clone(), self.game.tps()).run(&mut self.game, script, settle_ticks)
    }

    //--- Access -----------------------------------------------------------

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
