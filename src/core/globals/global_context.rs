//=========================================================================
// Global Context
//=========================================================================
//
// Shared data lent to scenes during lifecycle hooks and updates.
//
// - input_state: keys, mouse, modifiers for the current tick
// - message_bus: GameAction in, AudioCommand out
// - scene_transitions: requested scene changes
// - emotions / game_data: player state that gets saved
// - clock: game time for every timer
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

//=== Internal Dependencies ===============================================

use crate::config::{DisplaySettings, GameConfig};
use crate::core::input::{InputEvent, StateTracker};
use crate::core::message_bus::MessageBus;
use crate::core::scene::TransitionQueue;
use crate::emotion::EmotionSystem;

//=== GameClock ===========================================================

/// Game time: the sum of tick deltas, never wall time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameClock {
    elapsed: f64,
    delta: f64,
}

impl GameClock {
    pub(crate) fn advance(&mut self, dt: f64) {
        self.delta = dt.max(0.0);
        self.elapsed += self.delta;
    }

    /// Seconds since the game started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds covered by the current tick.
    pub fn delta(&self) -> f64 {
        self.delta
    }
}

//=== GlobalContext =======================================================

pub struct GlobalContext {
    pub input_state: StateTracker,
    pub message_bus: MessageBus,
    pub scene_transitions: TransitionQueue,

    pub emotions: EmotionSystem,

    /// Free-form progress flags persisted with the save.
    pub game_data: BTreeMap<String, serde_json::Value>,

    pub clock: GameClock,

    /// Display settings scenes need (text speed, auto-advance, surface width).
    pub display: DisplaySettings,

    quit_requested: bool,

    /// Input batches for this tick; consumed by `GlobalSystems::update`.
    pub(crate) frame_events: Vec<Vec<InputEvent>>,
}

impl GlobalContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            input_state: StateTracker::new(),
            message_bus: MessageBus::new(),
            scene_transitions: TransitionQueue::new(),
            emotions: EmotionSystem::from_settings(&config.game),
            game_data: BTreeMap::new(),
            clock: GameClock::default(),
            display: config.display.clone(),
            quit_requested: false,
            frame_events: Vec::new(),
        }
    }

    /// Asks the runtime to stop after the current tick.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
