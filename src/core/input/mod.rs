//=========================================================================
// Input System
//
// Turns a tick's worth of platform input batches into raw state and
// mapped actions.
//
// Architecture:
//   Vec<Vec<InputEvent>> ─┬─> StateTracker (held / pressed / cursor)
//                         └─> ActionMapper ─> actions() (ordered)
//
// Notes:
// Owned by GlobalSystems. Actions are republished on the message bus
// each tick so scenes can read them without holding the system.
//
//=========================================================================

//=== Submodules ==========================================================

mod action_mapper;
pub mod event;
mod state_tracker;

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;

use log::trace;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;

use action_mapper::ActionMapper;

//=== Action Trait ========================================================

/// Marker trait for game-defined action enums.
///
/// ```
/// use simulate_to_survive::core::input::Action;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum MenuAction { Up, Down, Select }
///
/// impl Action for MenuAction {}
/// ```
pub trait Action: 'static + Copy + Eq + Hash + Debug {}

//=== InputSystem =========================================================

/// Binding table plus the actions produced during the current tick.
pub struct InputSystem<A: Action> {
    mapper: ActionMapper<A>,
    actions: Vec<A>,
}

impl<A: Action> InputSystem<A> {
    pub fn new() -> Self {
        Self {
            mapper: ActionMapper::new(),
            actions: Vec::with_capacity(8),
        }
    }

    //--- Binding API ------------------------------------------------------

    pub fn bind_key(&mut self, key: KeyCode, action: A) {
        self.mapper.bind_key(key, action);
    }

    pub fn bind_key_with_mods(&mut self, key: KeyCode, modifiers: Modifiers, action: A) {
        self.mapper.bind_key_with_mods(key, modifiers, action);
    }

    pub fn bind_mouse(&mut self, button: MouseButton, action: A) {
        self.mapper.bind_mouse(button, action);
    }

    pub fn unbind_key(&mut self, key: KeyCode) {
        self.mapper.unbind_key(key);
    }

    /// Chords currently bound to `action`.
    pub fn keys_for(&self, action: A) -> Vec<(KeyCode, Modifiers)> {
        self.mapper.keys_for(action)
    }

    //--- Tick Processing --------------------------------------------------

    /// Feeds one tick of input into `state` and rebuilds the action list.
    ///
    /// Batches are processed in arrival order so a press and its release
    /// inside the same tick still produce the action.
    pub fn process_frame(&mut self, state: &mut StateTracker, batches: &[Vec<InputEvent>]) {
        state.clear();
        self.actions.clear();

        for batch in batches {
            state.process_events(batch);
            self.actions
                .extend(batch.iter().filter_map(|event| self.mapper.map_event(event)));
        }

        if !self.actions.is_empty() {
            trace!(target: "input", "Actions this tick: {:?}", self.actions);
        }
    }

    /// Actions mapped during the last [`process_frame`](Self::process_frame).
    pub fn actions(&self) -> &[A] {
        &self.actions
    }
}

impl<A: Action> Default for InputSystem<A> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
