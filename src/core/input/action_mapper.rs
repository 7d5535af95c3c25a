//=========================================================================
// Action Mapper
//=========================================================================
//
// Maps key and mouse presses to game actions.
//
// Architecture:
//   (key/button, modifiers) → HashMap → Action
//
// Modifiers must match exactly. Only presses map; releases never do.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::{
    event::{InputEvent, KeyCode, Modifiers, MouseButton},
    Action,
};

//=== ActionMapper ========================================================

pub(crate) struct ActionMapper<A: Action> {
    key_bindings: HashMap<(KeyCode, Modifiers), A>,
    mouse_bindings: HashMap<(MouseButton, Modifiers), A>,
}

impl<A: Action> ActionMapper<A> {
    pub(crate) fn new() -> Self {
        Self {
            key_bindings: HashMap::new(),
            mouse_bindings: HashMap::new(),
        }
    }

    //--- Binding API ------------------------------------------------------

    pub(crate) fn bind_key(&mut self, key: KeyCode, action: A) {
        self.bind_key_with_mods(key, Modifiers::NONE, action);
    }

    /// Binds a chord; replaces any previous binding for the same chord.
    pub(crate) fn bind_key_with_mods(&mut self, key: KeyCode, modifiers: Modifiers, action: A) {
        self.key_bindings.insert((key, modifiers), action);
    }

    pub(crate) fn bind_mouse(&mut self, button: MouseButton, action: A) {
        self.mouse_bindings.insert((button, Modifiers::NONE), action);
    }

    /// Removes every modifier variant bound to `key`.
    pub(crate) fn unbind_key(&mut self, key: KeyCode) {
        self.key_bindings.retain(|&(k, _), _| k != key);
    }

    /// Chords bound to `action`, sorted for stable display.
    pub(crate) fn keys_for(&self, action: A) -> Vec<(KeyCode, Modifiers)> {
        let mut keys: Vec<_> = self
            .key_bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(chord, _)| *chord)
            .collect();
        keys.sort_by_key(|(key, mods)| format!("{:?}{:?}", mods, key));
        keys
    }

    //--- Event Mapping ----------------------------------------------------

    pub(crate) fn map_event(&self, event: &InputEvent) -> Option<A> {
        match event {
            InputEvent::KeyDown { key, modifiers } => {
                self.key_bindings.get(&(*key, *modifiers)).copied()
            }
            InputEvent::MouseButtonDown { button, modifiers } => {
                self.mouse_bindings.get(&(*button, *modifiers)).copied()
            }
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
