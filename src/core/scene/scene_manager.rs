//=========================================================================
// Scene Manager
//=========================================================================
//
// Scene registration, the current scene and per-scene exit snapshots.
//
// Scenes are stored by id and keep their own state between activations.
// There is exactly one current scene; no stacking.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{Scene, SceneId, SceneView};
use crate::core::globals::GlobalContext;
use crate::error::SceneError;

//=== Scene Manager =======================================================

#[derive(Default)]
pub struct SceneManager {
    scenes: HashMap<SceneId, Box<dyn Scene>>,
    current: Option<SceneId>,
    states: BTreeMap<SceneId, serde_json::Value>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers `scene` under `id`, replacing any previous registration.
    pub fn register(&mut self, id: impl Into<SceneId>, scene: Box<dyn Scene>) {
        let id = id.into();
        debug!("Registering scene {}", id);
        if self.scenes.insert(id.clone(), scene).is_some() {
            warn!("Scene {} was already registered and has been replaced", id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&SceneId> {
        let mut ids: Vec<_> = self.scenes.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    //--- Current Scene ----------------------------------------------------

    pub fn current(&self) -> Option<&SceneId> {
        self.current.as_ref()
    }

    /// View of the current scene, or an empty view before the first
    /// transition.
    pub fn current_view(&self) -> SceneView {
        self.current_scene()
            .map(|scene| scene.view())
            .unwrap_or_default()
    }

    /// Whether the current scene wants periodic autosaves.
    pub fn current_autosaves(&self) -> bool {
        self.current_scene().is_some_and(|scene| scene.autosaves())
    }

    fn current_scene(&self) -> Option<&dyn Scene> {
        self.current
            .as_ref()
            .and_then(|id| self.scenes.get(id))
            .map(|scene| scene.as_ref())
    }

    //--- Update Loop ------------------------------------------------------

    pub fn update(&mut self, ctx: &mut GlobalContext) {
        let Some(id) = &self.current else {
            return;
        };
        if let Some(scene) = self.scenes.get_mut(id) {
            scene.update(ctx);
        }
    }

    //--- Transitions ------------------------------------------------------

    /// Makes `id` the current scene.
    ///
    /// The outgoing scene gets `on_exit` and its snapshot is recorded
    /// before the target's `on_enter` runs. Fails without side effects
    /// when `id` is not registered.
    pub fn transition(&mut self, id: &str, ctx: &mut GlobalContext) -> Result<(), SceneError> {
        self.switch(id, ctx, false)
    }

    /// Like [`transition`](Self::transition), then restores the target's
    /// recorded snapshot, if there is one. When `id` is already current,
    /// the recorded snapshot wins over the live state.
    pub fn resume(&mut self, id: &str, ctx: &mut GlobalContext) -> Result<(), SceneError> {
        self.switch(id, ctx, true)
    }

    fn switch(&mut self, id: &str, ctx: &mut GlobalContext, restore: bool) -> Result<(), SceneError> {
        if !self.scenes.contains_key(id) {
            return Err(SceneError::NotFound(id.to_string()));
        }

        // Taken before the outgoing snapshot, which may be the same scene
        let saved = if restore { self.states.get(id).cloned() } else { None };

        if let Some(previous) = self.current.take() {
            if let Some(scene) = self.scenes.get_mut(&previous) {
                scene.on_exit(ctx);
                let state = scene.snapshot();
                if !state.is_null() {
                    self.states.insert(previous.clone(), state);
                }
            }
            info!("Scene transition: {} -> {}", previous, id);
        } else {
            info!("Entering scene {}", id);
        }

        let target = SceneId::from(id);
        if let Some(scene) = self.scenes.get_mut(id) {
            scene.on_enter(ctx);
            if let Some(state) = saved {
                debug!("Restoring saved state for {}", id);
                scene.restore(&state);
                self.states.insert(target.clone(), state);
            }
        }
        self.current = Some(target);

        Ok(())
    }

    //--- Scene State ------------------------------------------------------

    pub fn scene_state(&self, id: &str) -> Option<&serde_json::Value> {
        self.states.get(id)
    }

    pub fn set_scene_state(&mut self, id: impl Into<SceneId>, state: serde_json::Value) {
        self.states.insert(id.into(), state);
    }

    /// Replaces every recorded snapshot (used when loading a save).
    pub fn set_scene_states(&mut self, states: BTreeMap<SceneId, serde_json::Value>) {
        self.states = states;
    }

    /// Recorded snapshots, including the current scene's live state.
    pub fn scene_states(&self) -> BTreeMap<SceneId, serde_json::Value> {
        let mut states = self.states.clone();
        if let (Some(id), Some(scene)) = (&self.current, self.current_scene()) {
            let state = scene.snapshot();
            if !state.is_null() {
                states.insert(id.clone(), state);
            }
        }
        states
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
