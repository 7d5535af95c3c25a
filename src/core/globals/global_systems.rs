//=========================================================================
// Global Systems
//=========================================================================
//
// Input mapping and the scene manager, operated on GlobalContext.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::GlobalContext;
use crate::core::input::{Action, InputSystem};
use crate::core::scene::SceneManager;

//=== GlobalSystems =======================================================

pub struct GlobalSystems<A: Action> {
    pub input: InputSystem<A>,
    pub scene_manager: SceneManager,
}

impl<A: Action> GlobalSystems<A> {
    pub fn new() -> Self {
        Self {
            input: InputSystem::new(),
            scene_manager: SceneManager::new(),
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Turns this tick's input into state and actions, then publishes
    /// the actions on the bus (stale ones cleared first).
    pub(crate) fn process_input(&mut self, ctx: &mut GlobalContext) {
        let batches = std::mem::take(&mut ctx.frame_events);
        self.input.process_frame(&mut ctx.input_state, &batches);

        ctx.message_bus.clear::<A>();
        for action in self.input.actions() {
            ctx.message_bus.push(*action);
        }
    }

    /// Updates the current scene; it reads actions from the bus.
    pub(crate) fn update_scene(&mut self, ctx: &mut GlobalContext) {
        self.scene_manager.update(ctx);
    }
}

impl<A: Action> Default for GlobalSystems<A> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
