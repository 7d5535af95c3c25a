//=========================================================================
// Global Game State
//=========================================================================
//
// Separates systems (logic) from context (shared data).
//
// Architecture:
//   GlobalSystems: InputSystem + SceneManager (owned by the runtime)
//   GlobalContext: input state, bus, transitions, emotions, clock
//                  (lent to scenes every tick)
//
//=========================================================================

//=== Module Declarations =================================================

mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use global_context::{GameClock, GlobalContext};
pub use global_systems::GlobalSystems;
