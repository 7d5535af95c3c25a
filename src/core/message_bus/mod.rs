//=========================================================================
// Message Bus
//=========================================================================
//
// Typed per-tick queues shared between the runtime and scenes.
//
// Architecture:
//   producer → push<M>() → HashMap<TypeId, Vec<M>>
//                              ↓
//   consumers ← read<M>() (shared) / take<M>() (owning)
//                              ↓
//   runtime ─────────→ clear<M>() at tick boundary
//
// Traffic on this bus: GameAction (runtime → scenes) and AudioCommand
// (scenes → audio manager).
//
//=========================================================================

//=== Module Declarations =================================================

mod message_bus;
mod message_queue;

//=== Public API ==========================================================

pub use message_bus::{Message, MessageBus};
