//=========================================================================
// Core Systems
//
// Platform-independent building blocks of the game runtime.
//
// Modules:
// - `input`: events, state tracking, action mapping
// - `message_bus`: typed per-tick queues
// - `scene`: scene registry and transitions
// - `globals`: shared context and the systems that operate on it
// - `platform_bridge`: channel contract with the window backend
//
// Notes:
// Everything here runs on the main thread. The window backend and the
// headless driver only reach the core through the platform channel.
//
//=========================================================================

pub mod globals;
pub mod input;
pub mod message_bus;
pub mod platform_bridge;
pub mod scene;
