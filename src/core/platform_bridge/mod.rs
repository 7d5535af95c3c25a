//=========================================================================
// Platform Bridge
//=========================================================================
//
// The contract between the window backend and the game runtime.
//
// Components:
// - `interface`: events flowing into the runtime, commands flowing out
// - `event_collector`: runtime-side draining of the event channel
//
// Both the winit backend and the headless driver feed the same channel,
// so the runtime cannot tell them apart.
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use event_collector::TickControl;
pub use interface::{PlatformCommand, PlatformError};

pub(crate) use event_collector::EventCollector;
pub(crate) use interface::PlatformEvent;
