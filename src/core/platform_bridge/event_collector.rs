//=========================================================================
// Event Collector
//=========================================================================
//
// Drains the platform channel once per tick.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → input batches → TickControl
//
// Draining is bounded so a flood of input cannot stall a tick. The
// collector never blocks; pacing belongs to whoever drives the tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::input::event::InputEvent;

const MAX_EVENTS_PER_FRAME: usize = 100;

//=== TickControl =========================================================

/// Whether the runtime wants another tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    input_batches: Vec<Vec<InputEvent>>,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            input_batches: Vec::with_capacity(4),
        }
    }

    /// Collects whatever is pending, at most `MAX_EVENTS_PER_FRAME` events.
    ///
    /// Returns `Exit` on `WindowClosed` or when every sender is gone.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.input_batches.clear();

        for _ in 0..MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.handle_event(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    debug!("Platform channel disconnected");
                    return TickControl::Exit;
                }
            }
        }

        warn!(
            "Event queue backlog: drained {} events this frame, {} still pending",
            MAX_EVENTS_PER_FRAME,
            self.receiver.len()
        );
        TickControl::Continue
    }

    /// Moves this tick's batches out, leaving the collector empty.
    pub(crate) fn take_batches(&mut self) -> Vec<Vec<InputEvent>> {
        std::mem::take(&mut self.input_batches)
    }

    fn handle_event(&mut self, event: PlatformEvent) -> TickControl {
        match event {
            PlatformEvent::Inputs { discrete, continuous } => {
                if !discrete.is_empty() {
                    self.input_batches.push(discrete);
                }
                if !continuous.is_empty() {
                    self.input_batches.push(continuous);
                }
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, Modifiers};
    use crossbeam_channel::{bounded, unbounded};

    fn key(key: KeyCode) -> PlatformEvent {
        PlatformEvent::Inputs {
            discrete: InputEvent::tap(key, Modifiers::NONE).to_vec(),
            continuous: vec![],
        }
    }

    #[test]
    fn empty_queue_continues_without_batches() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert!(collector.take_batches().is_empty());
    }

    #[test]
    fn discrete_and_continuous_become_separate_batches() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Inputs {
            discrete: vec![InputEvent::KeyDown { key: KeyCode::KeyA, modifiers: Modifiers::NONE }],
            continuous: vec![InputEvent::MouseMoved { x: 10.0, y: 20.0 }],
        })
        .unwrap();
        tx.send(key(KeyCode::Space)).unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert_eq!(collector.take_batches().len(), 3);
    }

    #[test]
    fn window_closed_and_disconnect_exit() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        tx.send(PlatformEvent::WindowClosed).unwrap();
        assert_eq!(collector.collect_frame(), TickControl::Exit);

        let (tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);
        drop(tx);
        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }

    #[test]
    fn drain_is_bounded_per_frame() {
        let (tx, rx) = bounded(MAX_EVENTS_PER_FRAME + 10);
        let mut collector = EventCollector::new(rx);
        for _ in 0..MAX_EVENTS_PER_FRAME + 10 {
            tx.send(key(KeyCode::Enter)).unwrap();
        }

        collector.collect_frame();
        assert_eq!(collector.take_batches().len(), MAX_EVENTS_PER_FRAME);

        collector.collect_frame();
        assert_eq!(collector.take_batches().len(), 10);
    }

    #[test]
    fn batches_reset_between_frames() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(key(KeyCode::Space)).unwrap();
        collector.collect_frame();
        collector.collect_frame();

        assert!(collector.take_batches().is_empty());
    }
}
