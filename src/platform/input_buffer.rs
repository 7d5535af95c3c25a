//=========================================================================
// Input Buffer
//=========================================================================
//
// Input gathered between two ticks, split the way the channel sends it.
//
// - discrete: key and button events in arrival order, consecutive
//   duplicates (auto-repeat) dropped
// - continuous: cursor motion, coalesced to the latest position
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    continuous: HashSet<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self {
            discrete: Vec::with_capacity(32),
            continuous: HashSet::with_capacity(4),
        }
    }

    /// Replaces any earlier event of the same kind (last position wins).
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        self.continuous.replace(event);
    }

    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Takes everything buffered; `None` when there is nothing to send.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let discrete = std::mem::take(&mut self.discrete);
        let continuous = self.continuous.drain().collect();
        Some((discrete, continuous))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyCode, Modifiers};

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[test]
    fn auto_repeat_is_collapsed() {
        let mut buffer = InputBuffer::new();
        buffer.push_discrete(key_down(KeyCode::Space));
        buffer.push_discrete(key_down(KeyCode::Space));
        buffer.push_discrete(key_down(KeyCode::Digit1));

        let (discrete, _) = buffer.drain().unwrap();
        assert_eq!(discrete, [key_down(KeyCode::Space), key_down(KeyCode::Digit1)]);
    }

    #[test]
    fn cursor_motion_keeps_last_position() {
        let mut buffer = InputBuffer::new();
        buffer.push_continuous(InputEvent::MouseMoved { x: 10.0, y: 10.0 });
        buffer.push_continuous(InputEvent::MouseMoved { x: 640.0, y: 425.0 });

        let (_, continuous) = buffer.drain().unwrap();
        assert_eq!(continuous.len(), 1);
        match continuous[0] {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (640.0, 425.0)),
            ref other => panic!("Expected MouseMoved, got {:?}", other),
        }
    }

    #[test]
    fn drain_empties_and_reports_nothing_after() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());

        buffer.push_discrete(key_down(KeyCode::F2));
        assert!(buffer.drain().is_some());
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_none());
    }
}
