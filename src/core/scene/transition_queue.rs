//=========================================================================
// Transition Queue
//=========================================================================
//
// Scene ids requested during a tick. The runtime applies them in FIFO
// order at the tick boundary.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::SceneId;

//=== Transition Queue ====================================================

#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<SceneId>,
}

impl TransitionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a switch to `id` at the next tick boundary.
    pub fn push(&mut self, id: impl Into<SceneId>) {
        self.queue.push(id.into());
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneId> {
        self.queue.iter()
    }

    /// Takes every queued request, leaving the queue empty.
    pub fn take(&mut self) -> Vec<SceneId> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_fifo_and_empties() {
        let mut queue = TransitionQueue::new();
        queue.push("CH0_PHASE_02");
        queue.push(String::from("main_menu"));
        assert_eq!(queue.len(), 2);

        let taken = queue.take();
        assert_eq!(taken, vec![SceneId::from("CH0_PHASE_02"), SceneId::from("main_menu")]);
        assert!(queue.is_empty());
    }
}
