//=========================================================================
// Message Bus
//=========================================================================
//
// One queue per message type, keyed by TypeId.
//
// Pattern: push → read (N consumers) or take (one owner) → clear
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use log::error;

//=== Internal Dependencies ===============================================

use super::message_queue::MessageQueue;

//=== Public API ==========================================================

/// Anything that can travel on the [`MessageBus`].
pub trait Message: 'static {}

impl<T: 'static> Message for T {}

//=========================================================================

/// Batched, typed communication between the runtime and scenes.
#[derive(Default)]
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Message Operations -----------------------------------------------

    /// Appends `msg` to the queue for its type.
    pub fn push<M: Message>(&mut self, msg: M) {
        match self.queue_mut::<M>() {
            Some(queue) => queue.push(msg),
            None => error!("MessageBus queue type mismatch for {}", type_name::<M>()),
        }
    }

    /// All queued messages of type `M`, oldest first.
    ///
    /// Reading does not consume; several consumers may read the same
    /// messages within one tick.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queue::<M>().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns every queued `M`.
    pub fn take<M: Message>(&mut self) -> Vec<M> {
        self.queues
            .get_mut(&TypeId::of::<M>())
            .and_then(|queue| queue.as_any_mut().downcast_mut::<Vec<M>>())
            .map(std::mem::take)
            .unwrap_or_default()
    }

    //--- Query API --------------------------------------------------------

    pub fn has_messages<M: Message>(&self) -> bool {
        self.count::<M>() > 0
    }

    pub fn count<M: Message>(&self) -> usize {
        self.queue::<M>().map_or(0, Vec::len)
    }

    //--- Clearing ---------------------------------------------------------

    /// Clears messages of type `M`, keeping the allocation.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queues.get_mut(&TypeId::of::<M>()) {
            queue.clear_queue();
        }
    }

    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn queue<M: Message>(&self) -> Option<&Vec<M>> {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|queue| queue.as_any().downcast_ref::<Vec<M>>())
    }

    fn queue_mut<M: Message>(&mut self) -> Option<&mut Vec<M>> {
        self.queues
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()))
            .as_any_mut()
            .downcast_mut::<Vec<M>>()
    }
}

//=========================================================================
// Tests
//=========================================================================
