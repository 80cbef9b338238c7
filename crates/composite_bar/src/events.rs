//! Context-menu observers.

use std::sync::Arc;

use indexmap::IndexMap;
use shared::domain::PointerEvent;

pub type ContextMenuListener = Arc<dyn Fn(&PointerEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct ContextMenuEmitter {
    listeners: IndexMap<SubscriptionId, ContextMenuListener>,
    next_id: u64,
}

impl ContextMenuEmitter {
    pub fn subscribe(&mut self, listener: ContextMenuListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.shift_remove(&id).is_some()
    }

    /// Listeners in subscription order. Callers invoke them outside any lock.
    pub fn listeners(&self) -> Vec<ContextMenuListener> {
        self.listeners.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
