//! Serializes pin-state operations per composite id.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use shared::domain::CompositeId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Default)]
pub struct InFlightOperations {
    slots: Arc<Mutex<IndexMap<CompositeId, Slot>>>,
}

impl InFlightOperations {
    /// Waits until no other operation holds `id`, then holds it until the token drops.
    pub async fn acquire(&self, id: &CompositeId) -> InFlightToken {
        let slot = self
            .slots
            .lock()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let guard = slot.lock_owned().await;
        InFlightToken {
            id: id.clone(),
            slots: Arc::clone(&self.slots),
            guard: Some(guard),
        }
    }

    pub fn is_in_flight(&self, id: &CompositeId) -> bool {
        self.slots
            .lock()
            .get(id)
            .is_some_and(|slot| slot.try_lock().is_err())
    }
}

pub struct InFlightToken {
    id: CompositeId,
    slots: Arc<Mutex<IndexMap<CompositeId, Slot>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self.slots.lock();
        // Only the map still refers to the slot: nobody is queued behind us.
        if slots
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.shift_remove(&self.id);
        }
    }
}
