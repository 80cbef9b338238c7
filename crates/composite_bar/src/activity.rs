//! Per-composite stacks of pending activity badges.

use indexmap::IndexMap;
use shared::domain::{Badge, CompositeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub badge: Badge,
    pub class: Option<String>,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityRecordId(u64);

#[derive(Debug)]
struct ActivityRecord {
    id: ActivityRecordId,
    activity: Activity,
}

/// Stacks are kept sorted by priority, highest first. A push goes in front of
/// existing entries of the same priority.
#[derive(Debug, Default)]
pub struct ActivityBadgeStack {
    stacks: IndexMap<CompositeId, Vec<ActivityRecord>>,
    next_record: u64,
}

impl ActivityBadgeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, composite_id: &CompositeId, activity: Activity) -> ActivityRecordId {
        let id = ActivityRecordId(self.next_record);
        self.next_record += 1;

        let stack = self.stacks.entry(composite_id.clone()).or_default();
        let index = stack
            .iter()
            .position(|record| record.activity.priority <= activity.priority)
            .unwrap_or(stack.len());
        stack.insert(index, ActivityRecord { id, activity });
        id
    }

    /// Removes exactly the given record. Empty stacks are dropped.
    pub fn remove(&mut self, composite_id: &CompositeId, record: ActivityRecordId) -> bool {
        let Some(stack) = self.stacks.get_mut(composite_id) else {
            return false;
        };
        let Some(index) = stack.iter().position(|entry| entry.id == record) else {
            return false;
        };
        stack.remove(index);
        if stack.is_empty() {
            self.stacks.shift_remove(composite_id);
        }
        true
    }

    /// The activity currently displayed for a composite.
    pub fn top(&self, composite_id: &CompositeId) -> Option<&Activity> {
        self.stacks
            .get(composite_id)
            .and_then(|stack| stack.first())
            .map(|record| &record.activity)
    }

    pub fn depth(&self, composite_id: &CompositeId) -> usize {
        self.stacks.get(composite_id).map_or(0, Vec::len)
    }

    pub fn has_stack(&self, composite_id: &CompositeId) -> bool {
        self.stacks.contains_key(composite_id)
    }

    pub fn clear(&mut self, composite_id: &CompositeId) -> usize {
        self.stacks
            .shift_remove(composite_id)
            .map_or(0, |stack| stack.len())
    }
}
