//! Packing of composites into a strip of fixed extent.

use indexmap::IndexMap;
use shared::domain::CompositeId;
use tracing::debug;

/// Measured extent of each composite along the bar's main axis.
///
/// Entries are only ever added; a measured composite keeps its size until the
/// cache is cleared.
#[derive(Debug, Clone, Default)]
pub struct SizeCache {
    sizes: IndexMap<CompositeId, u32>,
}

impl SizeCache {
    pub fn get(&self, id: &CompositeId) -> Option<u32> {
        self.sizes.get(id).copied()
    }

    /// Records a measurement unless one already exists.
    pub fn record(&mut self, id: &CompositeId, size: u32) -> bool {
        if self.sizes.contains_key(id) {
            return false;
        }
        self.sizes.insert(id.clone(), size);
        true
    }

    pub fn contains(&self, id: &CompositeId) -> bool {
        self.sizes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    fn size_of(&self, id: &CompositeId) -> u64 {
        u64::from(self.get(id).unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub pinned: &'a [CompositeId],
    pub active: Option<&'a CompositeId>,
    /// Active composite that is not pinned; always the last candidate.
    pub active_unpinned: Option<&'a CompositeId>,
    pub sizes: &'a SizeCache,
    pub limit: u32,
    pub overflow_action_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub shown: Vec<CompositeId>,
    /// Some candidates did not fit and are only reachable from the overflow menu.
    pub overflows: bool,
}

pub fn compute_visible(input: &LayoutInput<'_>) -> LayoutPlan {
    let sizes = input.sizes;
    let limit = u64::from(input.limit);

    let mut shown: Vec<CompositeId> = input.pinned.to_vec();
    if let Some(unpinned) = input.active_unpinned {
        shown.push(unpinned.clone());
    }

    let mut max_visible = shown.len();
    let mut size = 0u64;
    let mut index = 0;
    while index < shown.len() && size <= limit {
        size += sizes.size_of(&shown[index]);
        if size > limit {
            max_visible = index;
        }
        index += 1;
    }

    let overflows = shown.len() > max_visible;
    if overflows {
        size -= sizes.size_of(&shown[max_visible]);
        shown.truncate(max_visible);
        size += u64::from(input.overflow_action_size);
    }

    // Make room for the overflow indicator.
    if size > limit {
        if let Some(last) = shown.pop() {
            size -= sizes.size_of(&last);
        }
    }

    if let Some(active) = input.active {
        if !shown.is_empty() && !shown.contains(active) {
            if let Some(evicted) = shown.pop() {
                size = size + sizes.size_of(active) - sizes.size_of(&evicted);
            }
            shown.push(active.clone());
        }
    }

    // The active composite may be larger than the one it replaced.
    if size > limit {
        if shown.len() >= 2 {
            shown.remove(shown.len() - 2);
        } else {
            shown.pop();
        }
    }

    debug!(
        limit = input.limit,
        shown = shown.len(),
        overflows,
        "computed composite bar packing"
    );
    LayoutPlan { shown, overflows }
}

/// Difference between what the surface shows and what it should show.
///
/// Everything from the first differing position onwards is rebuilt so the
/// surface order always matches the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityDelta {
    pub kept: usize,
    pub torn_down: Vec<CompositeId>,
    pub added: Vec<CompositeId>,
}

impl VisibilityDelta {
    pub fn between<'a>(
        current: impl IntoIterator<Item = &'a CompositeId>,
        target: &[CompositeId],
    ) -> Self {
        let current: Vec<&CompositeId> = current.into_iter().collect();
        let kept = current
            .iter()
            .zip(target)
            .take_while(|(shown, wanted)| **shown == *wanted)
            .count();
        Self {
            kept,
            torn_down: current[kept..].iter().map(|id| (*id).clone()).collect(),
            added: target[kept..].to_vec(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.torn_down.is_empty() || !self.added.is_empty()
    }
}
