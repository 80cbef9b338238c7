//! Live set of composites known to the bar.

use indexmap::IndexMap;
use shared::domain::{CompositeDescriptor, CompositeId};

#[derive(Debug, Clone, Default)]
pub struct CompositeRegistry {
    composites: IndexMap<CompositeId, CompositeDescriptor>,
}

impl CompositeRegistry {
    /// Builds a registry in registration order. Later duplicates of an id are ignored.
    pub fn new(composites: impl IntoIterator<Item = CompositeDescriptor>) -> Self {
        let mut registry = Self::default();
        for descriptor in composites {
            registry.add(descriptor);
        }
        registry
    }

    /// Returns `false` when the id is already registered.
    pub fn add(&mut self, descriptor: CompositeDescriptor) -> bool {
        if self.composites.contains_key(&descriptor.id) {
            return false;
        }
        self.composites.insert(descriptor.id.clone(), descriptor);
        true
    }

    pub fn remove(&mut self, id: &CompositeId) -> Option<CompositeDescriptor> {
        self.composites.shift_remove(id)
    }

    pub fn contains(&self, id: &CompositeId) -> bool {
        self.composites.contains_key(id)
    }

    pub fn get(&self, id: &CompositeId) -> Option<&CompositeDescriptor> {
        self.composites.get(id)
    }

    pub fn order_of(&self, id: &CompositeId) -> Option<i32> {
        self.composites.get(id).map(|descriptor| descriptor.order)
    }

    /// Registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CompositeDescriptor> {
        self.composites.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &CompositeId> {
        self.composites.keys()
    }

    /// Sorted by declared order; ties keep registration order.
    pub fn list(&self) -> Vec<&CompositeDescriptor> {
        let mut list: Vec<_> = self.composites.values().collect();
        list.sort_by_key(|descriptor| descriptor.order);
        list
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }
}
