//! Persisted pin configuration: loading, legacy migration and saving.

use std::sync::Arc;

use shared::{
    domain::{CompositeId, CompositeState},
    error::{BarError, BarResult},
    protocol::{self, StoredCompositeEntry},
};
use storage::StateBackend;
use tracing::{debug, warn};

use crate::registry::CompositeRegistry;

/// Pin states as read at startup, after migration and merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedStates {
    pub states: Vec<CompositeState>,
    /// Stored data was a bare id list written by an older build.
    pub legacy: bool,
}

impl LoadedStates {
    pub fn get(&self, id: &CompositeId) -> Option<&CompositeState> {
        self.states.iter().find(|state| &state.id == id)
    }

    pub fn position(&self, id: &CompositeId) -> Option<usize> {
        self.states.iter().position(|state| &state.id == id)
    }

    pub fn pinned_ids(&self) -> impl Iterator<Item = &CompositeId> {
        self.states
            .iter()
            .filter(|state| state.pinned)
            .map(|state| &state.id)
    }
}

pub struct PinStateStore {
    key: String,
    backend: Arc<dyn StateBackend>,
}

impl PinStateStore {
    pub fn new(key: impl Into<String>, backend: Arc<dyn StateBackend>) -> Self {
        Self {
            key: key.into(),
            backend,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self, registry: &CompositeRegistry) -> BarResult<LoadedStates> {
        let raw = self
            .backend
            .get(&self.key)
            .await
            .map_err(|source| BarError::Persistence {
                key: self.key.clone(),
                source,
            })?;

        match decode(&self.key, raw.as_deref(), registry) {
            Ok(loaded) => Ok(loaded),
            Err(err) => {
                warn!(storage_key = %self.key, error = %err, "discarding malformed pin state");
                Ok(decode(&self.key, None, registry)?)
            }
        }
    }

    pub async fn save(&self, states: &[CompositeState]) -> BarResult<()> {
        let raw = protocol::encode_states(states).map_err(|source| BarError::MalformedState {
            key: self.key.clone(),
            source,
        })?;
        self.backend
            .set(&self.key, &raw)
            .await
            .map_err(|source| BarError::Persistence {
                key: self.key.clone(),
                source,
            })?;
        debug!(storage_key = %self.key, entries = states.len(), "saved pin state");
        Ok(())
    }
}

/// Decodes stored pin state, defaulting to an empty list when nothing is stored.
///
/// Modern data gets every registered composite it does not mention appended
/// as pinned, sorted by declared order. Legacy data is returned as-is.
pub fn decode(
    key: &str,
    raw: Option<&str>,
    registry: &CompositeRegistry,
) -> BarResult<LoadedStates> {
    let entries = protocol::decode_states(raw.unwrap_or("[]")).map_err(|source| {
        BarError::MalformedState {
            key: key.to_string(),
            source,
        }
    })?;

    let legacy = entries.first().is_some_and(StoredCompositeEntry::is_legacy);
    let mut states: Vec<CompositeState> = entries
        .into_iter()
        .map(StoredCompositeEntry::into_state)
        .collect();

    if legacy {
        debug!(storage_key = key, entries = states.len(), "migrating legacy pin state");
    } else {
        let mut unseen: Vec<_> = registry
            .iter()
            .filter(|descriptor| states.iter().all(|state| state.id != descriptor.id))
            .collect();
        unseen.sort_by_key(|descriptor| descriptor.order);
        states.extend(unseen.into_iter().map(|descriptor| CompositeState {
            id: descriptor.id.clone(),
            pinned: true,
        }));
    }

    Ok(LoadedStates { states, legacy })
}

/// One entry per registered composite: pinned ids in pin order, then the rest
/// in registration order.
pub fn snapshot(pinned: &[CompositeId], registry: &CompositeRegistry) -> Vec<CompositeState> {
    let mut states: Vec<CompositeState> = pinned
        .iter()
        .filter(|id| registry.contains(id))
        .map(|id| CompositeState {
            id: id.clone(),
            pinned: true,
        })
        .collect();
    states.extend(
        registry
            .ids()
            .filter(|id| !pinned.contains(id))
            .map(|id| CompositeState {
                id: id.clone(),
                pinned: false,
            }),
    );
    states
}
