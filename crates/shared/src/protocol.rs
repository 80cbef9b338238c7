//! Persisted shape of the composite pin configuration.
//!
//! Older builds stored a plain array of pinned ids; current builds store an
//! array of `{ "id": ..., "pinned": ... }` objects.

use serde::{Deserialize, Serialize};

use crate::domain::{CompositeId, CompositeState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredCompositeEntry {
    Legacy(CompositeId),
    State(CompositeState),
}

impl StoredCompositeEntry {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Legacy ids were only ever written for pinned composites.
    pub fn into_state(self) -> CompositeState {
        match self {
            Self::Legacy(id) => CompositeState { id, pinned: true },
            Self::State(state) => state,
        }
    }
}

pub fn decode_states(raw: &str) -> serde_json::Result<Vec<StoredCompositeEntry>> {
    serde_json::from_str(raw)
}

pub fn encode_states(states: &[CompositeState]) -> serde_json::Result<String> {
    serde_json::to_string(states)
}
