use serde::{Deserialize, Serialize};
use shared::domain::Orientation;

pub const DEFAULT_STORAGE_KEY: &str = "workbench.activity.pinnedViewlets";
pub const DEFAULT_OVERFLOW_ACTION_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarOptions {
    /// Key the pin state is persisted under.
    pub storage_key: String,
    pub orientation: Orientation,
    /// Extent reserved for the overflow indicator.
    pub overflow_action_size: u32,
    pub icon: bool,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            orientation: Orientation::Vertical,
            overflow_action_size: DEFAULT_OVERFLOW_ACTION_SIZE,
            icon: true,
        }
    }
}
