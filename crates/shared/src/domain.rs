use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(CompositeId);

/// A launchable panel or view known to the bar.
///
/// `order` is a stable sort key, not a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeDescriptor {
    pub id: CompositeId,
    pub name: String,
    pub order: i32,
}

impl CompositeDescriptor {
    pub fn new(id: impl Into<CompositeId>, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeState {
    pub id: CompositeId,
    pub pinned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero extent in either direction means the bar is not on screen.
    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Extent along the bar's main axis.
    pub fn main_axis(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Badge {
    Number { value: u32, label: String },
    Text { text: String, label: String },
    Icon { label: String },
    Progress { label: String },
}

impl Badge {
    pub fn label(&self) -> &str {
        match self {
            Self::Number { label, .. }
            | Self::Text { label, .. }
            | Self::Icon { label }
            | Self::Progress { label } => label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Pointer event that opened a context menu over the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    pub button: PointerButton,
}
