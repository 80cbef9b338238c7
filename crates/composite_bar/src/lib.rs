//! Composite bar controller: decides which composites (view and panel
//! launchers) are shown in a fixed-size strip, which are pinned, which spill
//! into the overflow menu, and which activity badge each one displays.

pub mod activity;
mod controller;
pub mod events;
pub mod host;
mod in_flight;
pub mod layout;
pub mod options;
pub mod pin_state;
pub mod registry;

pub use activity::{Activity, ActivityBadgeStack};
pub use controller::{ActivityHandle, CompositeBar, PinOptions, UnpinResolution};
pub use events::SubscriptionId;
pub use host::{
    ActivityAction, CompositeHost, DragSource, EntryAction, OverflowMenuEntry, RenderSurface,
    SurfaceEntry,
};
pub use layout::{LayoutInput, LayoutPlan, SizeCache};
pub use options::BarOptions;
pub use shared::error::{BarError, BarResult, ErrorCode};
