//! Capabilities the hosting workbench provides to the bar.

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Badge, CompositeId, Orientation};

/// Workbench-side services the bar depends on.
///
/// The action factories and every method of the actions they return are
/// called while the bar holds its state lock. They must not call back into
/// the `CompositeBar` synchronously; doing so deadlocks. Schedule such work
/// on the runtime instead.
#[async_trait]
pub trait CompositeHost: Send + Sync {
    /// Shows the composite's content pane. May load content first.
    async fn open_composite(&self, id: &CompositeId) -> Result<()>;
    /// Hides the whole region hosting the bar.
    async fn hide_part(&self) -> Result<()>;
    fn default_composite_id(&self) -> CompositeId;

    fn activity_action(&self, id: &CompositeId) -> Box<dyn ActivityAction>;
    fn pinned_action(&self, id: &CompositeId) -> Box<dyn EntryAction>;
    fn click_action(&self, id: &CompositeId) -> Box<dyn EntryAction>;
}

/// The widget state of one shown composite.
pub trait ActivityAction: Send {
    fn activate(&mut self);
    fn deactivate(&mut self);
    /// `None` clears the badge.
    fn set_badge(&mut self, badge: Option<&Badge>, class: Option<&str>);
    fn dispose(&mut self) {}
}

pub trait EntryAction: Send {
    fn run(&mut self);
    fn dispose(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEntry {
    Composite { id: CompositeId, label: bool, icon: bool },
    /// Temporary entry attached only to measure a composite.
    Probe(CompositeId),
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowMenuEntry {
    pub id: CompositeId,
    pub name: String,
    pub active: bool,
    pub badge: Option<Badge>,
}

/// The strip the bar draws into. Indices are positions in attach order.
pub trait RenderSurface: Send {
    fn push(&mut self, entries: Vec<SurfaceEntry>);
    fn pull(&mut self, index: usize);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Rendered extent of the entry at `index` along `orientation`.
    fn extent(&self, index: usize, orientation: Orientation) -> u32;
    fn show_overflow_menu(&mut self, entries: &[OverflowMenuEntry]);
}

/// Source of the composite currently being dragged, if any.
pub trait DragSource: Send + Sync {
    fn dragged_composite_id(&self) -> Option<CompositeId>;
    fn clear_dragged_composite(&self);
}
