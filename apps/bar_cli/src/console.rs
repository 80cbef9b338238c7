//! Terminal-backed host and surface for driving the bar from the command line.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use composite_bar::{
    ActivityAction, CompositeHost, EntryAction, OverflowMenuEntry, RenderSurface, SurfaceEntry,
};
use parking_lot::Mutex;
use shared::domain::{Badge, CompositeId, Orientation};
use tracing::{debug, info};

/// Which shown entry is highlighted as active.
type ActiveMarker = Arc<Mutex<Option<CompositeId>>>;

pub struct ConsoleHost {
    default_id: CompositeId,
    active: ActiveMarker,
}

impl ConsoleHost {
    pub fn new(default_id: impl Into<CompositeId>) -> Self {
        Self {
            default_id: default_id.into(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn active_marker(&self) -> Option<CompositeId> {
        self.active.lock().clone()
    }
}

#[async_trait]
impl CompositeHost for ConsoleHost {
    async fn open_composite(&self, id: &CompositeId) -> anyhow::Result<()> {
        info!(composite_id = %id, "opening composite");
        Ok(())
    }

    async fn hide_part(&self) -> anyhow::Result<()> {
        info!("hiding composite bar part");
        Ok(())
    }

    fn default_composite_id(&self) -> CompositeId {
        self.default_id.clone()
    }

    fn activity_action(&self, id: &CompositeId) -> Box<dyn ActivityAction> {
        Box::new(ConsoleActivity {
            id: id.clone(),
            active: self.active.clone(),
        })
    }

    fn pinned_action(&self, id: &CompositeId) -> Box<dyn EntryAction> {
        Box::new(LogAction {
            id: id.clone(),
            kind: "toggle pinned",
        })
    }

    fn click_action(&self, id: &CompositeId) -> Box<dyn EntryAction> {
        Box::new(LogAction {
            id: id.clone(),
            kind: "open",
        })
    }
}

struct ConsoleActivity {
    id: CompositeId,
    active: ActiveMarker,
}

impl ActivityAction for ConsoleActivity {
    fn activate(&mut self) {
        *self.active.lock() = Some(self.id.clone());
    }

    fn deactivate(&mut self) {
        let mut active = self.active.lock();
        if active.as_ref() == Some(&self.id) {
            *active = None;
        }
    }

    fn set_badge(&mut self, badge: Option<&Badge>, class: Option<&str>) {
        debug!(
            composite_id = %self.id,
            badge = badge.map(Badge::label),
            class,
            "badge updated"
        );
    }
}

struct LogAction {
    id: CompositeId,
    kind: &'static str,
}

impl EntryAction for LogAction {
    fn run(&mut self) {
        info!(composite_id = %self.id, action = self.kind, "entry action");
    }
}

/// Attached entries, readable after the surface moved into the bar.
pub type SharedEntries = Arc<Mutex<Vec<SurfaceEntry>>>;

pub struct TextSurface {
    sizes: HashMap<CompositeId, u32>,
    names: HashMap<CompositeId, String>,
    overflow_size: u32,
    entries: SharedEntries,
}

impl TextSurface {
    pub fn new(
        composites: impl IntoIterator<Item = (CompositeId, String, u32)>,
        overflow_size: u32,
    ) -> (Self, SharedEntries) {
        let mut sizes = HashMap::new();
        let mut names = HashMap::new();
        for (id, name, size) in composites {
            sizes.insert(id.clone(), size);
            names.insert(id, name);
        }
        let entries = SharedEntries::default();
        let surface = Self {
            sizes,
            names,
            overflow_size,
            entries: entries.clone(),
        };
        (surface, entries)
    }

    pub fn label(&self, id: &CompositeId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl RenderSurface for TextSurface {
    fn push(&mut self, entries: Vec<SurfaceEntry>) {
        self.entries.lock().extend(entries);
    }

    fn pull(&mut self, index: usize) {
        let mut entries = self.entries.lock();
        if index < entries.len() {
            entries.remove(index);
        }
    }

    fn clear(&mut self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn extent(&self, index: usize, _orientation: Orientation) -> u32 {
        match self.entries.lock().get(index) {
            Some(SurfaceEntry::Composite { id, .. }) | Some(SurfaceEntry::Probe(id)) => {
                self.sizes.get(id).copied().unwrap_or_default()
            }
            Some(SurfaceEntry::Overflow) => self.overflow_size,
            None => 0,
        }
    }

    fn show_overflow_menu(&mut self, entries: &[OverflowMenuEntry]) {
        for entry in entries {
            println!(
                "  {} {}{}",
                if entry.active { "*" } else { "-" },
                self.label(&entry.id),
                entry
                    .badge
                    .as_ref()
                    .map(|badge| format!(" [{}]", badge.label()))
                    .unwrap_or_default()
            );
        }
    }
}

/// One line per attached entry; `*` marks the active composite.
pub fn render(entries: &SharedEntries, active: Option<&CompositeId>) -> Vec<String> {
    entries
        .lock()
        .iter()
        .map(|entry| match entry {
            SurfaceEntry::Composite { id, .. } if Some(id) == active => format!("* {id}"),
            SurfaceEntry::Composite { id, .. } => format!("  {id}"),
            SurfaceEntry::Probe(id) => format!("? {id}"),
            SurfaceEntry::Overflow => "  ...".to_string(),
        })
        .collect()
}
