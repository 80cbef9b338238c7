//! The composite bar: pin state, activation, activity badges and overflow
//! packing wired together over a host-provided rendering surface.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use shared::{
    domain::{Badge, CompositeDescriptor, CompositeId, CompositeState, Dimension, PointerEvent},
    error::{BarError, BarResult},
};
use storage::StateBackend;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    activity::{Activity, ActivityBadgeStack, ActivityRecordId},
    events::{ContextMenuEmitter, SubscriptionId},
    host::{
        ActivityAction, CompositeHost, DragSource, EntryAction, OverflowMenuEntry, RenderSurface,
        SurfaceEntry,
    },
    in_flight::InFlightOperations,
    layout::{self, LayoutInput, SizeCache, VisibilityDelta},
    options::BarOptions,
    pin_state::{self, LoadedStates, PinStateStore},
    registry::CompositeRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinOptions {
    /// Recompute the shown entries right away.
    pub update: bool,
    /// Position in the pinned order; `None` appends.
    pub index: Option<usize>,
    /// Open the composite before it appears as pinned.
    pub activate: bool,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            update: true,
            index: None,
            activate: true,
        }
    }
}

/// What the host has to do when a composite is unpinned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpinResolution {
    Keep,
    OpenComposite(CompositeId),
    HidePart,
}

impl UnpinResolution {
    /// `visible` is the shown set before the unpin took effect.
    pub fn decide(
        unpinned: &CompositeId,
        active: Option<&CompositeId>,
        default_id: &CompositeId,
        default_pinned: bool,
        visible: &[CompositeId],
    ) -> Self {
        if active != Some(unpinned) {
            return Self::Keep;
        }
        if default_id != unpinned && default_pinned {
            return Self::OpenComposite(default_id.clone());
        }
        if visible.len() <= 1 {
            return Self::HidePart;
        }
        visible
            .iter()
            .find(|id| *id != unpinned)
            .map_or(Self::HidePart, |next| Self::OpenComposite(next.clone()))
    }
}

struct CompositeEntry {
    activity: Box<dyn ActivityAction>,
    pinned: Box<dyn EntryAction>,
    click: Box<dyn EntryAction>,
}

impl CompositeEntry {
    fn dispose(mut self) {
        self.activity.dispose();
        self.pinned.dispose();
        self.click.dispose();
    }
}

struct BarState {
    registry: CompositeRegistry,
    initial_states: LoadedStates,
    pinned: Vec<CompositeId>,
    active: Option<CompositeId>,
    active_unpinned: Option<CompositeId>,
    /// Shown composites in surface order.
    entries: IndexMap<CompositeId, CompositeEntry>,
    overflow_shown: bool,
    activities: ActivityBadgeStack,
    sizes: SizeCache,
    dimension: Option<Dimension>,
    surface: Box<dyn RenderSurface>,
}

impl BarState {
    fn is_pinned(&self, id: &CompositeId) -> bool {
        self.pinned.contains(id)
    }

    fn snapshot(&self) -> Vec<CompositeState> {
        pin_state::snapshot(&self.pinned, &self.registry)
    }

    fn refresh(&mut self, options: &BarOptions, host: &dyn CompositeHost) {
        let Some(dimension) = self.dimension else {
            return;
        };
        if !dimension.is_visible() {
            return;
        }
        self.ensure_measured(options);

        let active = self
            .active
            .clone()
            .filter(|id| self.registry.contains(id));
        let active_unpinned = active.clone().filter(|id| !self.pinned.contains(id));
        self.active_unpinned = active_unpinned;

        let plan = layout::compute_visible(&LayoutInput {
            pinned: &self.pinned,
            active: active.as_ref(),
            active_unpinned: self.active_unpinned.as_ref(),
            sizes: &self.sizes,
            limit: dimension.main_axis(options.orientation),
            overflow_action_size: options.overflow_action_size,
        });
        let delta = VisibilityDelta::between(self.entries.keys(), &plan.shown);

        // The indicator always sits last, so take it out before rebuilding.
        if self.overflow_shown && (delta.changed() || !plan.overflows) {
            let last = self.surface.len().saturating_sub(1);
            self.surface.pull(last);
            self.overflow_shown = false;
        }

        for id in delta.torn_down.iter().rev() {
            self.pull_composite(id);
        }

        if !delta.added.is_empty() {
            let mut attached = Vec::with_capacity(delta.added.len());
            for id in &delta.added {
                let entry = CompositeEntry {
                    activity: host.activity_action(id),
                    pinned: host.pinned_action(id),
                    click: host.click_action(id),
                };
                self.entries.insert(id.clone(), entry);
                attached.push(SurfaceEntry::Composite {
                    id: id.clone(),
                    label: true,
                    icon: options.icon,
                });
            }
            self.surface.push(attached);

            if let Some(active) = &self.active {
                if let Some(entry) = self.entries.get_mut(active) {
                    entry.activity.activate();
                }
            }

            let shown: Vec<CompositeId> = self.entries.keys().cloned().collect();
            for id in &shown {
                self.apply_badge(id);
            }
        }

        if !self.overflow_shown && (plan.overflows || self.surface.is_empty()) {
            self.surface.push(vec![SurfaceEntry::Overflow]);
            self.overflow_shown = true;
        }
    }

    /// Probes every registered composite without a recorded size.
    fn ensure_measured(&mut self, options: &BarOptions) {
        let missing: Vec<CompositeId> = self
            .registry
            .ids()
            .filter(|id| !self.sizes.contains(id))
            .cloned()
            .collect();
        if missing.is_empty() {
            return;
        }

        let base = self.surface.len();
        self.surface
            .push(missing.iter().cloned().map(SurfaceEntry::Probe).collect());
        for (offset, id) in missing.iter().enumerate() {
            let extent = self.surface.extent(base + offset, options.orientation);
            self.sizes.record(id, extent);
        }
        for offset in (0..missing.len()).rev() {
            self.surface.pull(base + offset);
        }
        debug!(measured = missing.len(), "measured composite sizes");
    }

    fn pull_composite(&mut self, id: &CompositeId) {
        let Some(index) = self.entries.get_index_of(id) else {
            return;
        };
        self.surface.pull(index);
        if let Some(entry) = self.entries.shift_remove(id) {
            entry.dispose();
        }
    }

    fn apply_badge(&mut self, id: &CompositeId) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        match self.activities.top(id) {
            Some(activity) => entry
                .activity
                .set_badge(Some(&activity.badge), activity.class.as_deref()),
            None => entry.activity.set_badge(None, None),
        }
    }

    fn overflowing_composites(&self) -> Vec<CompositeDescriptor> {
        let mut overflowing: Vec<&CompositeId> = self.pinned.iter().collect();
        if let Some(unpinned) = &self.active_unpinned {
            overflowing.push(unpinned);
        }
        overflowing.retain(|id| !self.entries.contains_key(*id));
        self.registry
            .iter()
            .filter(|descriptor| overflowing.contains(&&descriptor.id))
            .cloned()
            .collect()
    }

    fn pinned_position_by_order(&self, order: i32) -> usize {
        self.pinned
            .iter()
            .position(|id| self.registry.order_of(id).is_some_and(|other| other > order))
            .unwrap_or(self.pinned.len())
    }

    fn pinned_position_by_persisted(&self, persisted: usize) -> usize {
        self.pinned
            .iter()
            .position(|id| {
                self.initial_states
                    .position(id)
                    .map_or(true, |other| other > persisted)
            })
            .unwrap_or(self.pinned.len())
    }
}

struct BarShared {
    options: BarOptions,
    host: Arc<dyn CompositeHost>,
    pin_store: PinStateStore,
    state: Mutex<BarState>,
    in_flight: InFlightOperations,
    context_menu: Mutex<ContextMenuEmitter>,
    deferred: Mutex<Vec<JoinHandle<()>>>,
}

impl BarShared {
    fn refresh(&self) {
        self.state
            .lock()
            .refresh(&self.options, self.host.as_ref());
    }

    async fn persist(&self) -> BarResult<()> {
        let snapshot = self.state.lock().snapshot();
        self.pin_store.save(&snapshot).await
    }

    async fn open(&self, id: &CompositeId) -> BarResult<()> {
        self.host
            .open_composite(id)
            .await
            .map_err(|source| BarError::Host {
                operation: "open composite",
                source,
            })
    }
}

/// Handle to a displayed activity. Disposing removes exactly this activity,
/// wherever it sits in its composite's stack.
#[derive(Debug)]
#[must_use = "the activity stays displayed until the handle is disposed"]
pub struct ActivityHandle {
    composite_id: CompositeId,
    record: ActivityRecordId,
    owner: Weak<BarShared>,
    disposed: bool,
}

impl ActivityHandle {
    pub fn composite_id(&self) -> &CompositeId {
        &self.composite_id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }
        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        let mut state = owner.state.lock();
        if state.activities.remove(&self.composite_id, self.record) {
            state.apply_badge(&self.composite_id);
        }
    }
}

#[derive(Clone)]
pub struct CompositeBar {
    shared: Arc<BarShared>,
}

impl CompositeBar {
    pub async fn new(
        options: BarOptions,
        composites: Vec<CompositeDescriptor>,
        host: Arc<dyn CompositeHost>,
        surface: Box<dyn RenderSurface>,
        backend: Arc<dyn StateBackend>,
    ) -> BarResult<Self> {
        let registry = CompositeRegistry::new(composites);
        let pin_store = PinStateStore::new(options.storage_key.clone(), backend);
        let initial_states = pin_store.load(&registry).await?;
        let pinned = initial_pinned(&initial_states, &registry);

        info!(
            storage_key = %options.storage_key,
            composites = registry.len(),
            pinned = pinned.len(),
            legacy = initial_states.legacy,
            "loaded composite bar state"
        );

        let state = BarState {
            registry,
            initial_states,
            pinned,
            active: None,
            active_unpinned: None,
            entries: IndexMap::new(),
            overflow_shown: false,
            activities: ActivityBadgeStack::new(),
            sizes: SizeCache::default(),
            dimension: None,
            surface,
        };

        Ok(Self {
            shared: Arc::new(BarShared {
                options,
                host,
                pin_store,
                state: Mutex::new(state),
                in_flight: InFlightOperations::default(),
                context_menu: Mutex::new(ContextMenuEmitter::default()),
                deferred: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn options(&self) -> &BarOptions {
        &self.shared.options
    }

    pub fn is_pinned(&self, id: &CompositeId) -> bool {
        self.shared.state.lock().is_pinned(id)
    }

    pub fn pinned_composites(&self) -> Vec<CompositeId> {
        self.shared.state.lock().pinned.clone()
    }

    /// Composites currently attached to the surface, in order.
    pub fn visible_composites(&self) -> Vec<CompositeId> {
        self.shared.state.lock().entries.keys().cloned().collect()
    }

    pub fn active_composite_id(&self) -> Option<CompositeId> {
        self.shared.state.lock().active.clone()
    }

    /// Registered composites sorted by declared order.
    pub fn composites(&self) -> Vec<CompositeDescriptor> {
        self.shared
            .state
            .lock()
            .registry
            .list()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn overflowing_composites(&self) -> Vec<CompositeDescriptor> {
        self.shared.state.lock().overflowing_composites()
    }

    pub fn activity(&self, id: &CompositeId) -> Option<Activity> {
        self.shared.state.lock().activities.top(id).cloned()
    }

    pub fn measured_size(&self, id: &CompositeId) -> Option<u32> {
        self.shared.state.lock().sizes.get(id)
    }

    pub fn is_in_flight(&self, id: &CompositeId) -> bool {
        self.shared.in_flight.is_in_flight(id)
    }

    pub async fn add_composite(
        &self,
        descriptor: CompositeDescriptor,
        activate: bool,
    ) -> BarResult<()> {
        let id = descriptor.id.clone();
        let order = descriptor.order;
        let _token = self.shared.in_flight.acquire(&id).await;

        let index = {
            let mut state = self.shared.state.lock();
            if !state.registry.add(descriptor) {
                return Ok(());
            }
            match state.initial_states.get(&id) {
                // New composites are pinned by default.
                None => Some(state.pinned_position_by_order(order)),
                Some(stored) if stored.pinned => state
                    .initial_states
                    .position(&id)
                    .map(|persisted| state.pinned_position_by_persisted(persisted)),
                Some(_) => None,
            }
        };
        debug!(composite_id = %id, pinned = index.is_some(), "added composite");

        if let Some(index) = index {
            self.pin_unguarded(
                &id,
                PinOptions {
                    update: true,
                    index: Some(index),
                    activate,
                },
            )
            .await?;
        }
        Ok(())
    }

    pub async fn remove_composite(&self, id: &CompositeId) -> BarResult<()> {
        let _token = self.shared.in_flight.acquire(id).await;
        {
            let mut state = self.shared.state.lock();
            if state.registry.remove(id).is_none() {
                return Ok(());
            }
            state.activities.clear(id);
        }

        self.unpin_unguarded(id).await?;
        self.shared.state.lock().pull_composite(id);
        // Last, so the unpin and pull above see the composite as active.
        self.deactivate_composite(id);
        info!(composite_id = %id, "removed composite");
        Ok(())
    }

    pub fn activate_composite(&self, id: &CompositeId) {
        let mut state = self.shared.state.lock();
        if let Some(previous) = state.active.take() {
            if &previous != id {
                if let Some(entry) = state.entries.get_mut(&previous) {
                    entry.activity.deactivate();
                }
            }
        }
        if let Some(entry) = state.entries.get_mut(id) {
            entry.activity.activate();
        }
        state.active = Some(id.clone());

        let unpinned_should_close = state
            .active_unpinned
            .as_ref()
            .is_some_and(|unpinned| unpinned != id);
        let unpinned_should_show = !state.is_pinned(id);
        if unpinned_should_close || unpinned_should_show {
            state.refresh(&self.shared.options, self.shared.host.as_ref());
        }
    }

    pub fn deactivate_composite(&self, id: &CompositeId) {
        let mut state = self.shared.state.lock();
        if let Some(entry) = state.entries.get_mut(id) {
            entry.activity.deactivate();
        }
        if state.active.as_ref() == Some(id) {
            state.active = None;
        }
        if state.active_unpinned.as_ref() == Some(id) {
            state.refresh(&self.shared.options, self.shared.host.as_ref());
            state.active_unpinned = None;
        }
    }

    /// Shows `badge` on the composite until the returned handle is disposed.
    ///
    /// Higher `priority` wins; ties go to the most recent activity.
    pub fn show_activity(
        &self,
        id: &CompositeId,
        badge: Option<Badge>,
        class: Option<String>,
        priority: Option<i32>,
    ) -> BarResult<ActivityHandle> {
        let badge = badge.ok_or_else(|| BarError::invalid_argument("badge"))?;
        let mut state = self.shared.state.lock();
        let record = state.activities.push(
            id,
            Activity {
                badge,
                class,
                priority: priority.unwrap_or(0),
            },
        );
        state.apply_badge(id);

        Ok(ActivityHandle {
            composite_id: id.clone(),
            record,
            owner: Arc::downgrade(&self.shared),
            disposed: false,
        })
    }

    pub async fn pin(&self, id: &CompositeId) -> BarResult<()> {
        self.pin_with(id, PinOptions::default()).await
    }

    pub async fn pin_with(&self, id: &CompositeId, options: PinOptions) -> BarResult<()> {
        let _token = self.shared.in_flight.acquire(id).await;
        self.pin_unguarded(id, options).await
    }

    async fn pin_unguarded(&self, id: &CompositeId, options: PinOptions) -> BarResult<()> {
        {
            let state = self.shared.state.lock();
            if !state.registry.contains(id) || state.is_pinned(id) {
                return Ok(());
            }
        }

        // Open first so the entry never shows before its content is ready.
        if options.activate {
            self.shared.open(id).await?;
        }

        {
            let mut state = self.shared.state.lock();
            if !state.registry.contains(id) || state.is_pinned(id) {
                return Ok(());
            }
            let index = options
                .index
                .unwrap_or(state.pinned.len())
                .min(state.pinned.len());
            state.pinned.insert(index, id.clone());
            if options.update {
                state.refresh(&self.shared.options, self.shared.host.as_ref());
            }
        }

        info!(composite_id = %id, "pinned composite");
        self.shared.persist().await
    }

    pub async fn unpin(&self, id: &CompositeId) -> BarResult<()> {
        let _token = self.shared.in_flight.acquire(id).await;
        self.unpin_unguarded(id).await
    }

    async fn unpin_unguarded(&self, id: &CompositeId) -> BarResult<()> {
        let default_id = self.shared.host.default_composite_id();
        let resolution = {
            let mut state = self.shared.state.lock();
            let Some(index) = state.pinned.iter().position(|pinned| pinned == id) else {
                return Ok(());
            };
            let visible: Vec<CompositeId> = state.entries.keys().cloned().collect();
            state.pinned.remove(index);
            let default_pinned = state.is_pinned(&default_id);
            UnpinResolution::decide(
                id,
                state.active.as_ref(),
                &default_id,
                default_pinned,
                &visible,
            )
        };
        info!(composite_id = %id, resolution = ?resolution, "unpinned composite");

        self.shared.persist().await?;

        match &resolution {
            UnpinResolution::Keep => {}
            UnpinResolution::OpenComposite(next) => self.shared.open(next).await?,
            UnpinResolution::HidePart => {
                self.shared
                    .host
                    .hide_part()
                    .await
                    .map_err(|source| BarError::Host {
                        operation: "hide part",
                        source,
                    })?;
            }
        }

        // Only now, so the strip never drops the entry before the pane switched.
        self.shared.refresh();
        Ok(())
    }

    /// Moves `id` to the position of `before`, pinning it first if needed.
    ///
    /// The shown entries are rebuilt on a later scheduler tick; call
    /// [`CompositeBar::settle`] to wait for that.
    pub async fn move_composite(&self, id: &CompositeId, before: &CompositeId) -> BarResult<()> {
        {
            let state = self.shared.state.lock();
            if !state.registry.contains(id) || !state.registry.contains(before) {
                return Ok(());
            }
        }

        let _token = self.shared.in_flight.acquire(id).await;
        if !self.is_pinned(id) {
            self.pin_unguarded(
                id,
                PinOptions {
                    update: false,
                    ..PinOptions::default()
                },
            )
            .await?;
        }

        {
            let mut state = self.shared.state.lock();
            let Some(from) = state.pinned.iter().position(|pinned| pinned == id) else {
                return Ok(());
            };
            let target = state.pinned.iter().position(|pinned| pinned == before);
            state.pinned.remove(from);
            let to = target
                .unwrap_or(state.pinned.len())
                .min(state.pinned.len());
            state.pinned.insert(to, id.clone());

            let stale: Vec<CompositeId> = state
                .entries
                .keys()
                .skip(from.min(to))
                .cloned()
                .collect();
            for shown in &stale {
                state.pull_composite(shown);
            }
        }
        info!(composite_id = %id, before = %before, "moved composite");

        self.shared.persist().await?;
        self.schedule_refresh();
        Ok(())
    }

    /// Handles a drop past the last entry: the dragged composite moves to the end.
    pub async fn drop_at_end(&self, drag: &dyn DragSource) -> BarResult<bool> {
        let Some(dragged) = drag.dragged_composite_id() else {
            return Ok(false);
        };
        drag.clear_dragged_composite();

        let (known, pinned, target) = {
            let state = self.shared.state.lock();
            (
                state.registry.contains(&dragged),
                state.is_pinned(&dragged),
                state.pinned.last().cloned(),
            )
        };
        if !known {
            return Ok(false);
        }
        // Pinning appends, which already is the end position.
        if !pinned {
            let _token = self.shared.in_flight.acquire(&dragged).await;
            self.pin_unguarded(
                &dragged,
                PinOptions {
                    update: false,
                    ..PinOptions::default()
                },
            )
            .await?;
            self.schedule_refresh();
            return Ok(true);
        }

        match target {
            Some(target) if target != dragged => {
                self.move_composite(&dragged, &target).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Records the available extent and repacks unless the bar is hidden.
    pub fn layout(&self, dimension: Dimension) {
        let mut state = self.shared.state.lock();
        state.dimension = Some(dimension);
        if !dimension.is_visible() {
            debug!(
                width = dimension.width,
                height = dimension.height,
                "composite bar not visible; skipping layout"
            );
            return;
        }
        state.refresh(&self.shared.options, self.shared.host.as_ref());
    }

    /// Forces every composite to be measured again on the next layout.
    pub fn clear_size_cache(&self) {
        self.shared.state.lock().sizes.clear();
    }

    pub fn show_overflow_menu(&self) -> Vec<OverflowMenuEntry> {
        let mut state = self.shared.state.lock();
        let entries: Vec<OverflowMenuEntry> = state
            .overflowing_composites()
            .into_iter()
            .map(|descriptor| OverflowMenuEntry {
                active: state.active.as_ref() == Some(&descriptor.id),
                badge: state
                    .activities
                    .top(&descriptor.id)
                    .map(|activity| activity.badge.clone()),
                id: descriptor.id,
                name: descriptor.name,
            })
            .collect();
        state.surface.show_overflow_menu(&entries);
        entries
    }

    /// Runs the click action of an overflow menu entry.
    pub fn select_overflow_entry(&self, id: &CompositeId) {
        let mut action = self.shared.host.click_action(id);
        action.run();
        action.dispose();
    }

    /// Runs the click action of a shown entry. Actions run with the bar
    /// locked and must not call back into it synchronously.
    pub fn click(&self, id: &CompositeId) -> bool {
        let mut state = self.shared.state.lock();
        match state.entries.get_mut(id) {
            Some(entry) => {
                entry.click.run();
                true
            }
            None => false,
        }
    }

    pub fn on_context_menu(
        &self,
        listener: impl Fn(&PointerEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.shared.context_menu.lock().subscribe(Arc::new(listener))
    }

    pub fn remove_context_menu_listener(&self, id: SubscriptionId) -> bool {
        self.shared.context_menu.lock().unsubscribe(id)
    }

    /// Forwards a context-menu request to every listener. Returns how many were notified.
    pub fn handle_context_menu(&self, event: PointerEvent) -> usize {
        let listeners = self.shared.context_menu.lock().listeners();
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Waits for deferred visibility updates to finish.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.shared.deferred.lock());
            if pending.is_empty() {
                break;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    warn!(error = %err, "deferred composite bar refresh failed");
                }
            }
        }
    }

    pub async fn shutdown(&self) -> BarResult<()> {
        self.shared.persist().await
    }

    /// Detaches everything from the surface.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        for (_, entry) in state.entries.drain(..) {
            entry.dispose();
        }
        state.overflow_shown = false;
        state.surface.clear();
    }

    fn schedule_refresh(&self) {
        let shared = Arc::downgrade(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            if let Some(shared) = shared.upgrade() {
                shared.refresh();
            }
        });
        let mut deferred = self.shared.deferred.lock();
        deferred.retain(|pending| !pending.is_finished());
        deferred.push(handle);
    }
}

/// Pinned ids at startup. Composites that legacy data never mentioned are
/// pinned by default at their declared-order position.
fn initial_pinned(loaded: &LoadedStates, registry: &CompositeRegistry) -> Vec<CompositeId> {
    let mut pinned: Vec<CompositeId> = Vec::new();
    for id in loaded.pinned_ids() {
        if registry.contains(id) && !pinned.contains(id) {
            pinned.push(id.clone());
        }
    }

    if loaded.legacy {
        for descriptor in registry.list() {
            if loaded.get(&descriptor.id).is_some() {
                continue;
            }
            let index = pinned
                .iter()
                .position(|id| {
                    registry
                        .order_of(id)
                        .is_some_and(|other| other > descriptor.order)
                })
                .unwrap_or(pinned.len());
            pinned.insert(index, descriptor.id.clone());
        }
    }
    pinned
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
