use super::*;
use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::{Orientation, PointerButton},
    error::ErrorCode,
};
use storage::MemoryStateStore;

const KEY: &str = "test.pinned";

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCall {
    Open(String),
    Hide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ActionState {
    active: bool,
    badge: Option<String>,
    class: Option<String>,
    disposed: bool,
    clicks: usize,
}

#[derive(Default)]
struct HostLog {
    calls: Mutex<Vec<HostCall>>,
    actions: Mutex<HashMap<String, ActionState>>,
}

impl HostLog {
    fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    fn action(&self, id: &str) -> ActionState {
        self.actions.lock().get(id).cloned().unwrap_or_default()
    }
}

struct FakeActivityAction {
    id: String,
    log: Arc<HostLog>,
}

impl ActivityAction for FakeActivityAction {
    fn activate(&mut self) {
        self.log.actions.lock().entry(self.id.clone()).or_default().active = true;
    }

    fn deactivate(&mut self) {
        self.log.actions.lock().entry(self.id.clone()).or_default().active = false;
    }

    fn set_badge(&mut self, badge: Option<&Badge>, class: Option<&str>) {
        let mut actions = self.log.actions.lock();
        let state = actions.entry(self.id.clone()).or_default();
        state.badge = badge.map(|badge| badge.label().to_string());
        if let Some(class) = class {
            state.class = Some(class.to_string());
        }
    }

    fn dispose(&mut self) {
        self.log.actions.lock().entry(self.id.clone()).or_default().disposed = true;
    }
}

struct FakeEntryAction {
    id: String,
    log: Arc<HostLog>,
}

impl EntryAction for FakeEntryAction {
    fn run(&mut self) {
        self.log.actions.lock().entry(self.id.clone()).or_default().clicks += 1;
    }
}

struct NoopEntryAction;

impl EntryAction for NoopEntryAction {
    fn run(&mut self) {}
}

struct FakeHost {
    default_id: CompositeId,
    log: Arc<HostLog>,
    yield_on_open: bool,
    fail_open: bool,
}

#[async_trait]
impl CompositeHost for FakeHost {
    async fn open_composite(&self, id: &CompositeId) -> anyhow::Result<()> {
        self.log.calls.lock().push(HostCall::Open(id.to_string()));
        if self.yield_on_open {
            tokio::task::yield_now().await;
        }
        if self.fail_open {
            return Err(anyhow!("content for {id} failed to load"));
        }
        Ok(())
    }

    async fn hide_part(&self) -> anyhow::Result<()> {
        self.log.calls.lock().push(HostCall::Hide);
        Ok(())
    }

    fn default_composite_id(&self) -> CompositeId {
        self.default_id.clone()
    }

    fn activity_action(&self, id: &CompositeId) -> Box<dyn ActivityAction> {
        self.log
            .actions
            .lock()
            .insert(id.to_string(), ActionState::default());
        Box::new(FakeActivityAction {
            id: id.to_string(),
            log: self.log.clone(),
        })
    }

    fn pinned_action(&self, _id: &CompositeId) -> Box<dyn EntryAction> {
        Box::new(NoopEntryAction)
    }

    fn click_action(&self, id: &CompositeId) -> Box<dyn EntryAction> {
        Box::new(FakeEntryAction {
            id: id.to_string(),
            log: self.log.clone(),
        })
    }
}

type SurfaceLog = Arc<Mutex<Vec<SurfaceEntry>>>;

struct FakeSurface {
    sizes: HashMap<String, u32>,
    entries: SurfaceLog,
    menus: Arc<Mutex<Vec<Vec<OverflowMenuEntry>>>>,
}

impl RenderSurface for FakeSurface {
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
            Some(SurfaceEntry::Probe(id)) | Some(SurfaceEntry::Composite { id, .. }) => {
                self.sizes.get(id.as_str()).copied().unwrap_or(100)
            }
            Some(SurfaceEntry::Overflow) => 50,
            None => 0,
        }
    }

    fn show_overflow_menu(&mut self, entries: &[OverflowMenuEntry]) {
        self.menus.lock().push(entries.to_vec());
    }
}

#[derive(Default)]
struct FakeDrag {
    dragged: Mutex<Option<CompositeId>>,
}

impl DragSource for FakeDrag {
    fn dragged_composite_id(&self) -> Option<CompositeId> {
        self.dragged.lock().clone()
    }

    fn clear_dragged_composite(&self) {
        self.dragged.lock().take();
    }
}

struct Harness {
    bar: CompositeBar,
    log: Arc<HostLog>,
    surface: SurfaceLog,
    menus: Arc<Mutex<Vec<Vec<OverflowMenuEntry>>>>,
    backend: Arc<MemoryStateStore>,
}

struct Setup<'a> {
    composites: &'a [(&'a str, i32)],
    stored: Option<&'a str>,
    default_id: &'a str,
    sizes: &'a [(&'a str, u32)],
    yield_on_open: bool,
    fail_open: bool,
}

impl<'a> Setup<'a> {
    fn new(composites: &'a [(&'a str, i32)]) -> Self {
        Self {
            composites,
            stored: None,
            default_id: composites.first().map_or("", |(id, _)| *id),
            sizes: &[],
            yield_on_open: false,
            fail_open: false,
        }
    }

    async fn build(self) -> Harness {
        let log = Arc::new(HostLog::default());
        let surface: SurfaceLog = Arc::new(Mutex::new(Vec::new()));
        let menus = Arc::new(Mutex::new(Vec::new()));
        let backend = Arc::new(match self.stored {
            Some(raw) => MemoryStateStore::with_entry(KEY, raw),
            None => MemoryStateStore::new(),
        });

        let host = Arc::new(FakeHost {
            default_id: CompositeId::from(self.default_id),
            log: log.clone(),
            yield_on_open: self.yield_on_open,
            fail_open: self.fail_open,
        });
        let fake_surface = FakeSurface {
            sizes: self
                .sizes
                .iter()
                .map(|(id, size)| (id.to_string(), *size))
                .collect(),
            entries: surface.clone(),
            menus: menus.clone(),
        };
        let composites = self
            .composites
            .iter()
            .map(|(id, order)| CompositeDescriptor::new(*id, id.to_uppercase(), *order))
            .collect();

        let bar = CompositeBar::new(
            BarOptions {
                storage_key: KEY.to_string(),
                orientation: Orientation::Horizontal,
                overflow_action_size: 50,
                icon: true,
            },
            composites,
            host,
            Box::new(fake_surface),
            backend.clone(),
        )
        .await
        .expect("bar");

        Harness {
            bar,
            log,
            surface,
            menus,
            backend,
        }
    }
}

impl Harness {
    /// Surface contents; `+` marks the overflow indicator.
    fn strip(&self) -> Vec<String> {
        self.surface
            .lock()
            .iter()
            .map(|entry| match entry {
                SurfaceEntry::Composite { id, .. } => id.to_string(),
                SurfaceEntry::Probe(id) => format!("probe:{id}"),
                SurfaceEntry::Overflow => "+".to_string(),
            })
            .collect()
    }

    fn pinned(&self) -> Vec<String> {
        self.bar
            .pinned_composites()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    async fn stored_states(&self) -> Vec<CompositeState> {
        let raw = self
            .backend
            .get(KEY)
            .await
            .expect("read")
            .expect("state written");
        serde_json::from_str(&raw).expect("state json")
    }
}

fn id(value: &str) -> CompositeId {
    CompositeId::from(value)
}

fn text_badge(label: &str) -> Option<Badge> {
    Some(Badge::Text {
        text: label.to_string(),
        label: label.to_string(),
    })
}

const ABC: [(&str, i32); 3] = [("a", 0), ("b", 1), ("c", 2)];
const FIVE: [(&str, i32); 5] = [("c1", 1), ("c2", 2), ("c3", 3), ("c4", 4), ("c5", 5)];
const WIDE: Dimension = Dimension {
    width: 1000,
    height: 40,
};

#[tokio::test]
async fn new_composites_are_pinned_in_declared_order() {
    let harness = Setup::new(&[("scm", 2), ("explorer", 0), ("search", 1)])
        .build()
        .await;
    assert_eq!(harness.pinned(), vec!["explorer", "search", "scm"]);

    harness.bar.layout(WIDE);
    assert_eq!(harness.strip(), vec!["explorer", "search", "scm"]);
}

#[tokio::test]
async fn legacy_state_pins_listed_ids_and_defaults_the_rest() {
    let mut setup = Setup::new(&ABC);
    setup.stored = Some(r#"["b","a"]"#);
    let harness = setup.build().await;

    assert_eq!(harness.pinned(), vec!["b", "a", "c"]);
}

#[tokio::test]
async fn stored_unpinned_composite_stays_unpinned() {
    let mut setup = Setup::new(&ABC);
    setup.stored = Some(r#"[{"id":"b","pinned":false},{"id":"removed","pinned":true}]"#);
    let harness = setup.build().await;

    assert_eq!(harness.pinned(), vec!["a", "c"]);
    assert!(!harness.bar.is_pinned(&id("removed")));
}

#[tokio::test]
async fn malformed_state_falls_back_to_defaults() {
    let mut setup = Setup::new(&ABC);
    setup.stored = Some("[{\"id\":");
    let harness = setup.build().await;
    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn zero_extent_layout_does_nothing() {
    let harness = Setup::new(&ABC).build().await;

    harness.bar.layout(Dimension::new(0, 40));
    assert!(harness.strip().is_empty());
    assert_eq!(harness.bar.measured_size(&id("a")), None);

    harness.bar.layout(WIDE);
    assert_eq!(harness.strip(), vec!["a", "b", "c"]);
    assert_eq!(harness.bar.measured_size(&id("a")), Some(100));
}

#[tokio::test]
async fn packing_keeps_active_composite_visible() {
    let harness = Setup::new(&FIVE).build().await;

    harness.bar.layout(Dimension::new(350, 40));
    assert_eq!(harness.strip(), vec!["c1", "c2", "c3", "+"]);

    harness.bar.activate_composite(&id("c5"));
    // Active but pinned: nothing forces a repack until the next layout.
    harness.bar.layout(Dimension::new(350, 40));
    assert_eq!(harness.strip(), vec!["c1", "c2", "c5", "+"]);
    assert!(harness.log.action("c5").active);

    let overflowing: Vec<_> = harness
        .bar
        .overflowing_composites()
        .into_iter()
        .map(|descriptor| descriptor.id.to_string())
        .collect();
    assert_eq!(overflowing, vec!["c3", "c4"]);
}

#[tokio::test]
async fn overflow_indicator_costs_an_entry_at_exact_fit() {
    let harness = Setup::new(&FIVE).build().await;
    harness.bar.layout(Dimension::new(300, 40));
    assert_eq!(harness.strip(), vec!["c1", "c2", "+"]);

    harness.bar.layout(Dimension::new(500, 40));
    assert_eq!(harness.strip(), vec!["c1", "c2", "c3", "c4", "c5"]);
}

#[tokio::test]
async fn overflow_menu_lists_hidden_composites_with_badges() {
    let harness = Setup::new(&FIVE).build().await;
    harness.bar.layout(Dimension::new(300, 40));
    let _handle = harness
        .bar
        .show_activity(&id("c4"), text_badge("3 pending"), None, None)
        .expect("activity");

    let entries = harness.bar.show_overflow_menu();
    let ids: Vec<_> = entries.iter().map(|entry| entry.id.to_string()).collect();
    assert_eq!(ids, vec!["c3", "c4", "c5"]);
    assert_eq!(entries[1].badge, text_badge("3 pending"));
    assert_eq!(entries[1].name, "C4");
    assert_eq!(harness.menus.lock().len(), 1);

    harness.bar.select_overflow_entry(&id("c4"));
    assert_eq!(harness.log.action("c4").clicks, 1);
}

#[tokio::test]
async fn show_activity_requires_a_badge() {
    let harness = Setup::new(&ABC).build().await;
    let err = harness
        .bar
        .show_activity(&id("a"), None, None, Some(3))
        .expect_err("missing badge");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert!(harness.bar.activity(&id("a")).is_none());
}

#[tokio::test]
async fn badges_follow_priority_and_disposal() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);

    let mut low = harness
        .bar
        .show_activity(&id("b"), text_badge("low"), None, None)
        .expect("low");
    let mut high = harness
        .bar
        .show_activity(&id("b"), text_badge("high"), Some("progress".into()), Some(5))
        .expect("high");
    assert_eq!(harness.log.action("b").badge.as_deref(), Some("high"));
    assert_eq!(harness.log.action("b").class.as_deref(), Some("progress"));

    high.dispose();
    assert!(high.is_disposed());
    assert_eq!(harness.log.action("b").badge.as_deref(), Some("low"));

    high.dispose();
    assert_eq!(harness.log.action("b").badge.as_deref(), Some("low"));

    low.dispose();
    assert_eq!(harness.log.action("b").badge, None);
    assert!(harness.bar.activity(&id("b")).is_none());
}

#[tokio::test]
async fn badges_are_restored_when_entries_are_rebuilt() {
    let harness = Setup::new(&ABC).build().await;
    let _handle = harness
        .bar
        .show_activity(&id("c"), text_badge("1"), None, None)
        .expect("activity");

    harness.bar.layout(WIDE);
    assert_eq!(harness.log.action("c").badge.as_deref(), Some("1"));
}

#[tokio::test]
async fn pin_twice_opens_once() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);
    harness.bar.unpin(&id("b")).await.expect("unpin");
    assert!(harness.log.calls().is_empty());

    harness.bar.pin(&id("b")).await.expect("pin");
    harness.bar.pin(&id("b")).await.expect("pin again");

    assert_eq!(harness.pinned(), vec!["a", "c", "b"]);
    assert_eq!(harness.log.calls(), vec![HostCall::Open("b".into())]);
    assert_eq!(harness.strip(), vec!["a", "c", "b"]);
}

#[tokio::test]
async fn concurrent_pins_of_one_composite_queue() {
    let mut setup = Setup::new(&ABC);
    setup.yield_on_open = true;
    let harness = setup.build().await;
    harness.bar.unpin(&id("c")).await.expect("unpin");

    let c = id("c");
    let (first, second) = tokio::join!(harness.bar.pin(&c), harness.bar.pin(&c));
    first.expect("first pin");
    second.expect("second pin");

    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
    assert_eq!(harness.log.calls(), vec![HostCall::Open("c".into())]);
    assert!(!harness.bar.is_in_flight(&id("c")));
}

#[tokio::test]
async fn pin_of_unknown_composite_is_a_no_op() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.pin(&id("ghost")).await.expect("pin");
    harness.bar.unpin(&id("ghost")).await.expect("unpin");
    harness
        .bar
        .move_composite(&id("ghost"), &id("a"))
        .await
        .expect("move");
    harness.bar.remove_composite(&id("ghost")).await.expect("remove");

    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
    assert!(harness.log.calls().is_empty());
    assert_eq!(harness.backend.write_count(), 0);
}

#[tokio::test]
async fn failed_open_leaves_composite_unpinned() {
    let mut setup = Setup::new(&ABC);
    setup.fail_open = true;
    let harness = setup.build().await;
    harness.bar.unpin(&id("b")).await.expect("unpin");

    let err = harness.bar.pin(&id("b")).await.expect_err("open fails");
    assert_eq!(err.code(), ErrorCode::Host);
    assert_eq!(harness.pinned(), vec!["a", "c"]);
}

#[tokio::test]
async fn unpin_persists_partition() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.unpin(&id("b")).await.expect("unpin");

    let states = harness.stored_states().await;
    assert_eq!(
        states,
        vec![
            CompositeState {
                id: id("a"),
                pinned: true
            },
            CompositeState {
                id: id("c"),
                pinned: true
            },
            CompositeState {
                id: id("b"),
                pinned: false
            },
        ]
    );
}

#[tokio::test]
async fn unpinning_active_composite_opens_pinned_default() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);
    harness.bar.activate_composite(&id("b"));

    harness.bar.unpin(&id("b")).await.expect("unpin");
    assert_eq!(harness.log.calls(), vec![HostCall::Open("a".into())]);
}

#[tokio::test]
async fn unpinning_active_default_opens_next_visible() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);
    harness.bar.activate_composite(&id("a"));

    harness.bar.unpin(&id("a")).await.expect("unpin");
    assert_eq!(harness.log.calls(), vec![HostCall::Open("b".into())]);
}

#[tokio::test]
async fn unpinning_last_visible_composite_hides_part() {
    let mut setup = Setup::new(&[("a", 0), ("b", 1)]);
    setup.stored = Some(r#"[{"id":"a","pinned":true},{"id":"b","pinned":false}]"#);
    let harness = setup.build().await;
    harness.bar.layout(WIDE);
    harness.bar.activate_composite(&id("a"));
    assert_eq!(harness.bar.visible_composites(), vec![id("a")]);

    harness.bar.unpin(&id("a")).await.expect("unpin");
    assert_eq!(harness.log.calls(), vec![HostCall::Hide]);
}

#[test]
fn unpin_resolution_table() {
    let visible = vec![id("a"), id("b")];
    assert_eq!(
        UnpinResolution::decide(&id("b"), Some(&id("a")), &id("a"), true, &visible),
        UnpinResolution::Keep
    );
    assert_eq!(
        UnpinResolution::decide(&id("b"), Some(&id("b")), &id("a"), true, &visible),
        UnpinResolution::OpenComposite(id("a"))
    );
    assert_eq!(
        UnpinResolution::decide(&id("b"), Some(&id("b")), &id("a"), false, &visible),
        UnpinResolution::OpenComposite(id("a"))
    );
    assert_eq!(
        UnpinResolution::decide(&id("a"), Some(&id("a")), &id("a"), false, &[id("a")]),
        UnpinResolution::HidePart
    );
    assert_eq!(
        UnpinResolution::decide(&id("b"), None, &id("a"), true, &visible),
        UnpinResolution::Keep
    );
}

#[tokio::test]
async fn active_unpinned_composite_is_shown_until_deactivated() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);
    harness.bar.unpin(&id("c")).await.expect("unpin");
    assert_eq!(harness.strip(), vec!["a", "b"]);

    harness.bar.activate_composite(&id("c"));
    assert_eq!(harness.strip(), vec!["a", "b", "c"]);
    assert!(harness.log.action("c").active);

    harness.bar.activate_composite(&id("a"));
    assert_eq!(harness.strip(), vec!["a", "b"]);
    assert!(harness.log.action("a").active);

    harness.bar.activate_composite(&id("c"));
    assert!(!harness.log.action("a").active);
    harness.bar.deactivate_composite(&id("c"));
    assert_eq!(harness.strip(), vec!["a", "b"]);
    assert_eq!(harness.bar.active_composite_id(), None);
}

#[tokio::test]
async fn move_persists_now_and_rebuilds_later() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);

    harness
        .bar
        .move_composite(&id("c"), &id("a"))
        .await
        .expect("move");
    assert_eq!(harness.pinned(), vec!["c", "a", "b"]);
    assert!(harness.strip().is_empty());
    assert!(harness.log.action("a").disposed);

    let pinned: Vec<_> = harness
        .stored_states()
        .await
        .into_iter()
        .filter(|state| state.pinned)
        .map(|state| state.id.to_string())
        .collect();
    assert_eq!(pinned, vec!["c", "a", "b"]);

    harness.bar.settle().await;
    assert_eq!(harness.strip(), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn moving_forward_only_rebuilds_affected_tail() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);

    harness
        .bar
        .move_composite(&id("b"), &id("c"))
        .await
        .expect("move");
    assert_eq!(harness.pinned(), vec!["a", "c", "b"]);
    assert_eq!(harness.strip(), vec!["a"]);

    harness.bar.settle().await;
    assert_eq!(harness.strip(), vec!["a", "c", "b"]);
}

#[tokio::test]
async fn moving_unpinned_composite_pins_it_first() {
    let mut setup = Setup::new(&ABC);
    setup.stored = Some(r#"[{"id":"a","pinned":true},{"id":"b","pinned":true},{"id":"c","pinned":false}]"#);
    let harness = setup.build().await;

    harness
        .bar
        .move_composite(&id("c"), &id("a"))
        .await
        .expect("move");
    assert_eq!(harness.pinned(), vec!["c", "a", "b"]);
    assert_eq!(harness.log.calls(), vec![HostCall::Open("c".into())]);
    harness.bar.settle().await;
}

#[tokio::test]
async fn drop_at_end_moves_dragged_composite_last() {
    let harness = Setup::new(&ABC).build().await;
    let drag = FakeDrag::default();

    *drag.dragged.lock() = Some(id("a"));
    assert!(harness.bar.drop_at_end(&drag).await.expect("drop"));
    assert_eq!(harness.pinned(), vec!["b", "c", "a"]);
    assert!(drag.dragged_composite_id().is_none());

    *drag.dragged.lock() = Some(id("a"));
    assert!(!harness.bar.drop_at_end(&drag).await.expect("drop on self"));
    assert!(drag.dragged_composite_id().is_none());

    assert!(!harness.bar.drop_at_end(&drag).await.expect("nothing dragged"));
    harness.bar.settle().await;
}

#[tokio::test]
async fn drop_at_end_pins_unpinned_composite_last() {
    let mut setup = Setup::new(&ABC);
    setup.stored = Some(r#"[{"id":"a","pinned":true},{"id":"b","pinned":true},{"id":"c","pinned":false}]"#);
    let harness = setup.build().await;
    harness.bar.layout(WIDE);
    assert_eq!(harness.strip(), vec!["a", "b"]);

    let drag = FakeDrag::default();
    *drag.dragged.lock() = Some(id("c"));
    assert!(harness.bar.drop_at_end(&drag).await.expect("drop"));
    harness.bar.settle().await;

    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
    assert_eq!(harness.log.calls(), vec![HostCall::Open("c".into())]);
    assert_eq!(harness.strip(), vec!["a", "b", "c"]);
    let stored_pinned: Vec<_> = harness
        .stored_states()
        .await
        .into_iter()
        .filter(|state| state.pinned)
        .map(|state| state.id.to_string())
        .collect();
    assert_eq!(stored_pinned, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn drop_at_end_ignores_unknown_composite() {
    let harness = Setup::new(&ABC).build().await;
    let drag = FakeDrag::default();
    *drag.dragged.lock() = Some(id("ghost"));

    assert!(!harness.bar.drop_at_end(&drag).await.expect("drop"));
    assert!(drag.dragged_composite_id().is_none());
    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
    assert_eq!(harness.backend.write_count(), 0);
}

#[tokio::test]
async fn remove_composite_cascades() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.layout(WIDE);
    harness.bar.activate_composite(&id("b"));
    let _handle = harness
        .bar
        .show_activity(&id("b"), text_badge("2"), None, None)
        .expect("activity");

    harness.bar.remove_composite(&id("b")).await.expect("remove");

    assert_eq!(harness.pinned(), vec!["a", "c"]);
    assert_eq!(harness.bar.visible_composites(), vec![id("a"), id("c")]);
    assert_eq!(harness.bar.active_composite_id(), None);
    assert!(harness.bar.activity(&id("b")).is_none());
    assert_eq!(harness.log.calls(), vec![HostCall::Open("a".into())]);

    let stored: Vec<_> = harness
        .stored_states()
        .await
        .into_iter()
        .map(|state| state.id.to_string())
        .collect();
    assert_eq!(stored, vec!["a", "c"]);
}

#[tokio::test]
async fn added_composite_is_placed_by_declared_order() {
    let harness = Setup::new(&[("a", 0), ("c", 2)]).build().await;
    harness.bar.layout(WIDE);

    harness
        .bar
        .add_composite(CompositeDescriptor::new("b", "B", 1), true)
        .await
        .expect("add");
    assert_eq!(harness.pinned(), vec!["a", "b", "c"]);
    assert_eq!(harness.log.calls(), vec![HostCall::Open("b".into())]);
    assert_eq!(harness.strip(), vec!["a", "b", "c"]);
    assert_eq!(harness.bar.measured_size(&id("b")), Some(100));

    harness
        .bar
        .add_composite(CompositeDescriptor::new("b", "Again", 9), true)
        .await
        .expect("duplicate add");
    assert_eq!(harness.log.calls().len(), 1);
}

#[tokio::test]
async fn added_composite_follows_persisted_state() {
    let mut setup = Setup::new(&[("a", 0)]);
    setup.stored = Some(
        r#"[{"id":"b","pinned":true},{"id":"a","pinned":true},{"id":"c","pinned":false}]"#,
    );
    let harness = setup.build().await;
    assert_eq!(harness.pinned(), vec!["a"]);

    harness
        .bar
        .add_composite(CompositeDescriptor::new("b", "B", 5), false)
        .await
        .expect("add b");
    harness
        .bar
        .add_composite(CompositeDescriptor::new("c", "C", 1), false)
        .await
        .expect("add c");

    assert_eq!(harness.pinned(), vec!["b", "a"]);
    assert!(harness.log.calls().is_empty());
}

#[tokio::test]
async fn state_round_trips_between_sessions() {
    let harness = Setup::new(&ABC).build().await;
    harness.bar.unpin(&id("a")).await.expect("unpin");
    harness.bar.shutdown().await.expect("shutdown");
    let raw = harness.backend.get(KEY).await.expect("read").expect("raw");

    let mut setup = Setup::new(&ABC);
    setup.stored = Some(raw.as_str());
    let reopened = setup.build().await;
    assert_eq!(reopened.pinned(), vec!["b", "c"]);
}

#[tokio::test]
async fn context_menu_listeners_can_unsubscribe() {
    let harness = Setup::new(&ABC).build().await;
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = seen.clone();
    let subscription = harness.bar.on_context_menu(move |event: &PointerEvent| {
        recorder.lock().push((event.x, event.y));
    });
    let event = PointerEvent {
        x: 4,
        y: 12,
        button: PointerButton::Secondary,
    };

    assert_eq!(harness.bar.handle_context_menu(event), 1);
    assert!(harness.bar.remove_context_menu_listener(subscription));
    assert_eq!(harness.bar.handle_context_menu(event), 0);
    assert_eq!(*seen.lock(), vec![(4, 12)]);
}

#[tokio::test]
async fn click_runs_only_shown_entries() {
    let harness = Setup::new(&FIVE).build().await;
    harness.bar.layout(Dimension::new(300, 40));

    assert!(harness.bar.click(&id("c1")));
    assert!(!harness.bar.click(&id("c5")));
    assert_eq!(harness.log.action("c1").clicks, 1);
}

#[tokio::test]
async fn empty_strip_still_offers_overflow() {
    let mut setup = Setup::new(&[("wide", 0)]);
    setup.sizes = &[("wide", 400)];
    let harness = setup.build().await;

    harness.bar.layout(Dimension::new(300, 40));
    assert_eq!(harness.strip(), vec!["+"]);
}

#[tokio::test]
async fn dispose_clears_surface() {
    let harness = Setup::new(&FIVE).build().await;
    harness.bar.layout(Dimension::new(300, 40));
    harness.bar.dispose();

    assert!(harness.strip().is_empty());
    assert!(harness.log.action("c1").disposed);
    assert!(harness.bar.visible_composites().is_empty());
}
