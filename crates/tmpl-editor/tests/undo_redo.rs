//! Integration tests: command history over a scene and layer registry.
//!
//! Exercises `CommandHistory` + `Command` against `MemoryScene` and
//! `LayerRegistry` across crate boundaries, covering the reversibility
//! properties and the end-to-end editing scenarios.

use pretty_assertions::assert_eq;
use tmpl_core::{
    CharStyle, Layer, LayerId, LayerRegistry, MemoryScene, ObjectId, ObjectType, PropKey,
    PropValue, PropertyPatch, SceneFacade, SceneObject,
};
use tmpl_editor::{Command, CommandHistory, EditorContext, EditorEvent};

struct Editor<S: SceneFacade> {
    scene: S,
    layers: LayerRegistry,
    events: Vec<EditorEvent>,
    history: CommandHistory,
}

impl<S: SceneFacade> Editor<S> {
    fn with_scene(scene: S) -> Self {
        Self {
            scene,
            layers: LayerRegistry::new(),
            events: Vec::new(),
            history: CommandHistory::new(100),
        }
    }

    fn execute(&mut self, cmd: Command) {
        let mut ctx = EditorContext {
            scene: &mut self.scene,
            layers: &mut self.layers,
            events: &mut self.events,
        };
        self.history.execute(cmd, &mut ctx);
    }

    fn undo(&mut self) -> bool {
        let mut ctx = EditorContext {
            scene: &mut self.scene,
            layers: &mut self.layers,
            events: &mut self.events,
        };
        self.history.undo(&mut ctx)
    }

    fn redo(&mut self) -> bool {
        let mut ctx = EditorContext {
            scene: &mut self.scene,
            layers: &mut self.layers,
            events: &mut self.events,
        };
        self.history.redo(&mut ctx)
    }

    fn position(&self, id: ObjectId) -> Option<(f64, f64)> {
        self.scene.object(id).map(SceneObject::position)
    }
}

impl Editor<MemoryScene> {
    fn new() -> Self {
        Self::with_scene(MemoryScene::new())
    }

    /// Scene objects and layer records, bottom first. Selection is left out.
    fn state(&self) -> (Vec<SceneObject>, Vec<Layer>) {
        (self.scene.iter().cloned().collect(), self.layers.layers().to_vec())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn shape(name: &str, left: f64, top: f64) -> SceneObject {
    SceneObject::new(ObjectId::intern(name), ObjectType::Shape)
        .with(PropKey::Left, left)
        .with(PropKey::Top, top)
        .with(PropKey::Width, 10.0)
        .with(PropKey::Height, 10.0)
}

fn headline(name: &str) -> SceneObject {
    SceneObject::new(ObjectId::intern(name), ObjectType::Text)
        .with(PropKey::Left, 0.0)
        .with(PropKey::Top, 0.0)
        .with(PropKey::Text, "Big\nSale")
}

/// Three shapes and a text object, added through history, which is then
/// cleared so tests start from a populated scene with empty stacks.
fn populated() -> Editor<MemoryScene> {
    let mut ed = Editor::new();
    ed.execute(Command::add_object(shape("ur_a", 0.0, 0.0)));
    ed.execute(Command::add_object(shape("ur_b", 20.0, 0.0)));
    ed.execute(Command::add_object(shape("ur_c", 40.0, 0.0)));
    ed.execute(Command::add_object(headline("ur_t")));
    ed.history.clear();
    ed
}

fn bold() -> CharStyle {
    CharStyle {
        font_weight: Some("700".into()),
        ..CharStyle::default()
    }
}

const COMMAND_KINDS: usize = 12;

/// The `i`-th of one command per kind, built against the current state.
/// Each stays constructible after the ones before it have been executed.
fn nth_command(ed: &Editor<MemoryScene>, i: usize) -> Command {
    let a = ObjectId::intern("ur_a");
    let b = ObjectId::intern("ur_b");
    let c = ObjectId::intern("ur_c");
    let t = ObjectId::intern("ur_t");
    let layer_a = LayerId::for_object(a);
    match i {
        0 => Command::add_object(shape("ur_new", 5.0, 5.0)),
        1 => Command::delete_object(&ed.scene, b).unwrap(),
        2 => Command::move_object(&ed.scene, a, 50.0, 60.0).unwrap(),
        3 => Command::align_object(&ed.scene, a, 0.0, 100.0).unwrap(),
        4 => Command::update_props(
            &ed.scene,
            &[a, b],
            &PropertyPatch::new()
                .with(PropKey::Fill, "#FF0000")
                .with(PropKey::Width, 30.0),
        ),
        5 => Command::update_text_selection_styles(&ed.scene, t, 1, 6, &bold()).unwrap(),
        6 => Command::reorder_layer(0, 3),
        7 => Command::toggle_layer_visibility(&ed.layers, layer_a).unwrap(),
        8 => Command::toggle_layer_lock(&ed.layers, layer_a).unwrap(),
        9 => Command::rename_layer(&ed.layers, layer_a, "Hero").unwrap(),
        10 => Command::composite(
            "Nudge",
            vec![
                Command::move_object(&ed.scene, a, 1.0, 1.0).unwrap(),
                Command::move_object(&ed.scene, c, 41.0, 1.0).unwrap(),
            ],
        ),
        11 => Command::delete_layer(&ed.scene, &ed.layers, layer_a).unwrap(),
        _ => unreachable!("no command kind {i}"),
    }
}

// ─── Reversibility ──────────────────────────────────────────────────────

#[test]
fn execute_then_undo_restores_state_for_every_command() {
    for i in 0..COMMAND_KINDS {
        let mut ed = populated();
        let before = ed.state();
        let cmd = nth_command(&ed, i);
        let label = cmd.label().to_string();
        ed.execute(cmd);
        assert!(ed.undo());
        assert_eq!(ed.state(), before, "undo of {label} did not restore state");
    }
}

#[test]
fn undoing_everything_restores_initial_state() {
    let mut ed = populated();
    let initial = ed.state();
    for i in 0..COMMAND_KINDS {
        let cmd = nth_command(&ed, i);
        ed.execute(cmd);
    }
    for _ in 0..COMMAND_KINDS {
        assert!(ed.undo());
    }
    assert!(!ed.history.can_undo());
    assert_eq!(ed.state(), initial);
}

#[test]
fn undo_redo_k_times_reproduces_final_state() {
    let mut ed = populated();
    let a = ObjectId::intern("ur_a");
    let b = ObjectId::intern("ur_b");
    for step in 1..=4_u32 {
        let x = f64::from(step) * 10.0;
        let cmd = Command::move_object(&ed.scene, a, x, x).unwrap();
        ed.execute(cmd);
        let cmd = Command::update_props(
            &ed.scene,
            &[b],
            &PropertyPatch::new().with(PropKey::Opacity, 1.0 / f64::from(step + 1)),
        );
        ed.execute(cmd);
    }
    ed.execute(Command::reorder_layer(0, 2));
    let after = ed.state();

    for k in 0..=9 {
        for _ in 0..k {
            assert!(ed.undo());
        }
        for _ in 0..k {
            assert!(ed.redo());
        }
        assert_eq!(ed.state(), after, "k = {k}");
    }
}

#[test]
fn executing_after_undo_discards_redo() {
    let mut ed = populated();
    let a = ObjectId::intern("ur_a");
    ed.execute(Command::move_object(&ed.scene, a, 1.0, 1.0).unwrap());
    ed.execute(Command::move_object(&ed.scene, a, 2.0, 2.0).unwrap());
    ed.undo();
    ed.undo();
    assert_eq!(ed.history.redo_len(), 2);
    ed.execute(Command::move_object(&ed.scene, a, 3.0, 3.0).unwrap());
    assert!(!ed.history.can_redo());
    assert!(!ed.redo());
    assert_eq!(ed.position(a), Some((3.0, 3.0)));
}

#[test]
fn reorder_then_inverse_restores_order() {
    let mut ed = populated();
    let initial = ed.state();
    for (i, j) in [(0, 3), (3, 0), (1, 2), (2, 1)] {
        ed.execute(Command::reorder_layer(i, j));
        ed.execute(Command::reorder_layer(j, i));
        assert_eq!(ed.state(), initial);
    }
    let scene_order = ed.scene.objects();
    let layer_order: Vec<ObjectId> = ed.layers.layers().iter().map(|l| l.scene_ref).collect();
    assert_eq!(scene_order, layer_order);
}

// ─── Composite ordering ─────────────────────────────────────────────────

/// Scene wrapper that records which objects commands touch, in order.
struct RecordingScene {
    inner: MemoryScene,
    touched: Vec<ObjectId>,
}

impl SceneFacade for RecordingScene {
    fn add(&mut self, obj: SceneObject) {
        self.inner.add(obj);
    }

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.inner.remove(id)
    }

    fn insert_at(&mut self, index: usize, obj: SceneObject) {
        self.inner.insert_at(index, obj);
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.inner.objects()
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.inner.object(id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.touched.push(id);
        self.inner.object_mut(id)
    }

    fn set_active(&mut self, id: ObjectId) -> bool {
        self.inner.set_active(id)
    }

    fn discard_active(&mut self) {
        self.inner.discard_active();
    }

    fn active(&self) -> Option<ObjectId> {
        self.inner.active()
    }

    fn request_render(&mut self) {
        self.inner.request_render();
    }
}

#[test]
fn composite_undo_runs_in_reverse_order() {
    let ids: Vec<ObjectId> = ["rec_a", "rec_b", "rec_c"]
        .iter()
        .map(|n| ObjectId::intern(n))
        .collect();
    let mut inner = MemoryScene::new();
    for (i, id) in ids.iter().enumerate() {
        inner.add(shape(id.as_str(), i as f64, 0.0));
    }
    let mut ed = Editor::with_scene(RecordingScene {
        inner,
        touched: Vec::new(),
    });

    let moves = ids
        .iter()
        .map(|id| Command::move_object(&ed.scene, *id, 100.0, 100.0).unwrap())
        .collect();
    ed.execute(Command::composite("Move 3", moves));
    assert_eq!(ed.scene.touched, ids);

    ed.scene.touched.clear();
    assert!(ed.undo());
    let reversed: Vec<ObjectId> = ids.iter().rev().copied().collect();
    assert_eq!(ed.scene.touched, reversed);

    ed.scene.touched.clear();
    assert!(ed.redo());
    assert_eq!(ed.scene.touched, ids);
}

#[test]
fn reorder_through_facade_defaults_keeps_selection() {
    let ids: Vec<ObjectId> = ["rec_z0", "rec_z1"]
        .iter()
        .map(|n| ObjectId::intern(n))
        .collect();
    let mut inner = MemoryScene::new();
    for id in &ids {
        inner.add(shape(id.as_str(), 0.0, 0.0));
    }
    let mut ed = Editor::with_scene(RecordingScene {
        inner,
        touched: Vec::new(),
    });
    ed.layers.sync_layers(&ed.scene);
    assert!(ed.scene.set_active(ids[1]));

    ed.execute(Command::reorder_layer(1, 0));
    assert_eq!(ed.scene.objects(), vec![ids[1], ids[0]]);
    assert_eq!(ed.scene.active(), Some(ids[1]));

    assert!(ed.undo());
    assert_eq!(ed.scene.objects(), ids);
    assert_eq!(ed.scene.active(), Some(ids[1]));
}

#[test]
fn composite_of_dependent_moves_unwinds_to_start() {
    let mut ed = populated();
    let a = ObjectId::intern("ur_a");
    let first = Command::move_object(&ed.scene, a, 10.0, 10.0).unwrap();
    // The second move's "old" position is the first move's target.
    let second = Command::MoveObject {
        object: a,
        kind: tmpl_editor::MoveKind::Move,
        old: (10.0, 10.0),
        new: (20.0, 20.0),
    };
    ed.execute(Command::composite("Drag", vec![first, second]));
    assert_eq!(ed.position(a), Some((20.0, 20.0)));
    ed.undo();
    assert_eq!(ed.position(a), Some((0.0, 0.0)));
    ed.redo();
    assert_eq!(ed.position(a), Some((20.0, 20.0)));
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn add_move_undo_redo_scenario() {
    let mut ed = Editor::new();
    let a = ObjectId::intern("sc_a");
    ed.execute(Command::add_object(shape("sc_a", 0.0, 0.0)));
    ed.execute(Command::move_object(&ed.scene, a, 50.0, 50.0).unwrap());

    assert!(ed.undo());
    assert_eq!(ed.position(a), Some((0.0, 0.0)));
    assert!(ed.undo());
    assert_eq!(ed.position(a), None);
    assert!(ed.layers.is_empty());

    assert!(ed.redo());
    assert!(ed.redo());
    assert_eq!(ed.position(a), Some((50.0, 50.0)));
    assert_eq!(ed.layers.len(), 1);
    assert!(!ed.redo());
}

#[test]
fn hiding_selected_layer_clears_selection_and_undo_keeps_it_cleared() {
    let mut ed = populated();
    let a = ObjectId::intern("ur_a");
    let layer = LayerId::for_object(a);
    ed.scene.set_active(a);

    ed.execute(Command::toggle_layer_visibility(&ed.layers, layer).unwrap());
    assert!(!ed.layers.layer(layer).unwrap().visible);
    assert!(!ed.scene.object(a).unwrap().visible());
    assert_eq!(ed.scene.active(), None);
    assert!(ed.events.contains(&EditorEvent::SelectionChanged { object: None }));

    assert!(ed.undo());
    assert!(ed.layers.layer(layer).unwrap().visible);
    assert!(ed.scene.object(a).unwrap().visible());
    assert_eq!(ed.scene.active(), None);
}

#[test]
fn undefined_patch_entries_are_never_captured() {
    let mut ed = populated();
    let x = ObjectId::intern("ur_a");
    let y = ObjectId::intern("ur_b");
    let patch = PropertyPatch::new()
        .with(PropKey::Width, 20.0)
        .with_undefined(PropKey::Height);
    let cmd = Command::update_props(&ed.scene, &[x, y], &patch);

    let Command::UpdateProps { changes, .. } = &cmd else {
        panic!("expected UpdateProps");
    };
    for change in changes {
        assert!(change.changes.iter().all(|c| c.key != PropKey::Height));
    }

    ed.execute(cmd);
    for id in [x, y] {
        let obj = ed.scene.object(id).unwrap();
        assert_eq!(obj.get(PropKey::Width), Some(&PropValue::Number(20.0)));
        assert_eq!(obj.get(PropKey::Height), Some(&PropValue::Number(10.0)));
    }
}

#[test]
fn text_style_snapshots_survive_live_mutation() {
    let mut ed = populated();
    let t = ObjectId::intern("ur_t");
    let cmd = Command::update_text_selection_styles(&ed.scene, t, 0, 2, &bold()).unwrap();
    ed.execute(cmd);

    // Style a character outside the command's range directly on the object.
    let underline = CharStyle {
        underline: Some(true),
        ..CharStyle::default()
    };
    ed.scene.object_mut(t).unwrap().styles.set(1, 0, underline);

    assert!(ed.undo());
    assert!(ed.scene.object(t).unwrap().styles.is_empty());
    assert!(ed.redo());
    let styles = &ed.scene.object(t).unwrap().styles;
    assert_eq!(styles.len(), 2);
    assert_eq!(styles.get(1, 0), None);
}

#[test]
fn deleted_object_returns_to_its_z_index() {
    let mut ed = populated();
    let b = ObjectId::intern("ur_b");
    ed.execute(Command::delete_object(&ed.scene, b).unwrap());
    assert_eq!(ed.layers.len(), 3);
    assert!(ed.layers.layer_for_object(b).is_none());
    ed.undo();
    assert_eq!(ed.scene.index_of(b), Some(1));
    assert_eq!(ed.layers.layers()[1].scene_ref, b);
    assert_eq!(ed.scene.active(), Some(b));
}

#[test]
fn commands_on_vanished_objects_do_nothing() {
    init_logging();
    let mut ed = populated();
    let c = ObjectId::intern("ur_c");
    let stale = Command::move_object(&ed.scene, c, 9.0, 9.0).unwrap();
    ed.execute(Command::delete_object(&ed.scene, c).unwrap());
    let before = ed.state();
    ed.execute(stale);
    assert_eq!(ed.state(), before);
    assert!(ed.undo());
    assert_eq!(ed.state(), before);
}
