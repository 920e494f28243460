//! Editor session: the facade a UI host drives.
//!
//! Owns the scene, the layer registry, the command history, the event bus
//! and the bound property form. Every mutation goes through a command; the
//! session builds the command, runs it through the history, then publishes
//! the resulting events and keeps the form in sync.

use crate::bus::{CoalescingQueue, EditorEvent, EventBus, PropertyChanged, SubscriberId};
use crate::commands::{Command, EditorContext};
use crate::form::{FormState, PatchOptions};
use crate::history::CommandHistory;
use crate::shortcuts::EditorAction;
use serde_json::{Map, Value};
use tmpl_core::{
    CanvasObjectProperties, CharStyle, EditorConfig, FormValues, LayerId, LayerRegistry,
    MemoryScene, ObjectId, PropertyPatch, SceneFacade, SceneObject,
};

pub struct EditorSession<S: SceneFacade = MemoryScene> {
    scene: S,
    layers: LayerRegistry,
    history: CommandHistory,
    bus: EventBus<EditorEvent>,
    form: FormState,
    edits: CoalescingQueue,
    config: EditorConfig,
    /// Events produced by the running history operation, published once it
    /// has completed.
    outbox: Vec<EditorEvent>,
}

impl Default for EditorSession<MemoryScene> {
    fn default() -> Self {
        Self::new(MemoryScene::new(), EditorConfig::default())
    }
}

impl<S: SceneFacade> EditorSession<S> {
    pub fn new(scene: S, config: EditorConfig) -> Self {
        let mut layers = LayerRegistry::new();
        layers.sync_layers(&scene);
        Self {
            scene,
            layers,
            history: CommandHistory::new(config.max_history_depth),
            bus: EventBus::new(),
            form: FormState::new(),
            edits: CoalescingQueue::new(config.form_debounce_ms, config.distinct_form_values),
            config,
            outbox: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Canvas view of an object, for property panels.
    pub fn object_properties(&self, id: ObjectId) -> Option<CanvasObjectProperties> {
        self.scene.object(id).map(CanvasObjectProperties::from_object)
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn drain_events(&mut self, id: SubscriberId) -> Vec<EditorEvent> {
        self.bus.drain(id)
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Execute a command and record it. Pending form edits are committed
    /// first so they keep their place in the timeline.
    pub fn execute(&mut self, cmd: Command) {
        self.commit_all_edits();
        self.run(cmd);
    }

    pub fn undo(&mut self) -> bool {
        self.commit_all_edits();
        let done = {
            let mut ctx = EditorContext {
                scene: &mut self.scene,
                layers: &mut self.layers,
                events: &mut self.outbox,
            };
            self.history.undo(&mut ctx)
        };
        self.publish();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.commit_all_edits();
        let done = {
            let mut ctx = EditorContext {
                scene: &mut self.scene,
                layers: &mut self.layers,
                events: &mut self.outbox,
            };
            self.history.redo(&mut ctx)
        };
        self.publish();
        done
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Start a gesture (e.g. a multi-object drag); everything executed until
    /// [`end_gesture`](Self::end_gesture) undoes as one step.
    pub fn begin_gesture(&mut self) {
        self.history.begin_group();
    }

    pub fn end_gesture(&mut self, label: &str) {
        self.history.end_group(label);
    }

    fn run(&mut self, cmd: Command) {
        {
            let mut ctx = EditorContext {
                scene: &mut self.scene,
                layers: &mut self.layers,
                events: &mut self.outbox,
            };
            self.history.execute(cmd, &mut ctx);
        }
        self.publish();
    }

    // ─── Object operations ───────────────────────────────────────────────

    pub fn add_object(&mut self, object: SceneObject) {
        let select = self.config.select_on_add;
        self.execute(Command::AddObject { object, select });
    }

    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::delete_object(&self.scene, id) else {
            log::warn!("delete_object: object {id} not in scene");
            return false;
        };
        self.run(cmd);
        true
    }

    pub fn move_object(&mut self, id: ObjectId, left: f64, top: f64) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::move_object(&self.scene, id, left, top) else {
            log::warn!("move_object: object {id} not in scene");
            return false;
        };
        self.run(cmd);
        self.refresh_form(id);
        true
    }

    pub fn align_object(&mut self, id: ObjectId, left: f64, top: f64) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::align_object(&self.scene, id, left, top) else {
            log::warn!("align_object: object {id} not in scene");
            return false;
        };
        self.run(cmd);
        self.refresh_form(id);
        true
    }

    /// Apply `patch` to every object in `ids` as one history entry.
    /// Returns false if nothing would change.
    pub fn update_properties(&mut self, ids: &[ObjectId], patch: &PropertyPatch) -> bool {
        self.commit_all_edits();
        let cmd = Command::update_props(&self.scene, ids, patch).notifying();
        if cmd.is_empty() {
            return false;
        }
        self.run(cmd);
        true
    }

    /// Apply `style` to the characters `[start, end)` of a text object.
    pub fn set_text_selection_styles(
        &mut self,
        id: ObjectId,
        start: usize,
        end: usize,
        style: &CharStyle,
    ) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::update_text_selection_styles(&self.scene, id, start, end, style)
        else {
            log::warn!("set_text_selection_styles: object {id} not in scene");
            return false;
        };
        self.run(cmd);
        true
    }

    /// Select an object, or clear the selection with `None`. Hidden and
    /// locked objects can't be selected.
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        self.commit_all_edits();
        match id {
            Some(id) => {
                let selectable = self
                    .scene
                    .object(id)
                    .is_some_and(|obj| obj.visible() && !obj.locked());
                if !selectable || !self.scene.set_active(id) {
                    return false;
                }
            }
            None => self.scene.discard_active(),
        }
        self.outbox.push(EditorEvent::SelectionChanged { object: id });
        self.publish();
        true
    }

    // ─── Layer operations ────────────────────────────────────────────────

    /// Move the layer at `previous` to `current`. Out-of-range indices are
    /// rejected without touching history.
    pub fn reorder_layers(&mut self, previous: usize, current: usize) -> bool {
        let len = self.layers.len();
        if previous >= len || current >= len {
            log::warn!("reorder_layers: index out of range ({previous} -> {current}, len {len})");
            return false;
        }
        if previous == current {
            return false;
        }
        self.execute(Command::reorder_layer(previous, current));
        true
    }

    pub fn toggle_layer_visibility(&mut self, layer: LayerId) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::toggle_layer_visibility(&self.layers, layer) else {
            log::warn!("toggle_layer_visibility: unknown layer {layer}");
            return false;
        };
        self.run(cmd);
        true
    }

    pub fn toggle_layer_lock(&mut self, layer: LayerId) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::toggle_layer_lock(&self.layers, layer) else {
            log::warn!("toggle_layer_lock: unknown layer {layer}");
            return false;
        };
        self.run(cmd);
        true
    }

    pub fn rename_layer(&mut self, layer: LayerId, name: &str) -> bool {
        self.commit_all_edits();
        self.layers.end_rename(layer);
        let Some(cmd) = Command::rename_layer(&self.layers, layer, name) else {
            log::warn!("rename_layer: unknown layer {layer}");
            return false;
        };
        self.run(cmd);
        true
    }

    pub fn delete_layer(&mut self, layer: LayerId) -> bool {
        self.commit_all_edits();
        let Some(cmd) = Command::delete_layer(&self.scene, &self.layers, layer) else {
            log::warn!("delete_layer: unknown layer {layer}");
            return false;
        };
        self.run(cmd);
        true
    }

    /// Mark a layer as being renamed inline. Not recorded in history.
    pub fn begin_rename(&mut self, layer: LayerId) -> bool {
        self.layers.begin_rename(layer)
    }

    // ─── Form sync ───────────────────────────────────────────────────────

    /// A user edit of one form control, observed at `now_ms`.
    ///
    /// The edit updates the form immediately and is committed to the scene
    /// once the debounce window has passed (see [`tick`](Self::tick)).
    pub fn form_input(&mut self, field: &str, value: Value, now_ms: u64) -> bool {
        let mut partial = Map::new();
        partial.insert(field.to_string(), value);
        if self.form.patch_value(&partial, PatchOptions::default()) == 0 {
            return false;
        }
        for change in self.form.take_changes() {
            self.edits.push(change, now_ms);
        }
        self.tick(now_ms);
        true
    }

    /// Commit form edits whose debounce window has elapsed. Returns whether
    /// a command was recorded.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let due = self.edits.flush_due(now_ms);
        self.commit_edits(due)
    }

    fn commit_all_edits(&mut self) -> bool {
        let all = self.edits.flush_all();
        self.commit_edits(all)
    }

    /// Turn released form edits into a single property update of the bound
    /// object. Edits are replayed onto form values read from the live
    /// object, so only the edited fields can produce changes.
    fn commit_edits(&mut self, edits: Vec<PropertyChanged>) -> bool {
        let Some(bound) = self.form.object() else {
            return false;
        };
        let Some(obj) = self.scene.object(bound) else {
            return false;
        };
        let mut edited = FormValues::for_object(obj);
        let baseline = edited.to_canvas_properties();
        let edits: Vec<PropertyChanged> = edits.into_iter().filter(|e| e.object == bound).collect();
        let mut touched = false;
        for edit in &edits {
            touched |= edited.apply_field(&edit.field, &edit.value);
        }
        if !touched {
            return false;
        }
        let patch: PropertyPatch = edited
            .to_canvas_properties()
            .iter()
            .filter(|(key, value)| baseline.get(*key) != *value)
            .map(|(key, value)| (key, value.cloned()))
            .collect();
        let cmd = Command::update_props(&self.scene, &[bound], &patch);
        if cmd.is_empty() {
            return false;
        }
        self.run(cmd);
        self.edits.mark_committed(&edits);
        true
    }

    /// Reload the form if it shows `id`. Used after commands that change
    /// an object without notifying forms on execute.
    fn refresh_form(&mut self, id: ObjectId) {
        if self.form.object() == Some(id)
            && let Some(obj) = self.scene.object(id)
        {
            self.form.load(obj);
        }
    }

    /// Deliver queued events and keep the form bound to the selection.
    fn publish(&mut self) {
        for event in std::mem::take(&mut self.outbox) {
            match &event {
                EditorEvent::SceneSynced { object } if self.form.object() == Some(*object) => {
                    self.edits.reset(*object);
                    if let Some(obj) = self.scene.object(*object) {
                        self.form.load(obj);
                    }
                }
                EditorEvent::SelectionChanged { object } => {
                    match object.and_then(|id| self.scene.object(id)) {
                        Some(obj) => self.form.load(obj),
                        None => self.form.unbind(),
                    }
                }
                EditorEvent::LayersChanged => {
                    if let Some(bound) = self.form.object()
                        && !self.scene.contains(bound)
                    {
                        self.form.unbind();
                    }
                }
                _ => {}
            }
            self.bus.publish(event);
        }
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Perform a shortcut action against the current selection. Returns
    /// false if the action had nothing to act on.
    pub fn dispatch(&mut self, action: EditorAction) -> bool {
        let active = self.scene.active();
        let index = active.and_then(|id| self.scene.index_of(id));
        let last = self.layers.len().saturating_sub(1);
        match action {
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::Deselect => active.is_some() && self.select(None),
            EditorAction::Delete => active.is_some_and(|id| self.delete_object(id)),
            EditorAction::SendBackward => {
                index.is_some_and(|i| i > 0 && self.reorder_layers(i, i - 1))
            }
            EditorAction::BringForward => {
                index.is_some_and(|i| i < last && self.reorder_layers(i, i + 1))
            }
            EditorAction::SendToBack => index.is_some_and(|i| self.reorder_layers(i, 0)),
            EditorAction::BringToFront => index.is_some_and(|i| self.reorder_layers(i, last)),
            EditorAction::ToggleVisibility => {
                active.is_some_and(|id| self.toggle_layer_visibility(LayerId::for_object(id)))
            }
            EditorAction::ToggleLock => {
                active.is_some_and(|id| self.toggle_layer_lock(LayerId::for_object(id)))
            }
        }
    }

    /// End the session: drop history and pending edits, unbind the form.
    pub fn teardown(&mut self) {
        self.history.clear();
        self.edits = CoalescingQueue::new(
            self.config.form_debounce_ms,
            self.config.distinct_form_values,
        );
        self.form.unbind();
        self.outbox.clear();
    }
}
