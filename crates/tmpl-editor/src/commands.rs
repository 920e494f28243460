//! Reversible editor commands.
//!
//! Every user mutation is a [`Command`]: a closed set of kinds, each carrying
//! the state it needs to apply and revert itself. Before-state is captured
//! when the command is constructed, because scene objects are mutable and a
//! later lookup would see post-mutation values.
//!
//! If a command's object or layer no longer resolves when it runs, it does
//! nothing and logs a warning. History is strictly sequential within a
//! session, so this only happens if commands are replayed out of order.

use crate::bus::EditorEvent;
use smallvec::SmallVec;
use std::fmt;
use tmpl_core::{
    CharStyle, LayerId, LayerRegistry, ObjectId, PropKey, PropValue, PropertyPatch, SceneFacade,
    SceneObject, TextStyles,
};

/// Everything a command may touch. The history manager is deliberately not
/// part of it, so commands can't call back into the history.
pub struct EditorContext<'a> {
    pub scene: &'a mut dyn SceneFacade,
    pub layers: &'a mut LayerRegistry,
    /// Notifications for forms and the layer panel, published by the
    /// session once the history operation has completed.
    pub events: &'a mut Vec<EditorEvent>,
}

impl EditorContext<'_> {
    fn sync_layers(&mut self) {
        self.layers.sync_layers(&*self.scene);
        self.events.push(EditorEvent::LayersChanged);
    }

    fn select(&mut self, object: Option<ObjectId>) {
        match object {
            Some(id) => {
                self.scene.set_active(id);
            }
            None => self.scene.discard_active(),
        }
        self.events.push(EditorEvent::SelectionChanged { object });
    }

    fn deselect_if_active(&mut self, id: ObjectId) {
        if self.scene.active() == Some(id) {
            self.select(None);
        }
    }
}

/// Whether a position change came from a drag or an alignment action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Move,
    Align,
}

/// One attribute change: the value before and after.
#[derive(Debug, Clone, PartialEq)]
pub struct PropChange {
    pub key: PropKey,
    /// `None` if the object had no value for `key`; undo removes it again.
    pub old: Option<PropValue>,
    pub new: PropValue,
}

/// The changes applied to one object by a multi-object update.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectChange {
    pub object: ObjectId,
    pub changes: SmallVec<[PropChange; 4]>,
}

/// A reversible mutation of the scene and/or the layer registry.
#[derive(Debug, Clone)]
pub enum Command {
    /// Insert an object on top of the stack.
    AddObject { object: SceneObject, select: bool },
    /// Remove an object, remembering its z-index.
    DeleteObject { object: SceneObject, index: usize },
    /// Move an object's top-left corner.
    MoveObject {
        object: ObjectId,
        kind: MoveKind,
        old: (f64, f64),
        new: (f64, f64),
    },
    /// Set attributes on several objects at once.
    UpdateProps {
        changes: Vec<ObjectChange>,
        /// Emit `SceneSynced` after applying new values too, not only on undo.
        notify: bool,
    },
    /// Apply per-character styles to a text range.
    UpdateTextSelectionStyles {
        object: ObjectId,
        before: TextStyles,
        after: TextStyles,
    },
    /// Move a layer from one z-index to another.
    ReorderLayer { previous: usize, current: usize },
    ToggleLayerVisibility { layer: LayerId, previous: bool },
    ToggleLayerLock { layer: LayerId, previous: bool },
    RenameLayer {
        layer: LayerId,
        old_name: String,
        new_name: String,
    },
    /// Remove a layer and its object through the registry.
    DeleteLayer {
        layer: LayerId,
        object: SceneObject,
        index: usize,
    },
    /// Several commands as one history entry.
    Composite { label: String, commands: Vec<Command> },
}

impl Command {
    // ─── Construction ────────────────────────────────────────────────────

    pub fn add_object(object: SceneObject) -> Self {
        Command::AddObject {
            object,
            select: true,
        }
    }

    /// Capture an object and its z-index for deletion.
    pub fn delete_object(scene: &dyn SceneFacade, id: ObjectId) -> Option<Self> {
        let object = scene.object(id)?.clone();
        let index = scene.index_of(id)?;
        Some(Command::DeleteObject { object, index })
    }

    pub fn move_object(scene: &dyn SceneFacade, id: ObjectId, left: f64, top: f64) -> Option<Self> {
        Self::reposition(scene, id, MoveKind::Move, (left, top))
    }

    pub fn align_object(scene: &dyn SceneFacade, id: ObjectId, left: f64, top: f64) -> Option<Self> {
        Self::reposition(scene, id, MoveKind::Align, (left, top))
    }

    fn reposition(
        scene: &dyn SceneFacade,
        id: ObjectId,
        kind: MoveKind,
        new: (f64, f64),
    ) -> Option<Self> {
        let old = scene.object(id)?.position();
        Some(Command::MoveObject {
            object: id,
            kind,
            old,
            new,
        })
    }

    /// Capture old/new values for the keys of `patch` that would change each
    /// object in `ids`. Undefined keys and unchanged values are skipped;
    /// unknown objects are skipped with a warning.
    pub fn update_props(scene: &dyn SceneFacade, ids: &[ObjectId], patch: &PropertyPatch) -> Self {
        let changes = ids
            .iter()
            .filter_map(|id| {
                let Some(obj) = scene.object(*id) else {
                    log::warn!("update_props: object {id} not in scene, skipped");
                    return None;
                };
                let changes: SmallVec<[PropChange; 4]> = patch
                    .defined()
                    .filter(|(key, new)| obj.get(*key) != Some(*new))
                    .map(|(key, new)| PropChange {
                        key,
                        old: obj.get(key).cloned(),
                        new: new.clone(),
                    })
                    .collect();
                (!changes.is_empty()).then_some(ObjectChange {
                    object: *id,
                    changes,
                })
            })
            .collect();
        Command::UpdateProps {
            changes,
            notify: false,
        }
    }

    /// Also notify bound forms when the new values are applied.
    #[must_use]
    pub fn notifying(mut self) -> Self {
        if let Command::UpdateProps { notify, .. } = &mut self {
            *notify = true;
        }
        self
    }

    /// Snapshot the style map before and after applying `style` to the
    /// linear character range `[start, end)`.
    pub fn update_text_selection_styles(
        scene: &dyn SceneFacade,
        id: ObjectId,
        start: usize,
        end: usize,
        style: &CharStyle,
    ) -> Option<Self> {
        let obj = scene.object(id)?;
        let before = obj.styles.clone();
        let mut after = before.clone();
        after.apply_range(obj.text(PropKey::Text).unwrap_or_default(), start, end, style);
        Some(Command::UpdateTextSelectionStyles {
            object: id,
            before,
            after,
        })
    }

    pub fn reorder_layer(previous: usize, current: usize) -> Self {
        Command::ReorderLayer { previous, current }
    }

    pub fn toggle_layer_visibility(layers: &LayerRegistry, layer: LayerId) -> Option<Self> {
        let previous = layers.layer(layer)?.visible;
        Some(Command::ToggleLayerVisibility { layer, previous })
    }

    pub fn toggle_layer_lock(layers: &LayerRegistry, layer: LayerId) -> Option<Self> {
        let previous = layers.layer(layer)?.locked;
        Some(Command::ToggleLayerLock { layer, previous })
    }

    pub fn rename_layer(layers: &LayerRegistry, layer: LayerId, new_name: &str) -> Option<Self> {
        let old_name = layers.layer(layer)?.name.clone();
        Some(Command::RenameLayer {
            layer,
            old_name,
            new_name: new_name.to_string(),
        })
    }

    /// Capture the layer's object and z-index before the registry deletes it.
    pub fn delete_layer(
        scene: &dyn SceneFacade,
        layers: &LayerRegistry,
        layer: LayerId,
    ) -> Option<Self> {
        let scene_ref = layers.layer(layer)?.scene_ref;
        let object = scene.object(scene_ref)?.clone();
        let index = scene.index_of(scene_ref)?;
        Some(Command::DeleteLayer {
            layer,
            object,
            index,
        })
    }

    pub fn composite(label: &str, commands: Vec<Command>) -> Self {
        Command::Composite {
            label: label.to_string(),
            commands,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Human-readable description, e.g. for an "Undo Move" menu entry.
    pub fn label(&self) -> &str {
        match self {
            Command::AddObject { .. } => "Add object",
            Command::DeleteObject { .. } => "Delete object",
            Command::MoveObject {
                kind: MoveKind::Move,
                ..
            } => "Move object",
            Command::MoveObject {
                kind: MoveKind::Align,
                ..
            } => "Align object",
            Command::UpdateProps { .. } => "Update properties",
            Command::UpdateTextSelectionStyles { .. } => "Style text",
            Command::ReorderLayer { .. } => "Reorder layer",
            Command::ToggleLayerVisibility { .. } => "Toggle visibility",
            Command::ToggleLayerLock { .. } => "Toggle lock",
            Command::RenameLayer { .. } => "Rename layer",
            Command::DeleteLayer { .. } => "Delete layer",
            Command::Composite { label, .. } => label,
        }
    }

    /// True if applying this command would change nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Command::UpdateProps { changes, .. } => changes.is_empty(),
            Command::Composite { commands, .. } => commands.iter().all(Command::is_empty),
            Command::ReorderLayer { previous, current } => previous == current,
            _ => false,
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    pub fn execute(&self, ctx: &mut EditorContext<'_>) {
        match self {
            Command::AddObject { object, select } => {
                ctx.scene.add(object.clone());
                if *select {
                    ctx.select(Some(object.id));
                }
                ctx.scene.request_render();
                ctx.sync_layers();
            }
            Command::DeleteObject { object, .. } => remove_object(ctx, object.id, "delete_object"),
            Command::MoveObject { object, new, .. } => {
                set_position(ctx, *object, *new, false);
            }
            Command::UpdateProps { changes, notify } => {
                apply_changes(ctx, changes, |c| Some(c.new.clone()), *notify);
            }
            Command::UpdateTextSelectionStyles { object, after, .. } => {
                restore_styles(ctx, *object, after, false);
            }
            Command::ReorderLayer { previous, current } => {
                reorder(ctx, *previous, *current);
            }
            Command::ToggleLayerVisibility { layer, previous } => {
                set_visibility(ctx, *layer, !*previous);
            }
            Command::ToggleLayerLock { layer, previous } => {
                set_locked(ctx, *layer, !*previous);
            }
            Command::RenameLayer {
                layer, new_name, ..
            } => rename(ctx, *layer, new_name),
            Command::DeleteLayer { layer, .. } => {
                if ctx.layers.delete_layer(ctx.scene, *layer).is_none() {
                    log::warn!("delete_layer: {layer} did not resolve");
                    return;
                }
                ctx.scene.request_render();
                ctx.events.push(EditorEvent::LayersChanged);
            }
            Command::Composite { commands, .. } => {
                for cmd in commands {
                    cmd.execute(ctx);
                }
            }
        }
    }

    pub fn undo(&self, ctx: &mut EditorContext<'_>) {
        match self {
            Command::AddObject { object, .. } => remove_object(ctx, object.id, "add_object"),
            Command::DeleteObject { object, index } => {
                ctx.scene.insert_at(*index, object.clone());
                ctx.select(Some(object.id));
                ctx.scene.request_render();
                ctx.sync_layers();
            }
            Command::MoveObject { object, old, .. } => {
                set_position(ctx, *object, *old, true);
            }
            Command::UpdateProps { changes, .. } => {
                apply_changes(ctx, changes, |c| c.old.clone(), true);
            }
            Command::UpdateTextSelectionStyles { object, before, .. } => {
                restore_styles(ctx, *object, before, true);
            }
            Command::ReorderLayer { previous, current } => {
                reorder(ctx, *current, *previous);
            }
            Command::ToggleLayerVisibility { layer, previous } => {
                set_visibility(ctx, *layer, *previous);
            }
            Command::ToggleLayerLock { layer, previous } => {
                set_locked(ctx, *layer, *previous);
            }
            Command::RenameLayer {
                layer, old_name, ..
            } => rename(ctx, *layer, old_name),
            Command::DeleteLayer { object, index, .. } => {
                ctx.scene.insert_at(*index, object.clone());
                ctx.scene.request_render();
                ctx.sync_layers();
            }
            Command::Composite { commands, .. } => {
                for cmd in commands.iter().rev() {
                    cmd.undo(ctx);
                }
            }
        }
    }

    /// Re-apply after an undo. Stored "after" values are replayed rather than
    /// re-derived, and since history traversal changes objects underneath
    /// bound forms, attribute changes always notify. Composites redo their
    /// children in order.
    pub fn redo(&self, ctx: &mut EditorContext<'_>) {
        match self {
            Command::MoveObject { object, new, .. } => {
                set_position(ctx, *object, *new, true);
            }
            Command::UpdateProps { changes, .. } => {
                apply_changes(ctx, changes, |c| Some(c.new.clone()), true);
            }
            Command::UpdateTextSelectionStyles { object, after, .. } => {
                restore_styles(ctx, *object, after, true);
            }
            Command::Composite { commands, .. } => {
                for cmd in commands {
                    cmd.redo(ctx);
                }
            }
            _ => self.execute(ctx),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Shared mutation steps ───────────────────────────────────────────────

fn remove_object(ctx: &mut EditorContext<'_>, id: ObjectId, op: &str) {
    ctx.deselect_if_active(id);
    if ctx.scene.remove(id).is_none() {
        log::warn!("{op}: object {id} not in scene");
        return;
    }
    ctx.scene.request_render();
    ctx.sync_layers();
}

fn set_position(ctx: &mut EditorContext<'_>, id: ObjectId, (left, top): (f64, f64), notify: bool) {
    let Some(obj) = ctx.scene.object_mut(id) else {
        log::warn!("move_object: object {id} not in scene");
        return;
    };
    obj.set(PropKey::Left, PropValue::Number(left));
    obj.set(PropKey::Top, PropValue::Number(top));
    obj.set_coords();
    if notify {
        ctx.events.push(EditorEvent::SceneSynced { object: id });
    }
    ctx.scene.request_render();
}

fn apply_changes(
    ctx: &mut EditorContext<'_>,
    changes: &[ObjectChange],
    value_of: impl Fn(&PropChange) -> Option<PropValue>,
    notify: bool,
) {
    let mut touches_layers = false;
    for change in changes {
        let Some(obj) = ctx.scene.object_mut(change.object) else {
            log::warn!("update_props: object {} not in scene", change.object);
            continue;
        };
        let mut geometry = false;
        for c in &change.changes {
            match value_of(c) {
                Some(value) => obj.set(c.key, value),
                None => obj.unset(c.key),
            };
            geometry |= c.key.affects_geometry();
            touches_layers |= matches!(c.key, PropKey::Name | PropKey::Visible | PropKey::Locked);
        }
        if geometry {
            obj.set_coords();
        }
        if notify {
            ctx.events.push(EditorEvent::SceneSynced {
                object: change.object,
            });
        }
    }
    // One repaint for the whole batch.
    ctx.scene.request_render();
    if touches_layers {
        ctx.sync_layers();
    }
}

fn restore_styles(ctx: &mut EditorContext<'_>, id: ObjectId, styles: &TextStyles, notify: bool) {
    let Some(obj) = ctx.scene.object_mut(id) else {
        log::warn!("update_text_selection_styles: object {id} not in scene");
        return;
    };
    obj.styles = styles.clone();
    obj.set_coords();
    if notify {
        ctx.events.push(EditorEvent::SceneSynced { object: id });
    }
    ctx.scene.request_render();
}

fn reorder(ctx: &mut EditorContext<'_>, from: usize, to: usize) {
    if ctx.layers.reorder_layers(ctx.scene, from, to) {
        ctx.scene.request_render();
        ctx.events.push(EditorEvent::LayersChanged);
    }
}

fn set_visibility(ctx: &mut EditorContext<'_>, layer: LayerId, visible: bool) {
    let was_active = ctx.scene.active();
    if ctx.layers.set_visibility(ctx.scene, layer, visible).is_none() {
        log::warn!("toggle_layer_visibility: {layer} did not resolve");
        return;
    }
    if was_active.is_some() && ctx.scene.active().is_none() {
        ctx.events.push(EditorEvent::SelectionChanged { object: None });
    }
    ctx.scene.request_render();
    ctx.events.push(EditorEvent::LayersChanged);
}

fn set_locked(ctx: &mut EditorContext<'_>, layer: LayerId, locked: bool) {
    let was_active = ctx.scene.active();
    if ctx.layers.set_locked(ctx.scene, layer, locked).is_none() {
        log::warn!("toggle_layer_lock: {layer} did not resolve");
        return;
    }
    if was_active.is_some() && ctx.scene.active().is_none() {
        ctx.events.push(EditorEvent::SelectionChanged { object: None });
    }
    ctx.events.push(EditorEvent::LayersChanged);
}

fn rename(ctx: &mut EditorContext<'_>, layer: LayerId, name: &str) {
    if ctx.layers.rename_layer(ctx.scene, layer, name).is_none() {
        log::warn!("rename_layer: {layer} did not resolve");
        return;
    }
    ctx.events.push(EditorEvent::LayersChanged);
}
