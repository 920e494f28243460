//! Layer registry: the UI-facing projection of scene z-order.
//!
//! Each scene object has exactly one [`Layer`] record, and registry order
//! equals scene z-order (index 0 = bottom). Layers refer to their object by
//! [`ObjectId`] only; every mutation resolves it through the [`SceneFacade`]
//! and writes visibility, lock and name back to the object, so a rebuild via
//! [`LayerRegistry::sync_layers`] never loses them.

use crate::id::{LayerId, ObjectId};
use crate::model::{ObjectType, PropKey, PropValue, SceneObject};
use crate::scene::SceneFacade;
use serde::{Deserialize, Serialize};

/// A lightweight record describing one scene object in the layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: ObjectType,
    pub visible: bool,
    pub locked: bool,
    /// Lookup key of the backing scene object (non-owning).
    pub scene_ref: ObjectId,
    /// Set while the layer name is being edited inline.
    pub editing_name: bool,
}

impl Layer {
    pub fn from_object(obj: &SceneObject) -> Self {
        Self {
            id: LayerId::for_object(obj.id),
            name: obj.name().to_string(),
            kind: obj.kind,
            visible: obj.visible(),
            locked: obj.locked(),
            scene_ref: obj.id,
            editing_name: false,
        }
    }
}

/// Ordered list of layer records.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers in z-order, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_for_object(&self, object: ObjectId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.scene_ref == object)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Rebuild the list by enumerating the scene in z-order.
    ///
    /// Called after any structural change the registry did not perform
    /// itself. The inline-rename flag survives for layers that still exist.
    pub fn sync_layers(&mut self, scene: &dyn SceneFacade) {
        let editing: Vec<LayerId> = self
            .layers
            .iter()
            .filter(|l| l.editing_name)
            .map(|l| l.id)
            .collect();

        self.layers = scene
            .objects()
            .into_iter()
            .filter_map(|id| scene.object(id))
            .map(|obj| {
                let mut layer = Layer::from_object(obj);
                layer.editing_name = editing.contains(&layer.id);
                layer
            })
            .collect();
        log::trace!("layers rebuilt: {} records", self.layers.len());
    }

    /// Move the layer at `previous` to `current` (remove-then-insert) and
    /// mirror the move into scene z-order.
    ///
    /// Returns false without changing anything if either index is out of
    /// range.
    pub fn reorder_layers(
        &mut self,
        scene: &mut dyn SceneFacade,
        previous: usize,
        current: usize,
    ) -> bool {
        let len = self.layers.len();
        if previous >= len || current >= len {
            log::warn!("reorder_layers: index out of range ({previous} -> {current}, len {len})");
            return false;
        }
        if previous == current {
            return true;
        }
        let layer = self.layers.remove(previous);
        let object = layer.scene_ref;
        self.layers.insert(current, layer);
        if !scene.move_to(object, current) {
            log::warn!("reorder_layers: scene object {object} not found");
        }
        true
    }

    /// Set a layer's visibility. Hiding the active object clears the
    /// selection. Returns the previous visibility.
    pub fn set_visibility(
        &mut self,
        scene: &mut dyn SceneFacade,
        id: LayerId,
        visible: bool,
    ) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|l| l.id == id)?;
        let Some(obj) = scene.object_mut(layer.scene_ref) else {
            log::warn!("set_visibility: layer {id} has no scene object");
            return None;
        };
        let previous = layer.visible;
        layer.visible = visible;
        obj.set(PropKey::Visible, PropValue::Bool(visible));
        if !visible && scene.active() == Some(layer.scene_ref) {
            scene.discard_active();
        }
        Some(previous)
    }

    /// Flip a layer's visibility. Returns the new visibility.
    pub fn toggle_visibility(&mut self, scene: &mut dyn SceneFacade, id: LayerId) -> Option<bool> {
        let visible = self.layer(id)?.visible;
        self.set_visibility(scene, id, !visible).map(|prev| !prev)
    }

    /// Lock or unlock a layer. Locking the active object clears the
    /// selection. Returns the previous lock state.
    pub fn set_locked(
        &mut self,
        scene: &mut dyn SceneFacade,
        id: LayerId,
        locked: bool,
    ) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|l| l.id == id)?;
        let Some(obj) = scene.object_mut(layer.scene_ref) else {
            log::warn!("set_locked: layer {id} has no scene object");
            return None;
        };
        let previous = layer.locked;
        layer.locked = locked;
        obj.set(PropKey::Locked, PropValue::Bool(locked));
        if locked && scene.active() == Some(layer.scene_ref) {
            scene.discard_active();
        }
        Some(previous)
    }

    /// Flip a layer's lock state. Returns the new state.
    pub fn toggle_lock(&mut self, scene: &mut dyn SceneFacade, id: LayerId) -> Option<bool> {
        let locked = self.layer(id)?.locked;
        self.set_locked(scene, id, !locked).map(|prev| !prev)
    }

    /// Rename a layer and its object. Returns the previous name.
    pub fn rename_layer(
        &mut self,
        scene: &mut dyn SceneFacade,
        id: LayerId,
        name: &str,
    ) -> Option<String> {
        let layer = self.layers.iter_mut().find(|l| l.id == id)?;
        let Some(obj) = scene.object_mut(layer.scene_ref) else {
            log::warn!("rename_layer: layer {id} has no scene object");
            return None;
        };
        obj.set(PropKey::Name, PropValue::from(name));
        Some(std::mem::replace(&mut layer.name, name.to_string()))
    }

    /// Remove a layer record and its scene object.
    ///
    /// Callers that need to restore the object later must capture its
    /// z-index before calling this.
    pub fn delete_layer(&mut self, scene: &mut dyn SceneFacade, id: LayerId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        let layer = self.layers.remove(index);
        if scene.active() == Some(layer.scene_ref) {
            scene.discard_active();
        }
        let removed = scene.remove(layer.scene_ref);
        if removed.is_none() {
            log::warn!("delete_layer: layer {id} had no scene object");
        }
        removed
    }

    /// Mark a layer as being renamed inline.
    pub fn begin_rename(&mut self, id: LayerId) -> bool {
        self.set_editing(id, true)
    }

    pub fn end_rename(&mut self, id: LayerId) -> bool {
        self.set_editing(id, false)
    }

    fn set_editing(&mut self, id: LayerId, editing: bool) -> bool {
        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                layer.editing_name = editing;
                true
            }
            None => false,
        }
    }
}
