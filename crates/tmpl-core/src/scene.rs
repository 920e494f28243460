//! Scene facade: the boundary to the drawable-object surface.
//!
//! The rendering surface owns the live objects and their z-order. The core
//! only talks to it through [`SceneFacade`]. [`MemoryScene`] is an in-memory
//! implementation for headless hosts and tests.

use crate::id::ObjectId;
use crate::model::SceneObject;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

/// Operations the core consumes from the drawable-object surface.
///
/// Indices are z-order positions: `0` is the bottom-most object.
pub trait SceneFacade {
    /// Append an object on top of the stack.
    fn add(&mut self, obj: SceneObject);

    /// Remove an object, returning it if it was present.
    fn remove(&mut self, id: ObjectId) -> Option<SceneObject>;

    /// Insert an object at a z-index. Indices past the end append.
    fn insert_at(&mut self, index: usize, obj: SceneObject);

    /// Object IDs in z-order, bottom first.
    fn objects(&self) -> Vec<ObjectId>;

    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject>;

    /// Make `id` the active selection. Returns false if it does not exist.
    fn set_active(&mut self, id: ObjectId) -> bool;

    fn discard_active(&mut self);

    fn active(&self) -> Option<ObjectId>;

    /// Ask the surface to repaint on its next frame.
    fn request_render(&mut self);

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects().iter().position(|o| *o == id)
    }

    fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    fn len(&self) -> usize {
        self.objects().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move an object to the top of the stack.
    fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let last = self.len().saturating_sub(1);
        self.move_to(id, last)
    }

    /// Move an object to z-index `to`. The active selection is kept.
    fn move_to(&mut self, id: ObjectId, to: usize) -> bool {
        let was_active = self.active() == Some(id);
        let Some(obj) = self.remove(id) else {
            return false;
        };
        self.insert_at(to, obj);
        if was_active {
            self.set_active(id);
        }
        true
    }
}

/// In-memory scene backed by a stable graph arena.
///
/// Objects are flat, so the graph holds nodes only and no edges. Stacking
/// lives in the `order` vector. `StableDiGraph` keeps node indices valid
/// across removals, so the z-order vector and the ID index never need
/// renumbering.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    graph: StableDiGraph<SceneObject, ()>,

    /// Z-order, bottom first.
    order: Vec<NodeIndex>,

    /// Index from ObjectId → NodeIndex for fast lookup.
    id_index: HashMap<ObjectId, NodeIndex>,

    active: Option<ObjectId>,

    render_requests: usize,
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many repaints have been requested so far.
    pub fn render_requests(&self) -> usize {
        self.render_requests
    }

    /// Iterate objects in z-order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().map(|idx| &self.graph[*idx])
    }

    fn insert_node(&mut self, obj: SceneObject) -> NodeIndex {
        // Re-adding an existing ID replaces the stale entry.
        if let Some(old) = self.id_index.get(&obj.id).copied() {
            self.order.retain(|i| *i != old);
            self.graph.remove_node(old);
        }
        let id = obj.id;
        let idx = self.graph.add_node(obj);
        self.id_index.insert(id, idx);
        idx
    }
}

impl SceneFacade for MemoryScene {
    fn add(&mut self, mut obj: SceneObject) {
        obj.set_coords();
        let idx = self.insert_node(obj);
        self.order.push(idx);
    }

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.id_index.remove(&id)?;
        self.order.retain(|i| *i != idx);
        if self.active == Some(id) {
            self.active = None;
        }
        self.graph.remove_node(idx)
    }

    fn insert_at(&mut self, index: usize, mut obj: SceneObject) {
        obj.set_coords();
        let idx = self.insert_node(obj);
        let at = index.min(self.order.len());
        self.order.insert(at, idx);
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.order.iter().map(|idx| self.graph[*idx].id).collect()
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    fn set_active(&mut self, id: ObjectId) -> bool {
        if self.id_index.contains_key(&id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    fn discard_active(&mut self) {
        self.active = None;
    }

    fn active(&self) -> Option<ObjectId> {
        self.active
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
        log::trace!("render requested ({} total)", self.render_requests);
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        let idx = self.id_index.get(&id)?;
        self.order.iter().position(|i| i == idx)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn move_to(&mut self, id: ObjectId, to: usize) -> bool {
        let Some(idx) = self.id_index.get(&id).copied() else {
            return false;
        };
        self.order.retain(|i| *i != idx);
        let at = to.min(self.order.len());
        self.order.insert(at, idx);
        true
    }
}
