//! Typed, single-threaded event bus between forms and the core.
//!
//! Forms emit [`PropertyChanged`]; the core emits [`EditorEvent`]s.
//! Consumers subscribe explicitly and pull their own queue, so publishing
//! never runs subscriber code and can't re-enter the history manager.
//!
//! Rapid form edits go through a [`CoalescingQueue`], which implements the
//! debounce and distinct-until-changed policies with a caller-supplied clock.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tmpl_core::ObjectId;

/// Events emitted by the core after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// An object's attributes were changed by history traversal; bound
    /// forms should reload it.
    SceneSynced { object: ObjectId },
    /// Layer order, names, visibility or lock state changed.
    LayersChanged,
    /// The active selection changed.
    SelectionChanged { object: Option<ObjectId> },
}

/// A single form-control edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChanged {
    pub object: ObjectId,
    pub field: String,
    pub value: Value,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Fan-out queue: every published event is delivered to every subscriber.
#[derive(Debug)]
pub struct EventBus<E> {
    subscribers: Vec<(SubscriberId, VecDeque<E>)>,
    next_id: u32,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, VecDeque::new()));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: E) {
        for (_, queue) in &mut self.subscribers {
            queue.push_back(event.clone());
        }
    }

    /// Take every pending event for a subscriber, oldest first.
    pub fn drain(&mut self, id: SubscriberId) -> Vec<E> {
        self.subscribers
            .iter_mut()
            .find(|(s, _)| *s == id)
            .map(|(_, q)| q.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, id: SubscriberId) -> usize {
        self.subscribers
            .iter()
            .find(|(s, _)| *s == id)
            .map_or(0, |(_, q)| q.len())
    }
}

type FieldKey = (ObjectId, String);

/// Debounce + distinct policy for form edits.
///
/// Edits to the same `(object, field)` replace each other and restart the
/// quiet period. An edit is due once `window_ms` has passed since its last
/// update. With `distinct` set, a due edit whose value equals the last
/// committed value for that field is dropped. Values become committed only
/// through [`CoalescingQueue::mark_committed`], once the caller has
/// actually applied them.
#[derive(Debug)]
pub struct CoalescingQueue {
    window_ms: u64,
    distinct: bool,
    pending: Vec<(PropertyChanged, u64)>,
    committed: HashMap<FieldKey, Value>,
}

impl CoalescingQueue {
    pub fn new(window_ms: u64, distinct: bool) -> Self {
        Self {
            window_ms,
            distinct,
            pending: Vec::new(),
            committed: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Queue an edit observed at `now_ms`.
    pub fn push(&mut self, event: PropertyChanged, now_ms: u64) {
        match self
            .pending
            .iter_mut()
            .find(|(p, _)| p.object == event.object && p.field == event.field)
        {
            Some(slot) => *slot = (event, now_ms),
            None => self.pending.push((event, now_ms)),
        }
    }

    /// Release every edit whose quiet period has elapsed, in arrival order.
    pub fn flush_due(&mut self, now_ms: u64) -> Vec<PropertyChanged> {
        let window = self.window_ms;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(_, at)| now_ms.saturating_sub(*at) >= window);
        self.pending = waiting;
        self.release(due.into_iter().map(|(e, _)| e))
    }

    /// Release everything regardless of timing.
    pub fn flush_all(&mut self) -> Vec<PropertyChanged> {
        let all = std::mem::take(&mut self.pending);
        self.release(all.into_iter().map(|(e, _)| e))
    }

    /// Forget every committed value and pending edit for an object, e.g.
    /// after history traversal changed it underneath the form.
    pub fn reset(&mut self, object: ObjectId) {
        self.committed.retain(|(o, _), _| *o != object);
        self.pending.retain(|(p, _)| p.object != object);
    }

    /// Record released edits as the distinct baseline for their fields.
    pub fn mark_committed(&mut self, events: &[PropertyChanged]) {
        for event in events {
            self.committed
                .insert((event.object, event.field.clone()), event.value.clone());
        }
    }

    fn release(&self, events: impl Iterator<Item = PropertyChanged>) -> Vec<PropertyChanged> {
        events
            .filter(|event| {
                let key = (event.object, event.field.clone());
                let unchanged = self.distinct && self.committed.get(&key) == Some(&event.value);
                if unchanged {
                    log::trace!("suppressed unchanged edit {}.{}", event.object, event.field);
                }
                !unchanged
            })
            .collect()
    }
}
