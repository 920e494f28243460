//! Property-panel form state.
//!
//! Holds the form DTO for the bound object. User edits go through
//! [`FormState::patch_value`], which records a [`PropertyChanged`] per field;
//! values pushed from the scene (after undo/redo) are applied silently so
//! they never turn into new commands.

use crate::bus::PropertyChanged;
use serde_json::{Map, Value};
use tmpl_core::{FormValues, ObjectId, SceneObject};

/// Options for [`FormState::patch_value`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Apply the values without emitting change events.
    pub silent: bool,
}

impl PatchOptions {
    pub const SILENT: Self = Self { silent: true };
}

#[derive(Debug, Default)]
pub struct FormState {
    object: Option<ObjectId>,
    values: Option<FormValues>,
    changes: Vec<PropertyChanged>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the form to an object and load its current values. Loading
    /// never emits change events.
    pub fn load(&mut self, obj: &SceneObject) {
        if self.object != Some(obj.id) {
            self.changes.clear();
        }
        self.object = Some(obj.id);
        self.values = Some(FormValues::for_object(obj));
    }

    pub fn unbind(&mut self) {
        self.object = None;
        self.values = None;
        self.changes.clear();
    }

    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn values(&self) -> Option<&FormValues> {
        self.values.as_ref()
    }

    /// Apply a partial update, keyed by form field name.
    ///
    /// Unknown fields are ignored. Unless `opts.silent` is set, every
    /// applied field is recorded as a [`PropertyChanged`]. Returns how many
    /// fields were applied.
    pub fn patch_value(&mut self, partial: &Map<String, Value>, opts: PatchOptions) -> usize {
        let (Some(object), Some(values)) = (self.object, self.values.as_mut()) else {
            log::warn!("patch_value: form is not bound to an object");
            return 0;
        };
        let mut applied = 0;
        for (field, value) in partial {
            if !values.apply_field(field, value) {
                log::warn!("patch_value: {} form has no field {field}", values.kind());
                continue;
            }
            applied += 1;
            if !opts.silent {
                self.changes.push(PropertyChanged {
                    object,
                    field: field.clone(),
                    value: value.clone(),
                });
            }
        }
        applied
    }

    /// Take every change recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<PropertyChanged> {
        std::mem::take(&mut self.changes)
    }
}
