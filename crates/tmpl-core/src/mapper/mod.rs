//! Property mapping between canvas attributes and form DTOs.
//!
//! Each object kind has a stateless mapper implementing [`PropertyMapper`]:
//! a typed canvas view (`*Properties`, read from a [`SceneObject`]) converts
//! to a form DTO (`*FormValues`) and back to a [`PropertyPatch`]. The mapper
//! never touches the scene; callers apply patches through a command.

pub mod button;
pub mod frame;
pub mod helpers;
pub mod image;
pub mod shape;
pub mod text;

pub use button::{ButtonFormValues, ButtonMapper, ButtonProperties};
pub use frame::{FrameFormValues, FrameMapper, FrameProperties};
pub use helpers::{FontOption, FontSelection, Position};
pub use image::{ImageFormValues, ImageMapper, ImageProperties};
pub use shape::{ShapeFormValues, ShapeMapper, ShapeProperties};
pub use text::{TextFormValues, TextMapper, TextProperties};

use crate::model::{ObjectType, PropKey, PropValue, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ─── Patches ─────────────────────────────────────────────────────────────

/// A partial attribute set produced by a mapper.
///
/// A key mapped to `None` is "undefined": the form had no value for it and
/// it must not be written to the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    entries: BTreeMap<PropKey, Option<PropValue>>,
}

impl PropertyPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a defined value.
    #[must_use]
    pub fn with(mut self, key: PropKey, value: impl Into<PropValue>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    /// Builder-style insert of an undefined value.
    #[must_use]
    pub fn with_undefined(mut self, key: PropKey) -> Self {
        self.set(key, None);
        self
    }

    pub fn set(&mut self, key: PropKey, value: Option<PropValue>) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: PropKey) -> Option<&PropValue> {
        self.entries.get(&key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: PropKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, including undefined ones.
    pub fn iter(&self) -> impl Iterator<Item = (PropKey, Option<&PropValue>)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// Only the entries with a defined value.
    pub fn defined(&self) -> impl Iterator<Item = (PropKey, &PropValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (*k, v)))
    }

    /// Merge `other` on top of `self`.
    pub fn extend(&mut self, other: PropertyPatch) {
        self.entries.extend(other.entries);
    }
}

impl FromIterator<(PropKey, Option<PropValue>)> for PropertyPatch {
    fn from_iter<I: IntoIterator<Item = (PropKey, Option<PropValue>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ─── Mapper contract ─────────────────────────────────────────────────────

/// Stateless, per-kind conversion between canvas and form representations.
pub trait PropertyMapper {
    /// Typed canvas-side view of the object.
    type Canvas;
    /// Form-side DTO.
    type Form;

    /// Read the canvas view from an object, coercing missing or malformed
    /// attributes to per-kind defaults.
    fn read(obj: &SceneObject) -> Self::Canvas;

    fn to_form_values(canvas: &Self::Canvas) -> Self::Form;

    fn to_canvas_properties(form: &Self::Form) -> PropertyPatch;
}

// ─── Discriminated unions ────────────────────────────────────────────────

/// Canvas view of any object, keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasObjectProperties {
    Text(TextProperties),
    Image(ImageProperties),
    Button(ButtonProperties),
    Frame(FrameProperties),
    Shape(ShapeProperties),
}

impl CanvasObjectProperties {
    pub fn from_object(obj: &SceneObject) -> Self {
        match obj.kind {
            ObjectType::Text => Self::Text(TextMapper::read(obj)),
            ObjectType::Image => Self::Image(ImageMapper::read(obj)),
            ObjectType::Button => Self::Button(ButtonMapper::read(obj)),
            ObjectType::Frame => Self::Frame(FrameMapper::read(obj)),
            ObjectType::Shape => Self::Shape(ShapeMapper::read(obj)),
        }
    }

    pub fn kind(&self) -> ObjectType {
        match self {
            Self::Text(_) => ObjectType::Text,
            Self::Image(_) => ObjectType::Image,
            Self::Button(_) => ObjectType::Button,
            Self::Frame(_) => ObjectType::Frame,
            Self::Shape(_) => ObjectType::Shape,
        }
    }

    pub fn to_form_values(&self) -> FormValues {
        match self {
            Self::Text(p) => FormValues::Text(TextMapper::to_form_values(p)),
            Self::Image(p) => FormValues::Image(ImageMapper::to_form_values(p)),
            Self::Button(p) => FormValues::Button(ButtonMapper::to_form_values(p)),
            Self::Frame(p) => FormValues::Frame(FrameMapper::to_form_values(p)),
            Self::Shape(p) => FormValues::Shape(ShapeMapper::to_form_values(p)),
        }
    }
}

/// Form DTO of any object, keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormValues {
    Text(TextFormValues),
    Image(ImageFormValues),
    Button(ButtonFormValues),
    Frame(FrameFormValues),
    Shape(ShapeFormValues),
}

impl FormValues {
    /// Form values for an object's current attributes.
    pub fn for_object(obj: &SceneObject) -> Self {
        CanvasObjectProperties::from_object(obj).to_form_values()
    }

    pub fn kind(&self) -> ObjectType {
        match self {
            Self::Text(_) => ObjectType::Text,
            Self::Image(_) => ObjectType::Image,
            Self::Button(_) => ObjectType::Button,
            Self::Frame(_) => ObjectType::Frame,
            Self::Shape(_) => ObjectType::Shape,
        }
    }

    pub fn to_canvas_properties(&self) -> PropertyPatch {
        match self {
            Self::Text(f) => TextMapper::to_canvas_properties(f),
            Self::Image(f) => ImageMapper::to_canvas_properties(f),
            Self::Button(f) => ButtonMapper::to_canvas_properties(f),
            Self::Frame(f) => FrameMapper::to_canvas_properties(f),
            Self::Shape(f) => ShapeMapper::to_canvas_properties(f),
        }
    }

    /// Apply one form-control update. Malformed numbers keep the current
    /// value. Returns false if the field is unknown for this kind.
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        match self {
            Self::Text(f) => f.apply_field(field, value),
            Self::Image(f) => f.apply_field(field, value),
            Self::Button(f) => f.apply_field(field, value),
            Self::Frame(f) => f.apply_field(field, value),
            Self::Shape(f) => f.apply_field(field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use pretty_assertions::assert_eq;

    #[test]
    fn patch_skips_undefined_in_defined_iter() {
        let patch = PropertyPatch::new()
            .with(PropKey::Width, 20.0)
            .with_undefined(PropKey::Height);
        assert_eq!(patch.len(), 2);
        let defined: Vec<PropKey> = patch.defined().map(|(k, _)| k).collect();
        assert_eq!(defined, vec![PropKey::Width]);
        assert!(patch.contains_key(PropKey::Height));
        assert_eq!(patch.get(PropKey::Height), None);
    }

    #[test]
    fn union_dispatches_on_kind() {
        for kind in [
            ObjectType::Text,
            ObjectType::Image,
            ObjectType::Button,
            ObjectType::Frame,
            ObjectType::Shape,
        ] {
            let obj = SceneObject::new(ObjectId::with_prefix(kind.as_str()), kind);
            let props = CanvasObjectProperties::from_object(&obj);
            assert_eq!(props.kind(), kind);
            assert_eq!(props.to_form_values().kind(), kind);
        }
    }

    #[test]
    fn form_values_serialize_with_type_tag() {
        let obj = SceneObject::new(ObjectId::intern("m_frame"), ObjectType::Frame)
            .with(PropKey::BgColor, "#FFFFFF");
        let json = serde_json::to_value(FormValues::for_object(&obj)).unwrap();
        assert_eq!(json["type"], "frame");
        assert_eq!(json["bgColor"], "#FFFFFF");
    }
}
