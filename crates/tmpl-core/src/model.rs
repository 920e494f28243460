//! Scene-object data model for template documents.
//!
//! A template is a flat, z-ordered collection of typed scene objects. Each
//! object carries a sparse attribute map keyed by [`PropKey`]; the typed
//! per-kind views used by property panels live in [`crate::mapper`].
//! Text objects additionally carry a per-character style map.

use crate::geometry;
use crate::id::ObjectId;
use crate::style::TextStyles;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, 1.0)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Object kinds & enumerated attributes ────────────────────────────────

/// The kinds of objects a template canvas can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Text,
    Image,
    Button,
    Frame,
    Shape,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Text => "text",
            ObjectType::Image => "image",
            ObjectType::Button => "button",
            ObjectType::Frame => "frame",
            ObjectType::Shape => "shape",
        }
    }

    /// Default layer name for a freshly created object of this kind.
    pub fn default_name(&self) -> &'static str {
        match self {
            ObjectType::Text => "Text",
            ObjectType::Image => "Image",
            ObjectType::Button => "Button",
            ObjectType::Frame => "Frame",
            ObjectType::Shape => "Shape",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    /// Lenient parse; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

/// Outline of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonShape {
    #[default]
    Rectangle,
    Rounded,
    Pill,
}

impl ButtonShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonShape::Rectangle => "rectangle",
            ButtonShape::Rounded => "rounded",
            ButtonShape::Pill => "pill",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangle" => Some(ButtonShape::Rectangle),
            "rounded" => Some(ButtonShape::Rounded),
            "pill" => Some(ButtonShape::Pill),
            _ => None,
        }
    }
}

/// How a button paints its background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Fill,
    Outline,
    Text,
}

impl ButtonStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonStyle::Fill => "fill",
            ButtonStyle::Outline => "outline",
            ButtonStyle::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" => Some(ButtonStyle::Fill),
            "outline" => Some(ButtonStyle::Outline),
            "text" => Some(ButtonStyle::Text),
            _ => None,
        }
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// Attribute keys understood by canvas objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropKey {
    Left,
    Top,
    Angle,
    Width,
    Height,
    Fill,
    FontFamily,
    FontWeight,
    FontSize,
    TextAlign,
    Text,
    Opacity,
    /// Corner radius.
    Rx,
    Src,
    Visible,
    Locked,
    Shape,
    ButtonStyle,
    ButtonColor,
    TextColor,
    Link,
    BgColor,
    Name,
}

impl PropKey {
    pub const ALL: [PropKey; 23] = [
        PropKey::Left,
        PropKey::Top,
        PropKey::Angle,
        PropKey::Width,
        PropKey::Height,
        PropKey::Fill,
        PropKey::FontFamily,
        PropKey::FontWeight,
        PropKey::FontSize,
        PropKey::TextAlign,
        PropKey::Text,
        PropKey::Opacity,
        PropKey::Rx,
        PropKey::Src,
        PropKey::Visible,
        PropKey::Locked,
        PropKey::Shape,
        PropKey::ButtonStyle,
        PropKey::ButtonColor,
        PropKey::TextColor,
        PropKey::Link,
        PropKey::BgColor,
        PropKey::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropKey::Left => "left",
            PropKey::Top => "top",
            PropKey::Angle => "angle",
            PropKey::Width => "width",
            PropKey::Height => "height",
            PropKey::Fill => "fill",
            PropKey::FontFamily => "fontFamily",
            PropKey::FontWeight => "fontWeight",
            PropKey::FontSize => "fontSize",
            PropKey::TextAlign => "textAlign",
            PropKey::Text => "text",
            PropKey::Opacity => "opacity",
            PropKey::Rx => "rx",
            PropKey::Src => "src",
            PropKey::Visible => "visible",
            PropKey::Locked => "locked",
            PropKey::Shape => "shape",
            PropKey::ButtonStyle => "buttonStyle",
            PropKey::ButtonColor => "buttonColor",
            PropKey::TextColor => "textColor",
            PropKey::Link => "link",
            PropKey::BgColor => "bgColor",
            PropKey::Name => "name",
        }
    }

    /// Keys whose change alters the object's bounding box.
    pub fn affects_geometry(&self) -> bool {
        matches!(
            self,
            PropKey::Left
                | PropKey::Top
                | PropKey::Angle
                | PropKey::Width
                | PropKey::Height
                | PropKey::FontSize
                | PropKey::Text
        )
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown property key `{s}`"))
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) if n.is_finite() => Some(*n),
            PropValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Text(v)
    }
}

// ─── Scene objects ───────────────────────────────────────────────────────

/// A drawable object on the template canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,

    /// What kind of element this is.
    pub kind: ObjectType,

    /// Sparse attribute map. Missing keys fall back to per-kind defaults
    /// when read through the property mapper.
    pub props: BTreeMap<PropKey, PropValue>,

    /// Per-character rich-text styles (text objects only).
    #[serde(default)]
    pub styles: TextStyles,

    /// Axis-aligned bounding box, recomputed by [`SceneObject::set_coords`].
    #[serde(skip)]
    pub bounds: Rect,
}

impl SceneObject {
    pub fn new(id: ObjectId, kind: ObjectType) -> Self {
        let mut obj = Self {
            id,
            kind,
            props: BTreeMap::new(),
            styles: TextStyles::default(),
            bounds: Rect::ZERO,
        };
        obj.props
            .insert(PropKey::Name, PropValue::from(kind.default_name()));
        obj.props.insert(PropKey::Visible, PropValue::Bool(true));
        obj.props.insert(PropKey::Locked, PropValue::Bool(false));
        obj
    }

    /// Builder-style attribute assignment.
    #[must_use]
    pub fn with(mut self, key: PropKey, value: impl Into<PropValue>) -> Self {
        self.props.insert(key, value.into());
        self.set_coords();
        self
    }

    pub fn get(&self, key: PropKey) -> Option<&PropValue> {
        self.props.get(&key)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&mut self, key: PropKey, value: PropValue) -> Option<PropValue> {
        self.props.insert(key, value)
    }

    /// Remove an attribute, returning the previous value.
    pub fn unset(&mut self, key: PropKey) -> Option<PropValue> {
        self.props.remove(&key)
    }

    pub fn number(&self, key: PropKey) -> Option<f64> {
        self.get(key).and_then(PropValue::as_f64)
    }

    pub fn text(&self, key: PropKey) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    pub fn name(&self) -> &str {
        self.text(PropKey::Name).unwrap_or(self.kind.default_name())
    }

    pub fn visible(&self) -> bool {
        self.get(PropKey::Visible)
            .and_then(PropValue::as_bool)
            .unwrap_or(true)
    }

    pub fn locked(&self) -> bool {
        self.get(PropKey::Locked)
            .and_then(PropValue::as_bool)
            .unwrap_or(false)
    }

    /// Top-left corner `(left, top)`, defaulting to the origin.
    pub fn position(&self) -> (f64, f64) {
        (
            self.number(PropKey::Left).unwrap_or(0.0),
            self.number(PropKey::Top).unwrap_or(0.0),
        )
    }

    /// Recompute the cached bounding box from position, size and angle.
    pub fn set_coords(&mut self) {
        self.bounds = geometry::bounding_box(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#3366FF").unwrap();
        assert_eq!(c.to_hex(), "#3366FF");
        assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#00000080").unwrap().to_hex(), "#00000080");
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn prop_key_parse() {
        assert_eq!("fontSize".parse::<PropKey>(), Ok(PropKey::FontSize));
        assert_eq!("bgColor".parse::<PropKey>(), Ok(PropKey::BgColor));
        assert!("nope".parse::<PropKey>().is_err());
        for key in PropKey::ALL {
            assert_eq!(key.as_str().parse::<PropKey>(), Ok(key));
        }
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(PropValue::from("12.5").as_f64(), Some(12.5));
        assert_eq!(PropValue::from("abc").as_f64(), None);
        assert_eq!(PropValue::Bool(true).as_f64(), None);
        assert_eq!(PropValue::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn new_object_defaults() {
        let obj = SceneObject::new(ObjectId::intern("t1"), ObjectType::Text);
        assert_eq!(obj.name(), "Text");
        assert!(obj.visible());
        assert!(!obj.locked());
        assert_eq!(obj.position(), (0.0, 0.0));
    }

    #[test]
    fn set_returns_previous_value() {
        let mut obj = SceneObject::new(ObjectId::intern("img"), ObjectType::Image);
        assert_eq!(obj.set(PropKey::Width, 10.0.into()), None);
        assert_eq!(
            obj.set(PropKey::Width, 20.0.into()),
            Some(PropValue::Number(10.0))
        );
        assert_eq!(obj.unset(PropKey::Width), Some(PropValue::Number(20.0)));
        assert_eq!(obj.get(PropKey::Width), None);
    }
}
