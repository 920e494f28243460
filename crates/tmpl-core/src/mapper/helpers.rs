//! Conversion helpers shared by every per-type mapper.

use crate::model::{Color, PropKey, PropValue, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// Object position as shown in property panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, angle: 0.0 }
    }
}

/// One entry of a font picker (family or weight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontOption {
    pub label: String,
    pub value: String,
}

impl FontOption {
    pub fn new(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

/// Selected options of a font picker. Usually zero or one entry.
pub type FontSelection = SmallVec<[FontOption; 1]>;

/// Read `{left, top, angle}`, defaulting missing or non-numeric fields to 0.
pub fn read_position(obj: &SceneObject) -> Position {
    Position {
        x: coerce_number(obj.get(PropKey::Left), 0.0),
        y: coerce_number(obj.get(PropKey::Top), 0.0),
        angle: coerce_number(obj.get(PropKey::Angle), 0.0),
    }
}

/// Numeric value of an attribute, or `fallback` if absent or non-numeric.
pub fn coerce_number(value: Option<&PropValue>, fallback: f64) -> f64 {
    value.and_then(PropValue::as_f64).unwrap_or(fallback)
}

/// Numeric value of a form field, or `fallback` if it is not a finite
/// number or a numeric string.
pub fn coerce_json_number(value: &Value, fallback: f64) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(fallback),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(fallback),
        _ => fallback,
    }
}

/// String attribute, or `fallback` if absent. Numbers are stringified.
pub fn coerce_string(value: Option<&PropValue>, fallback: &str) -> String {
    match value {
        Some(PropValue::Text(s)) => s.clone(),
        Some(PropValue::Number(n)) => n.to_string(),
        _ => fallback.to_string(),
    }
}

/// String form field, or `None` for anything that isn't a string or number.
pub fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `50` → `0.5`.
pub fn percent_to_decimal(percent: f64) -> f64 {
    percent / 100.0
}

/// `0.5` → `50`, rounded to a whole percent.
pub fn decimal_to_percent(decimal: f64) -> f64 {
    (decimal * 100.0).round()
}

/// Normalize a hex color to `#RRGGBB[AA]`. Unparseable input (e.g. a CSS
/// color name) passes through unchanged.
pub fn normalize_color(value: &str) -> String {
    Color::from_hex(value)
        .map(|c| c.to_hex())
        .unwrap_or_else(|| value.to_string())
}

/// Canvas scalar → single-entry picker selection. Empty strings select nothing.
pub fn font_selection(value: &str) -> FontSelection {
    let mut sel = FontSelection::new();
    if !value.is_empty() {
        sel.push(FontOption::new(value));
    }
    sel
}

/// Picker selection → canvas scalar; `None` when nothing is selected.
pub fn selected_font(sel: &[FontOption]) -> Option<PropValue> {
    sel.first().map(|o| PropValue::Text(o.value.clone()))
}

/// Parse a picker update: a bare string, a single `{label, value}` object,
/// or an array of them.
pub fn json_font_selection(value: &Value) -> Option<FontSelection> {
    match value {
        Value::String(s) => Some(font_selection(s)),
        Value::Array(_) => serde_json::from_value::<Vec<FontOption>>(value.clone())
            .ok()
            .map(FontSelection::from_vec),
        Value::Object(_) => serde_json::from_value::<FontOption>(value.clone())
            .ok()
            .map(|o| smallvec::smallvec![o]),
        Value::Null => Some(FontSelection::new()),
        _ => None,
    }
}

/// Apply a `x` / `y` / `angle` field update. Returns false for other fields.
pub fn apply_position_field(position: &mut Position, field: &str, value: &Value) -> bool {
    match field {
        "x" => position.x = coerce_json_number(value, position.x),
        "y" => position.y = coerce_json_number(value, position.y),
        "angle" => position.angle = coerce_json_number(value, position.angle),
        _ => return false,
    }
    true
}
