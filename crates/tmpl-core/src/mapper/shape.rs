use super::helpers::{
    Position, apply_position_field, coerce_json_number, coerce_number, coerce_string,
    decimal_to_percent, json_string, normalize_color, percent_to_decimal, read_position,
};
use super::{PropertyMapper, PropertyPatch};
use crate::model::{PropKey, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SHAPE_FILL: &str = "#D1D5DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProperties {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFormValues {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    /// Percentage opacity in `[0, 100]`.
    pub opacity: f64,
}

impl ShapeFormValues {
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        if apply_position_field(&mut self.position, field, value) {
            return true;
        }
        match field {
            "width" => self.width = coerce_json_number(value, self.width),
            "height" => self.height = coerce_json_number(value, self.height),
            "fill" => {
                if let Some(s) = json_string(value) {
                    self.fill = s;
                }
            }
            "opacity" => {
                self.opacity = coerce_json_number(value, self.opacity).clamp(0.0, 100.0);
            }
            _ => return false,
        }
        true
    }
}

pub struct ShapeMapper;

impl PropertyMapper for ShapeMapper {
    type Canvas = ShapeProperties;
    type Form = ShapeFormValues;

    fn read(obj: &SceneObject) -> ShapeProperties {
        ShapeProperties {
            position: read_position(obj),
            width: coerce_number(obj.get(PropKey::Width), 0.0),
            height: coerce_number(obj.get(PropKey::Height), 0.0),
            fill: coerce_string(obj.get(PropKey::Fill), DEFAULT_SHAPE_FILL),
            opacity: coerce_number(obj.get(PropKey::Opacity), 1.0),
        }
    }

    fn to_form_values(canvas: &ShapeProperties) -> ShapeFormValues {
        ShapeFormValues {
            position: canvas.position,
            width: canvas.width,
            height: canvas.height,
            fill: canvas.fill.clone(),
            opacity: decimal_to_percent(canvas.opacity),
        }
    }

    fn to_canvas_properties(form: &ShapeFormValues) -> PropertyPatch {
        PropertyPatch::new()
            .with(PropKey::Left, form.position.x)
            .with(PropKey::Top, form.position.y)
            .with(PropKey::Angle, form.position.angle)
            .with(PropKey::Width, form.width)
            .with(PropKey::Height, form.height)
            .with(PropKey::Fill, normalize_color(&form.fill))
            .with(PropKey::Opacity, percent_to_decimal(form.opacity))
    }
}
