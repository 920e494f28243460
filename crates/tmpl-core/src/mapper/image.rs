use super::helpers::{
    Position, apply_position_field, coerce_json_number, coerce_number, decimal_to_percent,
    json_string, percent_to_decimal, read_position,
};
use super::{PropertyMapper, PropertyPatch};
use crate::model::{PropKey, PropValue, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    /// Decimal opacity in `[0, 1]`.
    pub opacity: f64,
    pub src: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFormValues {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    /// Percentage opacity in `[0, 100]`.
    pub opacity: f64,
    pub src: Option<String>,
    /// Uploaded files not yet assigned a source URL. The first one wins
    /// when `src` is empty.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl ImageFormValues {
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        if apply_position_field(&mut self.position, field, value) {
            return true;
        }
        match field {
            "width" => self.width = coerce_json_number(value, self.width),
            "height" => self.height = coerce_json_number(value, self.height),
            "cornerRadius" => self.corner_radius = coerce_json_number(value, self.corner_radius),
            "opacity" => {
                self.opacity = coerce_json_number(value, self.opacity).clamp(0.0, 100.0);
            }
            "src" => self.src = json_string(value),
            "attachments" => {
                self.attachments = value
                    .as_array()
                    .map(|items| items.iter().filter_map(json_string).collect())
                    .unwrap_or_default();
            }
            _ => return false,
        }
        true
    }
}

pub struct ImageMapper;

impl PropertyMapper for ImageMapper {
    type Canvas = ImageProperties;
    type Form = ImageFormValues;

    fn read(obj: &SceneObject) -> ImageProperties {
        ImageProperties {
            position: read_position(obj),
            width: coerce_number(obj.get(PropKey::Width), 0.0),
            height: coerce_number(obj.get(PropKey::Height), 0.0),
            corner_radius: coerce_number(obj.get(PropKey::Rx), 0.0),
            opacity: coerce_number(obj.get(PropKey::Opacity), 1.0),
            src: obj.text(PropKey::Src).map(str::to_string),
        }
    }

    fn to_form_values(canvas: &ImageProperties) -> ImageFormValues {
        ImageFormValues {
            position: canvas.position,
            width: canvas.width,
            height: canvas.height,
            corner_radius: canvas.corner_radius,
            opacity: decimal_to_percent(canvas.opacity),
            src: canvas.src.clone(),
            attachments: Vec::new(),
        }
    }

    fn to_canvas_properties(form: &ImageFormValues) -> PropertyPatch {
        let src = form
            .src
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| form.attachments.first().cloned());
        let mut patch = PropertyPatch::new()
            .with(PropKey::Left, form.position.x)
            .with(PropKey::Top, form.position.y)
            .with(PropKey::Angle, form.position.angle)
            .with(PropKey::Width, form.width)
            .with(PropKey::Height, form.height)
            .with(PropKey::Rx, form.corner_radius)
            .with(PropKey::Opacity, percent_to_decimal(form.opacity));
        patch.set(PropKey::Src, src.map(PropValue::Text));
        patch
    }
}
