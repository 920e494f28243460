use super::helpers::{coerce_string, json_string, normalize_color};
use super::{PropertyMapper, PropertyPatch};
use crate::model::{PropKey, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BG_COLOR: &str = "#FFFFFF";

/// The template background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameProperties {
    pub bg_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameFormValues {
    pub bg_color: String,
}

impl FrameFormValues {
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        match field {
            "bgColor" => {
                if let Some(s) = json_string(value) {
                    self.bg_color = s;
                }
                true
            }
            _ => false,
        }
    }
}

pub struct FrameMapper;

impl PropertyMapper for FrameMapper {
    type Canvas = FrameProperties;
    type Form = FrameFormValues;

    fn read(obj: &SceneObject) -> FrameProperties {
        FrameProperties {
            bg_color: coerce_string(obj.get(PropKey::BgColor), DEFAULT_BG_COLOR),
        }
    }

    fn to_form_values(canvas: &FrameProperties) -> FrameFormValues {
        FrameFormValues {
            bg_color: canvas.bg_color.clone(),
        }
    }

    fn to_canvas_properties(form: &FrameFormValues) -> PropertyPatch {
        PropertyPatch::new().with(PropKey::BgColor, normalize_color(&form.bg_color))
    }
}
