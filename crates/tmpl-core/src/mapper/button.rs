use super::helpers::{
    FontSelection, Position, apply_position_field, coerce_json_number, coerce_number,
    coerce_string, font_selection, json_font_selection, json_string, normalize_color,
    read_position, selected_font,
};
use super::text::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_WEIGHT};
use super::{PropertyMapper, PropertyPatch};
use crate::geometry::DEFAULT_FONT_SIZE;
use crate::model::{ButtonShape, ButtonStyle, PropKey, PropValue, SceneObject, TextAlign};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BUTTON_COLOR: &str = "#2563EB";
pub const DEFAULT_BUTTON_TEXT_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProperties {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub shape: ButtonShape,
    pub style: ButtonStyle,
    pub button_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_size: f64,
    pub text_alignment: TextAlign,
    pub text: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonFormValues {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub shape: ButtonShape,
    pub style: ButtonStyle,
    pub button_color: String,
    pub text_color: String,
    pub font_family: FontSelection,
    pub font_weight: FontSelection,
    pub font_size: f64,
    pub text_alignment: TextAlign,
    pub text: String,
    pub link: Option<String>,
}

impl ButtonFormValues {
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        if apply_position_field(&mut self.position, field, value) {
            return true;
        }
        match field {
            "width" => self.width = coerce_json_number(value, self.width),
            "height" => self.height = coerce_json_number(value, self.height),
            "shape" => {
                if let Some(shape) = value.as_str().and_then(ButtonShape::parse) {
                    self.shape = shape;
                }
            }
            "style" => {
                if let Some(style) = value.as_str().and_then(ButtonStyle::parse) {
                    self.style = style;
                }
            }
            "buttonColor" => {
                if let Some(s) = json_string(value) {
                    self.button_color = s;
                }
            }
            "textColor" => {
                if let Some(s) = json_string(value) {
                    self.text_color = s;
                }
            }
            "fontFamily" => {
                if let Some(sel) = json_font_selection(value) {
                    self.font_family = sel;
                }
            }
            "fontWeight" => {
                if let Some(sel) = json_font_selection(value) {
                    self.font_weight = sel;
                }
            }
            "fontSize" => self.font_size = coerce_json_number(value, self.font_size),
            "textAlignment" => {
                if let Some(align) = value.as_str().and_then(TextAlign::parse) {
                    self.text_alignment = align;
                }
            }
            "text" => {
                if let Some(s) = json_string(value) {
                    self.text = s;
                }
            }
            "link" => self.link = json_string(value).filter(|s| !s.is_empty()),
            _ => return false,
        }
        true
    }
}

pub struct ButtonMapper;

impl PropertyMapper for ButtonMapper {
    type Canvas = ButtonProperties;
    type Form = ButtonFormValues;

    fn read(obj: &SceneObject) -> ButtonProperties {
        ButtonProperties {
            position: read_position(obj),
            width: coerce_number(obj.get(PropKey::Width), 0.0),
            height: coerce_number(obj.get(PropKey::Height), 0.0),
            shape: obj
                .text(PropKey::Shape)
                .and_then(ButtonShape::parse)
                .unwrap_or_default(),
            style: obj
                .text(PropKey::ButtonStyle)
                .and_then(ButtonStyle::parse)
                .unwrap_or_default(),
            button_color: coerce_string(obj.get(PropKey::ButtonColor), DEFAULT_BUTTON_COLOR),
            text_color: coerce_string(obj.get(PropKey::TextColor), DEFAULT_BUTTON_TEXT_COLOR),
            font_family: coerce_string(obj.get(PropKey::FontFamily), DEFAULT_FONT_FAMILY),
            font_weight: coerce_string(obj.get(PropKey::FontWeight), DEFAULT_FONT_WEIGHT),
            font_size: coerce_number(obj.get(PropKey::FontSize), DEFAULT_FONT_SIZE),
            text_alignment: obj
                .text(PropKey::TextAlign)
                .and_then(TextAlign::parse)
                .unwrap_or(TextAlign::Center),
            text: coerce_string(obj.get(PropKey::Text), ""),
            link: obj.text(PropKey::Link).map(str::to_string),
        }
    }

    fn to_form_values(canvas: &ButtonProperties) -> ButtonFormValues {
        ButtonFormValues {
            position: canvas.position,
            width: canvas.width,
            height: canvas.height,
            shape: canvas.shape,
            style: canvas.style,
            button_color: canvas.button_color.clone(),
            text_color: canvas.text_color.clone(),
            font_family: font_selection(&canvas.font_family),
            font_weight: font_selection(&canvas.font_weight),
            font_size: canvas.font_size,
            text_alignment: canvas.text_alignment,
            text: canvas.text.clone(),
            link: canvas.link.clone(),
        }
    }

    fn to_canvas_properties(form: &ButtonFormValues) -> PropertyPatch {
        let mut patch = PropertyPatch::new()
            .with(PropKey::Left, form.position.x)
            .with(PropKey::Top, form.position.y)
            .with(PropKey::Angle, form.position.angle)
            .with(PropKey::Width, form.width)
            .with(PropKey::Height, form.height)
            .with(PropKey::Shape, form.shape.as_str())
            .with(PropKey::ButtonStyle, form.style.as_str())
            .with(PropKey::ButtonColor, normalize_color(&form.button_color))
            .with(PropKey::TextColor, normalize_color(&form.text_color))
            .with(PropKey::FontSize, form.font_size)
            .with(PropKey::TextAlign, form.text_alignment.as_str())
            .with(PropKey::Text, form.text.as_str());
        patch.set(PropKey::FontFamily, selected_font(&form.font_family));
        patch.set(PropKey::FontWeight, selected_font(&form.font_weight));
        patch.set(PropKey::Link, form.link.clone().map(PropValue::Text));
        patch
    }
}
