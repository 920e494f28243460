use super::helpers::{
    FontSelection, Position, apply_position_field, coerce_json_number, coerce_number,
    coerce_string, font_selection, json_font_selection, json_string, normalize_color,
    read_position, selected_font,
};
use super::{PropertyMapper, PropertyPatch};
use crate::geometry::DEFAULT_FONT_SIZE;
use crate::model::{PropKey, PropValue, SceneObject, TextAlign};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_FONT_WEIGHT: &str = "400";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    pub position: Position,
    pub text_color: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_size: f64,
    pub text_alignment: TextAlign,
    pub text: String,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormValues {
    pub position: Position,
    pub text_color: String,
    pub font_family: FontSelection,
    pub font_weight: FontSelection,
    pub font_size: f64,
    pub text_alignment: TextAlign,
    pub text: String,
    pub width: Option<f64>,
}

impl TextFormValues {
    pub fn apply_field(&mut self, field: &str, value: &Value) -> bool {
        if apply_position_field(&mut self.position, field, value) {
            return true;
        }
        match field {
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
            "width" => {
                self.width = match value {
                    Value::Null => None,
                    v => Some(coerce_json_number(v, self.width.unwrap_or(0.0))),
                }
            }
            _ => return false,
        }
        true
    }
}

/// Text objects store their color in `fill` and alignment in `textAlign`.
pub struct TextMapper;

impl PropertyMapper for TextMapper {
    type Canvas = TextProperties;
    type Form = TextFormValues;

    fn read(obj: &SceneObject) -> TextProperties {
        TextProperties {
            position: read_position(obj),
            text_color: coerce_string(obj.get(PropKey::Fill), DEFAULT_TEXT_COLOR),
            font_family: coerce_string(obj.get(PropKey::FontFamily), DEFAULT_FONT_FAMILY),
            font_weight: coerce_string(obj.get(PropKey::FontWeight), DEFAULT_FONT_WEIGHT),
            font_size: coerce_number(obj.get(PropKey::FontSize), DEFAULT_FONT_SIZE),
            text_alignment: obj
                .text(PropKey::TextAlign)
                .and_then(TextAlign::parse)
                .unwrap_or_default(),
            text: coerce_string(obj.get(PropKey::Text), ""),
            width: obj.number(PropKey::Width),
        }
    }

    fn to_form_values(canvas: &TextProperties) -> TextFormValues {
        TextFormValues {
            position: canvas.position,
            text_color: canvas.text_color.clone(),
            font_family: font_selection(&canvas.font_family),
            font_weight: font_selection(&canvas.font_weight),
            font_size: canvas.font_size,
            text_alignment: canvas.text_alignment,
            text: canvas.text.clone(),
            width: canvas.width,
        }
    }

    fn to_canvas_properties(form: &TextFormValues) -> PropertyPatch {
        let mut patch = PropertyPatch::new()
            .with(PropKey::Left, form.position.x)
            .with(PropKey::Top, form.position.y)
            .with(PropKey::Angle, form.position.angle)
            .with(PropKey::Fill, normalize_color(&form.text_color))
            .with(PropKey::FontSize, form.font_size)
            .with(PropKey::TextAlign, form.text_alignment.as_str())
            .with(PropKey::Text, form.text.as_str());
        patch.set(PropKey::FontFamily, selected_font(&form.font_family));
        patch.set(PropKey::FontWeight, selected_font(&form.font_weight));
        patch.set(PropKey::Width, form.width.map(PropValue::Number));
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use crate::mapper::FontOption;
    use crate::model::ObjectType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn headline() -> SceneObject {
        SceneObject::new(ObjectId::intern("t_headline"), ObjectType::Text)
            .with(PropKey::Left, 40.0)
            .with(PropKey::Top, 24.0)
            .with(PropKey::Fill, "#112233")
            .with(PropKey::FontFamily, "Roboto")
            .with(PropKey::FontWeight, "700")
            .with(PropKey::FontSize, 32.0)
            .with(PropKey::TextAlign, "center")
            .with(PropKey::Text, "Welcome")
    }

    #[test]
    fn fonts_become_option_lists() {
        let form = TextMapper::to_form_values(&TextMapper::read(&headline()));
        assert_eq!(form.font_family.as_slice(), &[FontOption::new("Roboto")]);
        assert_eq!(form.font_weight.as_slice(), &[FontOption::new("700")]);
        assert_eq!(form.position, Position::new(40.0, 24.0));
        assert_eq!(form.text_alignment, TextAlign::Center);
        assert_eq!(form.width, None);
    }

    #[test]
    fn form_back_to_canvas_scalars() {
        let form = TextMapper::to_form_values(&TextMapper::read(&headline()));
        let patch = TextMapper::to_canvas_properties(&form);
        assert_eq!(patch.get(PropKey::FontFamily), Some(&PropValue::from("Roboto")));
        assert_eq!(patch.get(PropKey::Fill), Some(&PropValue::from("#112233")));
        assert_eq!(patch.get(PropKey::TextAlign), Some(&PropValue::from("center")));
        // No explicit width: the key is present but undefined.
        assert!(patch.contains_key(PropKey::Width));
        assert_eq!(patch.get(PropKey::Width), None);
    }

    #[test]
    fn empty_font_selection_is_undefined() {
        let mut form = TextMapper::to_form_values(&TextMapper::read(&headline()));
        form.font_family.clear();
        let patch = TextMapper::to_canvas_properties(&form);
        assert_eq!(patch.get(PropKey::FontFamily), None);
    }

    #[test]
    fn missing_attributes_use_defaults() {
        let bare = SceneObject::new(ObjectId::intern("t_bare"), ObjectType::Text)
            .with(PropKey::FontSize, "huge");
        let props = TextMapper::read(&bare);
        assert_eq!(props.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(props.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(props.text_alignment, TextAlign::Left);
        assert_eq!(props.position, Position::default());
    }

    #[test]
    fn apply_field_coerces() {
        let mut form = TextMapper::to_form_values(&TextMapper::read(&headline()));
        assert!(form.apply_field("fontSize", &json!("18")));
        assert_eq!(form.font_size, 18.0);
        assert!(form.apply_field("fontSize", &json!("big")));
        assert_eq!(form.font_size, 18.0);
        assert!(form.apply_field("x", &json!(5)));
        assert_eq!(form.position.x, 5.0);
        assert!(form.apply_field("textAlignment", &json!("right")));
        assert_eq!(form.text_alignment, TextAlign::Right);
        assert!(!form.apply_field("bgColor", &json!("#fff")));
    }
}
