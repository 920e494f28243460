//! Bounding-box computation for scene objects.
//!
//! Mirrors the rendering surface's coordinate model closely enough for
//! selection outlines and alignment: objects rotate about their top-left
//! corner and text height is estimated from line count and font size.

use crate::model::{ObjectType, PropKey, SceneObject};
use kurbo::{Affine, Rect};

/// Line height multiplier applied to the font size for text layout.
pub const LINE_HEIGHT: f64 = 1.16;

/// Average glyph advance relative to the font size, used when a text
/// object has no explicit width.
const AVG_CHAR_WIDTH: f64 = 0.5;

pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Intrinsic `(width, height)` of an object before rotation.
pub fn intrinsic_size(obj: &SceneObject) -> (f64, f64) {
    match obj.kind {
        ObjectType::Text => {
            let font_size = obj
                .number(PropKey::FontSize)
                .unwrap_or(DEFAULT_FONT_SIZE);
            let text = obj.text(PropKey::Text).unwrap_or_default();
            let lines: Vec<&str> = text.split('\n').collect();
            let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            let width = obj
                .number(PropKey::Width)
                .unwrap_or(longest as f64 * font_size * AVG_CHAR_WIDTH);
            let height = lines.len() as f64 * font_size * LINE_HEIGHT;
            (width, height)
        }
        _ => (
            obj.number(PropKey::Width).unwrap_or(0.0),
            obj.number(PropKey::Height).unwrap_or(0.0),
        ),
    }
}

/// Axis-aligned bounding box after translation and rotation.
pub fn bounding_box(obj: &SceneObject) -> Rect {
    let (w, h) = intrinsic_size(obj);
    let (left, top) = obj.position();
    let angle = obj.number(PropKey::Angle).unwrap_or(0.0);
    let local = Rect::new(0.0, 0.0, w.max(0.0), h.max(0.0));
    let transform = Affine::translate((left, top)) * Affine::rotate(angle.to_radians());
    transform.transform_rect_bbox(local)
}
