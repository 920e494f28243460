//! Per-character rich-text styles.
//!
//! Styles are sparse and addressed by `(line, char)` where lines are the
//! `\n`-separated segments of the object's text. Linear offsets (as used by
//! a text selection) count each newline as one character.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style overrides for a single character. Unset fields inherit the
/// object-level value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl CharStyle {
    pub fn is_empty(&self) -> bool {
        *self == CharStyle::default()
    }

    /// Overlay every field set in `other` onto `self`.
    pub fn merge(&mut self, other: &CharStyle) {
        if other.fill.is_some() {
            self.fill.clone_from(&other.fill);
        }
        if other.font_family.is_some() {
            self.font_family.clone_from(&other.font_family);
        }
        if other.font_weight.is_some() {
            self.font_weight.clone_from(&other.font_weight);
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.font_style.is_some() {
            self.font_style.clone_from(&other.font_style);
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
    }
}

/// Sparse `line → char → style` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyles {
    lines: BTreeMap<usize, BTreeMap<usize, CharStyle>>,
}

impl TextStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, line: usize, ch: usize) -> Option<&CharStyle> {
        self.lines.get(&line).and_then(|l| l.get(&ch))
    }

    /// Replace the style of a single character. An empty style clears it.
    pub fn set(&mut self, line: usize, ch: usize, style: CharStyle) {
        if style.is_empty() {
            if let Some(l) = self.lines.get_mut(&line) {
                l.remove(&ch);
                if l.is_empty() {
                    self.lines.remove(&line);
                }
            }
            return;
        }
        self.lines.entry(line).or_default().insert(ch, style);
    }

    /// Number of styled characters.
    pub fn len(&self) -> usize {
        self.lines.values().map(BTreeMap::len).sum()
    }

    /// Merge `style` into every character of `text` in the linear range
    /// `[start, end)`. Newline positions carry no style and are skipped.
    pub fn apply_range(&mut self, text: &str, start: usize, end: usize, style: &CharStyle) {
        if style.is_empty() || start >= end {
            return;
        }
        let mut offset = 0;
        for (line, segment) in text.split('\n').enumerate() {
            if offset >= end {
                break;
            }
            for ch in 0..segment.chars().count() {
                let at = offset + ch;
                if at >= end {
                    break;
                }
                if at >= start {
                    let mut merged = self.get(line, ch).cloned().unwrap_or_default();
                    merged.merge(style);
                    self.set(line, ch, merged);
                }
            }
            // Skip the terminating newline.
            offset += segment.chars().count() + 1;
        }
    }
}

/// Map a linear character offset into `(line, char)`.
///
/// Returns `None` for offsets that land on a newline or past the end.
pub fn position_of(text: &str, offset: usize) -> Option<(usize, usize)> {
    let mut remaining = offset;
    for (line, segment) in text.split('\n').enumerate() {
        let len = segment.chars().count();
        if remaining < len {
            return Some((line, remaining));
        }
        if remaining == len {
            // The newline terminating this line.
            return None;
        }
        remaining -= len + 1;
    }
    None
}
