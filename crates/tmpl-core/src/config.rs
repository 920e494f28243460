//! Editor session configuration.

use serde::{Deserialize, Serialize};

/// Configuration for an editor session.
///
/// Every field has a default, so a partial JSON document is valid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo depth. The oldest entry is dropped when exceeded.
    /// Default: **100**.
    pub max_history_depth: usize,

    /// Quiet period before a burst of form edits to the same field is
    /// committed as one command. Default: **300 ms**.
    pub form_debounce_ms: u64,

    /// Drop form edits that leave a field at its last committed value.
    /// Default: **true**.
    pub distinct_form_values: bool,

    /// Select newly added objects. Default: **true**.
    pub select_on_add: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_depth: 100,
            form_debounce_ms: 300,
            distinct_form_values: true,
            select_on_add: true,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns a message if the document is not valid JSON, has a field of
    /// the wrong type, or sets `maxHistoryDepth` to zero.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: EditorConfig =
            serde_json::from_str(text).map_err(|e| format!("invalid editor config: {e}"))?;
        if config.max_history_depth == 0 {
            return Err("invalid editor config: maxHistoryDepth must be at least 1".to_string());
        }
        Ok(config)
    }
}
