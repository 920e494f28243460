//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic [`EditorAction`]s. The session
//! turns an action into the matching command via `EditorSession::dispatch`.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    // ── History ──
    Undo,
    Redo,

    // ── Edit ──
    /// Delete the selected object.
    Delete,
    Deselect,

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── Layer state ──
    ToggleVisibility,
    ToggleLock,
}

/// Resolves key events into editor actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<EditorAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(EditorAction::Redo),
                // Shift turns `[`/`]` into braces on most layouts.
                "[" | "{" => Some(EditorAction::SendToBack),
                "]" | "}" => Some(EditorAction::BringToFront),
                "h" | "H" => Some(EditorAction::ToggleVisibility),
                "l" | "L" => Some(EditorAction::ToggleLock),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(EditorAction::Undo),
                "y" | "Y" => Some(EditorAction::Redo),
                "[" => Some(EditorAction::SendBackward),
                "]" => Some(EditorAction::BringForward),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(EditorAction::Delete),
            "Escape" => Some(EditorAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(EditorAction::Redo)
        );
    }

    #[test]
    fn z_order_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("[", false, false, false, true),
            Some(EditorAction::SendBackward)
        );
        assert_eq!(
            ShortcutMap::resolve("]", false, false, false, true),
            Some(EditorAction::BringForward)
        );
        assert_eq!(
            ShortcutMap::resolve("{", false, true, false, true),
            Some(EditorAction::SendToBack)
        );
        assert_eq!(
            ShortcutMap::resolve("]", true, true, false, false),
            Some(EditorAction::BringToFront)
        );
    }

    #[test]
    fn layer_state_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("H", false, true, false, true),
            Some(EditorAction::ToggleVisibility)
        );
        assert_eq!(
            ShortcutMap::resolve("l", true, true, false, false),
            Some(EditorAction::ToggleLock)
        );
    }

    #[test]
    fn plain_keys() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(EditorAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(EditorAction::Deselect)
        );
    }

    #[test]
    fn unbound_combos() {
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Delete", false, true, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", true, false, false, false), None);
    }
}
