use crate::poi::PoiKind;

/// Global editor state: one edit-mode flag and at most one selected POI.
/// The selection is a POI id, never an owning reference; the entity it names
/// may disappear under us (for example after a delete), so every consumer
/// looks the id up again before acting.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
    edit_mode: bool,
    selected: Option<String>,
}

impl EditorState {
    pub fn new(enabled: bool) -> Self {
        Self {
            edit_mode: enabled,
            selected: None,
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Flip edit mode. Leaving edit mode always drops the selection so a
    /// stale id cannot survive into the next editing session.
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        if !self.edit_mode {
            self.selected = None;
        }
        self.edit_mode
    }

    /// Select a POI, replacing any prior selection. Ignored outside edit
    /// mode. Returns the id that was deselected, if any.
    pub fn select(&mut self, id: &str) -> Option<String> {
        if !self.edit_mode {
            return None;
        }
        self.selected.replace(id.to_owned())
    }

    /// Unconditional deselect (Escape). Returns the dropped id.
    pub fn clear_selection(&mut self) -> Option<String> {
        self.selected.take()
    }

    /// Id to delete, only when edit mode is on and something is selected.
    pub fn delete_target(&self) -> Option<&str> {
        if self.edit_mode {
            self.selected.as_deref()
        } else {
            None
        }
    }
}

/// What a keyboard event asks the editor to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorAction {
    OpenCreateModal(PoiKind),
    ToggleEditMode,
    DeleteSelected,
    Deselect,
}

impl EditorAction {
    /// Map a `KeyboardEvent::key()` value to an action. Keys pressed while
    /// focus sits in a text input or textarea are never editor shortcuts.
    pub fn from_key(key: &str, in_text_input: bool) -> Option<Self> {
        if in_text_input {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "i" => Some(EditorAction::OpenCreateModal(PoiKind::Info)),
            "l" => Some(EditorAction::OpenCreateModal(PoiKind::Link)),
            "m" => Some(EditorAction::OpenCreateModal(PoiKind::Media)),
            "e" => Some(EditorAction::ToggleEditMode),
            "delete" | "backspace" => Some(EditorAction::DeleteSelected),
            "escape" => Some(EditorAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_flag_and_selection() {
        let mut st = EditorState::new(false);
        assert!(st.toggle_edit_mode());
        st.select("p1");
        assert_eq!(st.selected(), Some("p1"));
        assert!(!st.toggle_edit_mode());
        assert!(st.toggle_edit_mode());
        // Back in edit mode, but the old selection did not come back.
        assert_eq!(st.selected(), None);
        assert!(!st.toggle_edit_mode());
        assert!(!st.edit_mode());
    }

    #[test]
    fn second_selection_replaces_first() {
        let mut st = EditorState::new(true);
        assert_eq!(st.select("a"), None);
        assert_eq!(st.select("b"), Some("a".to_owned()));
        assert_eq!(st.selected(), Some("b"));
    }

    #[test]
    fn select_outside_edit_mode_is_ignored() {
        let mut st = EditorState::new(false);
        st.select("a");
        assert_eq!(st.selected(), None);
    }

    #[test]
    fn delete_target_needs_edit_mode_and_selection() {
        let mut st = EditorState::new(false);
        assert_eq!(st.delete_target(), None);
        st.toggle_edit_mode();
        assert_eq!(st.delete_target(), None);
        st.select("x");
        assert_eq!(st.delete_target(), Some("x"));
        st.toggle_edit_mode();
        assert_eq!(st.delete_target(), None);
    }

    #[test]
    fn escape_clears_selection_unconditionally() {
        let mut st = EditorState::new(true);
        st.select("x");
        assert_eq!(st.clear_selection(), Some("x".to_owned()));
        assert_eq!(st.clear_selection(), None);
    }

    #[test]
    fn key_mapping() {
        use EditorAction::*;
        assert_eq!(
            EditorAction::from_key("i", false),
            Some(OpenCreateModal(PoiKind::Info))
        );
        assert_eq!(
            EditorAction::from_key("L", false),
            Some(OpenCreateModal(PoiKind::Link))
        );
        assert_eq!(
            EditorAction::from_key("m", false),
            Some(OpenCreateModal(PoiKind::Media))
        );
        assert_eq!(EditorAction::from_key("e", false), Some(ToggleEditMode));
        assert_eq!(EditorAction::from_key("Delete", false), Some(DeleteSelected));
        assert_eq!(
            EditorAction::from_key("Backspace", false),
            Some(DeleteSelected)
        );
        assert_eq!(EditorAction::from_key("Escape", false), Some(Deselect));
        assert_eq!(EditorAction::from_key("q", false), None);
    }

    #[test]
    fn keys_in_text_inputs_are_ignored() {
        assert_eq!(EditorAction::from_key("i", true), None);
        assert_eq!(EditorAction::from_key("Delete", true), None);
        assert_eq!(EditorAction::from_key("Escape", true), None);
    }
}
