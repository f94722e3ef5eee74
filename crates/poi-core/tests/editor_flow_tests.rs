// Scenario tests for the keyboard-driven editor flow, exercising the same
// pure state the wasm controller drives.

use poi_core::{
    CreatePoiResponse, EditorAction, EditorState, ErrorResponse, FormLayout, PoiDraft, PoiKind,
};

#[test]
fn pressing_i_opens_an_info_form() {
    let action = EditorAction::from_key("i", false).unwrap();
    let EditorAction::OpenCreateModal(kind) = action else {
        panic!("expected a modal action, got {action:?}");
    };
    assert_eq!(kind, PoiKind::Info);
    let layout = FormLayout::for_kind(kind);
    assert!(layout.image_upload);
    assert!(!layout.target_scene);
    assert!(!layout.media_fields);
}

#[test]
fn pressing_l_opens_a_link_form_with_required_target() {
    let EditorAction::OpenCreateModal(kind) = EditorAction::from_key("l", false).unwrap() else {
        panic!("expected a modal action");
    };
    assert_eq!(kind, PoiKind::Link);
    let layout = FormLayout::for_kind(kind);
    assert!(layout.target_scene);
    assert!(!layout.image_upload);

    // The target really is required: a filled-out draft without one is
    // blocked before any network call would happen.
    let mut draft = PoiDraft::new(kind);
    draft.title = "Hallway door".into();
    assert!(!draft.validate().is_empty());
}

#[test]
fn pressing_m_opens_a_media_form() {
    let EditorAction::OpenCreateModal(kind) = EditorAction::from_key("m", false).unwrap() else {
        panic!("expected a modal action");
    };
    assert_eq!(kind, PoiKind::Media);
    assert!(FormLayout::for_kind(kind).media_fields);
}

#[test]
fn delete_with_nothing_selected_and_edit_off_is_a_noop() {
    let mut st = EditorState::new(false);
    assert_eq!(EditorAction::from_key("Delete", false), Some(EditorAction::DeleteSelected));
    // The action maps, but the state machine refuses to produce a target.
    assert_eq!(st.delete_target(), None);
    // Nothing changed underneath either.
    assert!(!st.edit_mode());
    assert_eq!(st.clear_selection(), None);
}

#[test]
fn create_response_and_error_detail_parse() {
    let ok: CreatePoiResponse = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
    assert_eq!(ok.id, "abc");
    let err: ErrorResponse = serde_json::from_str(r#"{"detail":"Title too long"}"#).unwrap();
    assert_eq!(err.detail.as_deref(), Some("Title too long"));
    let bare: ErrorResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(bare.detail, None);
}

#[test]
fn full_select_delete_cycle_clears_selection_either_way() {
    let mut st = EditorState::new(false);
    st.toggle_edit_mode();
    st.select("poi-1");
    let target = st.delete_target().map(str::to_owned).unwrap();
    assert_eq!(target, "poi-1");
    // Whether the delete call succeeds or fails, the selection is dropped so
    // a possibly-deleted entity is never operated on again.
    st.clear_selection();
    assert_eq!(st.delete_target(), None);
}
