//! Scene-link anchor snapshot and the REST endpoint paths.
//!
//! The snapshot is transient: built by scanning the scene's link anchors at
//! save time, serialized once, never kept. Position and rotation travel as
//! the opaque attribute strings the scene graph already holds (`"0 1.6 -2"`),
//! so the backend sees exactly what the scene does.

use serde::Serialize;
use std::collections::BTreeMap;

/// `anchor id -> [position, rotation]`, both attribute-encoded vectors.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LinkSnapshot(BTreeMap<String, [String; 2]>);

impl LinkSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, anchor_id: &str, position: &str, rotation: &str) {
        self.0
            .insert(anchor_id.to_owned(), [position.to_owned(), rotation.to_owned()]);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON body of `PUT /space/scene/link/update/{space_id}`. Plain data in,
    /// plain data out; there is no way to smuggle a cycle through here.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub fn scenes_url(space_id: &str) -> String {
    format!("/space/scenes/{space_id}")
}

pub fn pois_url(scene_id: &str) -> String {
    format!("/space/pois/{scene_id}")
}

pub fn poi_create_url(scene_id: &str) -> String {
    format!("/space/poi/create/{scene_id}")
}

pub fn poi_delete_url(scene_id: &str, poi_id: &str) -> String {
    format!("/space/poi/delete/{scene_id}/{poi_id}")
}

pub fn link_update_url(space_id: &str) -> String {
    format!("/space/scene/link/update/{space_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_as_anchor_map() {
        let mut snap = LinkSnapshot::new();
        snap.insert("door-a", "0 1.6 -2", "0 90 0");
        snap.insert("door-b", "3 0 0", "0 0 0");
        let json = snap.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"door-a":["0 1.6 -2","0 90 0"],"door-b":["3 0 0","0 0 0"]}"#
        );
    }

    #[test]
    fn later_insert_for_same_anchor_wins() {
        let mut snap = LinkSnapshot::new();
        snap.insert("a", "0 0 0", "0 0 0");
        snap.insert("a", "1 1 1", "0 45 0");
        assert_eq!(snap.len(), 1);
        assert!(snap.to_json().unwrap().contains("1 1 1"));
    }

    #[test]
    fn endpoint_paths_are_exact() {
        assert_eq!(scenes_url("sp1"), "/space/scenes/sp1");
        assert_eq!(pois_url("sc1"), "/space/pois/sc1");
        assert_eq!(poi_create_url("42"), "/space/poi/create/42");
        assert_eq!(poi_delete_url("42", "abc"), "/space/poi/delete/42/abc");
        assert_eq!(link_update_url("sp1"), "/space/scene/link/update/sp1");
    }
}
