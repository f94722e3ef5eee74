use crate::poi::{MediaKind, PoiKind, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use glam::Vec3;
use thiserror::Error;

/// Upper bound for an attached image, 10 MB.
pub const IMAGE_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Distance ahead of the camera used by "use current position".
pub const PLACEMENT_AHEAD_METERS: f32 = 3.0;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    TitleMissing,
    #[error("Title must be at most {TITLE_MAX_CHARS} characters")]
    TitleTooLong,
    #[error("Description must be at most {DESCRIPTION_MAX_CHARS} characters")]
    DescriptionTooLong,
    #[error("Position must be three finite numbers")]
    PositionInvalid,
    #[error("Target scene is required")]
    TargetSceneMissing,
    #[error("Media URL is required")]
    MediaUrlMissing,
    #[error("Media type is required")]
    MediaKindMissing,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("Only JPG and PNG images are allowed")]
    UnsupportedType,
    #[error("Image size must be less than 10MB")]
    TooLarge,
}

/// Client-side check for an image attachment. The caller keeps its previous
/// valid selection when this rejects a new file.
pub fn validate_image(mime: &str, size_bytes: u64) -> Result<(), ImageError> {
    if mime != "image/jpeg" && mime != "image/png" {
        return Err(ImageError::UnsupportedType);
    }
    if size_bytes > IMAGE_MAX_BYTES {
        return Err(ImageError::TooLarge);
    }
    Ok(())
}

/// In-progress POI creation form. Field types mirror what the DOM hands us:
/// free text and parsed numbers; the image file is tracked separately by the
/// modal since it never round-trips through a text field.
#[derive(Clone, Debug)]
pub struct PoiDraft {
    pub kind: PoiKind,
    pub title: String,
    pub description: String,
    pub position: Vec3,
    pub visible: bool,
    pub target_scene_id: String,
    pub media_url: String,
    pub media_kind: Option<MediaKind>,
}

impl PoiDraft {
    pub fn new(kind: PoiKind) -> Self {
        Self {
            kind,
            title: String::new(),
            description: String::new(),
            // Same defaults the form is seeded with.
            position: Vec3::new(0.0, 1.5, -3.0),
            visible: true,
            target_scene_id: String::new(),
            media_url: String::new(),
            media_kind: None,
        }
    }

    /// Every violated rule, in field order. Submission is blocked unless
    /// this comes back empty.
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FormError::TitleMissing);
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(FormError::TitleTooLong);
        }
        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(FormError::DescriptionTooLong);
        }
        if !self.position.is_finite() {
            errors.push(FormError::PositionInvalid);
        }
        match self.kind {
            PoiKind::Info => {}
            PoiKind::Link => {
                if self.target_scene_id.trim().is_empty() {
                    errors.push(FormError::TargetSceneMissing);
                }
            }
            PoiKind::Media => {
                if self.media_url.trim().is_empty() {
                    errors.push(FormError::MediaUrlMissing);
                }
                if self.media_kind.is_none() {
                    errors.push(FormError::MediaKindMissing);
                }
            }
        }
        errors
    }

    /// Multipart fields for `POST /space/poi/create/{scene_id}`, in the
    /// order the backend's form model declares them. The image file itself
    /// is appended by the caller under the `image` field.
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("poi_type", self.kind.as_str().to_owned()),
            ("title", self.title.trim().to_owned()),
            ("description", self.description.clone()),
            ("x", format!("{}", self.position.x)),
            ("y", format!("{}", self.position.y)),
            ("z", format!("{}", self.position.z)),
            ("visible", self.visible.to_string()),
        ];
        match self.kind {
            PoiKind::Info => {}
            PoiKind::Link => fields.push(("target_scene_id", self.target_scene_id.clone())),
            PoiKind::Media => {
                fields.push(("media_url", self.media_url.clone()));
                if let Some(k) = self.media_kind {
                    fields.push(("media_type", k.as_str().to_owned()));
                }
            }
        }
        fields
    }
}

/// Which optional sections a creation form shows for a given kind. The
/// modal builds its markup from this instead of re-deciding per call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormLayout {
    pub image_upload: bool,
    pub target_scene: bool,
    pub media_fields: bool,
}

impl FormLayout {
    pub fn for_kind(kind: PoiKind) -> Self {
        match kind {
            PoiKind::Info => Self {
                image_upload: true,
                target_scene: false,
                media_fields: false,
            },
            PoiKind::Link => Self {
                image_upload: false,
                target_scene: true,
                media_fields: false,
            },
            PoiKind::Media => Self {
                image_upload: false,
                target_scene: false,
                media_fields: true,
            },
        }
    }
}

/// Point `distance` units ahead of the camera along its forward direction.
/// The forward vector is normalized first; a degenerate (zero) forward keeps
/// the point at the camera rather than producing NaN coordinates.
pub fn placement_ahead(cam_pos: Vec3, cam_forward: Vec3, distance: f32) -> Vec3 {
    let forward = cam_forward.normalize_or_zero();
    cam_pos + forward * distance
}

/// Forward direction of a camera described by Euler angles in degrees, the
/// convention scene-graph `rotation` attributes use (pitch, yaw, roll).
pub fn forward_from_rotation_deg(rotation_deg: Vec3) -> Vec3 {
    let pitch = rotation_deg.x.to_radians();
    let yaw = rotation_deg.y.to_radians();
    // -Z is forward at rest.
    Vec3::new(
        -yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_rules_match_the_acceptance_matrix() {
        assert_eq!(
            validate_image("image/gif", 1024),
            Err(ImageError::UnsupportedType)
        );
        assert_eq!(
            validate_image("image/png", 11 * 1024 * 1024),
            Err(ImageError::TooLarge)
        );
        assert_eq!(validate_image("image/jpeg", 9 * 1024 * 1024), Ok(()));
        assert_eq!(validate_image("image/png", IMAGE_MAX_BYTES), Ok(()));
    }

    #[test]
    fn title_is_required_and_bounded() {
        let mut draft = PoiDraft::new(PoiKind::Info);
        assert_eq!(draft.validate(), vec![FormError::TitleMissing]);
        draft.title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(draft.validate(), vec![FormError::TitleTooLong]);
        draft.title = "x".repeat(TITLE_MAX_CHARS);
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn description_is_optional_but_bounded() {
        let mut draft = PoiDraft::new(PoiKind::Info);
        draft.title = "t".into();
        draft.description = "d".repeat(DESCRIPTION_MAX_CHARS);
        assert!(draft.validate().is_empty());
        draft.description.push('!');
        assert_eq!(draft.validate(), vec![FormError::DescriptionTooLong]);
    }

    #[test]
    fn link_draft_without_target_is_blocked() {
        let mut draft = PoiDraft::new(PoiKind::Link);
        draft.title = "Doorway".into();
        assert_eq!(draft.validate(), vec![FormError::TargetSceneMissing]);
        draft.target_scene_id = "scene-2".into();
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn media_draft_requires_url_and_kind() {
        let mut draft = PoiDraft::new(PoiKind::Media);
        draft.title = "Clip".into();
        assert_eq!(
            draft.validate(),
            vec![FormError::MediaUrlMissing, FormError::MediaKindMissing]
        );
        draft.media_url = "https://example.com/a.mp4".into();
        draft.media_kind = Some(MediaKind::Video);
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let mut draft = PoiDraft::new(PoiKind::Info);
        draft.title = "t".into();
        draft.position = Vec3::new(f32::NAN, 0.0, 0.0);
        assert_eq!(draft.validate(), vec![FormError::PositionInvalid]);
    }

    #[test]
    fn multipart_fields_per_kind() {
        let mut draft = PoiDraft::new(PoiKind::Link);
        draft.title = "Door".into();
        draft.target_scene_id = "s2".into();
        let fields = draft.multipart_fields();
        let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "poi_type",
                "title",
                "description",
                "x",
                "y",
                "z",
                "visible",
                "target_scene_id"
            ]
        );
        assert_eq!(fields[0].1, "link");
        assert_eq!(fields[6].1, "true");

        let mut draft = PoiDraft::new(PoiKind::Media);
        draft.media_kind = Some(MediaKind::Audio);
        let names: Vec<&str> = draft
            .multipart_fields()
            .iter()
            .map(|(n, _)| *n)
            .collect::<Vec<_>>();
        assert!(names.contains(&"media_url"));
        assert!(names.contains(&"media_type"));
        assert!(!names.contains(&"target_scene_id"));
    }

    #[test]
    fn placement_is_three_units_ahead() {
        let pos = placement_ahead(
            Vec3::new(1.0, 1.6, 0.0),
            Vec3::new(0.0, 0.0, -2.0),
            PLACEMENT_AHEAD_METERS,
        );
        assert!((pos - Vec3::new(1.0, 1.6, -3.0)).length() < 1e-5);
        // Degenerate forward stays put instead of going NaN.
        let pos = placement_ahead(Vec3::ONE, Vec3::ZERO, PLACEMENT_AHEAD_METERS);
        assert_eq!(pos, Vec3::ONE);
    }

    #[test]
    fn forward_from_rotation_matches_rest_pose() {
        let fwd = forward_from_rotation_deg(Vec3::ZERO);
        assert!((fwd - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        let fwd = forward_from_rotation_deg(Vec3::new(0.0, 90.0, 0.0));
        assert!((fwd - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        let fwd = forward_from_rotation_deg(Vec3::new(90.0, 0.0, 0.0));
        assert!((fwd - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }
}
