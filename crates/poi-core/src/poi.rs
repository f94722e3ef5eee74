use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoiKind {
    Info,
    Link,
    Media,
}

impl PoiKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PoiKind::Info => "info",
            PoiKind::Link => "link",
            PoiKind::Media => "media",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(PoiKind::Info),
            "link" => Some(PoiKind::Link),
            "media" => Some(PoiKind::Media),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

/// Type-specific payload. Exactly one variant per kind, so a POI can never
/// carry a payload that disagrees with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum PoiPayload {
    Info { image_url: Option<String> },
    Link { target_scene_id: String },
    Media { url: String, kind: MediaKind },
}

impl PoiPayload {
    pub fn kind(&self) -> PoiKind {
        match self {
            PoiPayload::Info { .. } => PoiKind::Info,
            PoiPayload::Link { .. } => PoiKind::Link,
            PoiPayload::Media { .. } => PoiKind::Media,
        }
    }
}

/// One point of interest as the frontend sees it. Immutable for the lifetime
/// of the marker built from it; mutation happens by replacement.
#[derive(Clone, Debug)]
pub struct Poi {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub position: Vec3,
    pub visible: bool,
    pub payload: PoiPayload,
}

impl Poi {
    pub fn kind(&self) -> PoiKind {
        self.payload.kind()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum PoiError {
    #[error("unknown POI type `{0}`")]
    UnknownKind(String),
    #[error("link POI `{0}` has no target scene id")]
    MissingTarget(String),
    #[error("media POI `{0}` is missing its media url")]
    MissingMediaUrl(String),
    #[error("media POI `{0}` has unusable media type `{1}`")]
    BadMediaKind(String, String),
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct WirePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<WirePosition> for Vec3 {
    fn from(p: WirePosition) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// POI record as returned by `GET /space/pois/{scene_id}`. All type-specific
/// fields are optional on the wire; `TryFrom` enforces that the populated
/// ones match the declared type.
#[derive(Clone, Debug, Deserialize)]
pub struct PoiRecord {
    pub poi_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: WirePosition,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub target_scene_id: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

fn default_visible() -> bool {
    true
}

/// Served by the asset router; stored images are referenced by id only.
pub fn image_url_for(image_id: &str) -> String {
    format!("/asset/image/{image_id}")
}

impl TryFrom<PoiRecord> for Poi {
    type Error = PoiError;

    fn try_from(rec: PoiRecord) -> Result<Self, PoiError> {
        let kind = PoiKind::parse(&rec.kind).ok_or_else(|| PoiError::UnknownKind(rec.kind.clone()))?;
        let payload = match kind {
            PoiKind::Info => PoiPayload::Info {
                image_url: rec.image_id.as_deref().map(image_url_for),
            },
            PoiKind::Link => PoiPayload::Link {
                target_scene_id: rec
                    .target_scene_id
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| PoiError::MissingTarget(rec.poi_id.clone()))?,
            },
            PoiKind::Media => {
                let url = rec
                    .media_url
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| PoiError::MissingMediaUrl(rec.poi_id.clone()))?;
                let media_kind = rec
                    .media_type
                    .as_deref()
                    .and_then(MediaKind::parse)
                    .ok_or_else(|| {
                        PoiError::BadMediaKind(
                            rec.poi_id.clone(),
                            rec.media_type.clone().unwrap_or_default(),
                        )
                    })?;
                PoiPayload::Media {
                    url,
                    kind: media_kind,
                }
            }
        };
        Ok(Poi {
            id: rec.poi_id,
            title: rec.title,
            description: rec.description.filter(|s| !s.is_empty()),
            position: rec.position.into(),
            visible: rec.visible,
            payload,
        })
    }
}

/// Envelope of `GET /space/pois/{scene_id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct PoiListResponse {
    #[serde(default)]
    pub pois: Vec<PoiRecord>,
}

/// One entry of `GET /space/scenes/{space_id}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SceneSummary {
    pub id: String,
    pub name: String,
}

/// Envelope of `GET /space/scenes/{space_id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneListResponse {
    #[serde(default)]
    pub scenes: Vec<SceneSummary>,
}

/// Success body of `POST /space/poi/create/{scene_id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatePoiResponse {
    pub id: String,
}

/// Error body shape shared by the backend: non-2xx responses carry a
/// human-readable `detail` message.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> PoiRecord {
        PoiRecord {
            poi_id: "p1".into(),
            kind: kind.into(),
            title: "Front door".into(),
            description: None,
            position: WirePosition {
                x: 1.0,
                y: 1.5,
                z: -3.0,
            },
            visible: true,
            image_id: None,
            target_scene_id: None,
            media_url: None,
            media_type: None,
        }
    }

    #[test]
    fn info_record_gets_info_payload_only() {
        let mut rec = record("info");
        rec.image_id = Some("abc".into());
        let poi = Poi::try_from(rec).unwrap();
        assert_eq!(poi.kind(), PoiKind::Info);
        assert_eq!(
            poi.payload,
            PoiPayload::Info {
                image_url: Some("/asset/image/abc".into())
            }
        );
    }

    #[test]
    fn link_record_requires_target() {
        let err = Poi::try_from(record("link")).unwrap_err();
        assert_eq!(err, PoiError::MissingTarget("p1".into()));

        let mut rec = record("link");
        rec.target_scene_id = Some("s2".into());
        // Stray media fields on a link record are ignored, not mixed in.
        rec.media_url = Some("https://example.com/clip.mp4".into());
        let poi = Poi::try_from(rec).unwrap();
        assert_eq!(
            poi.payload,
            PoiPayload::Link {
                target_scene_id: "s2".into()
            }
        );
    }

    #[test]
    fn media_record_requires_url_and_kind() {
        let mut rec = record("media");
        rec.media_url = Some("https://example.com/a.ogg".into());
        rec.media_type = Some("audio".into());
        let poi = Poi::try_from(rec).unwrap();
        assert_eq!(
            poi.payload,
            PoiPayload::Media {
                url: "https://example.com/a.ogg".into(),
                kind: MediaKind::Audio
            }
        );

        let mut rec = record("media");
        rec.media_url = Some("https://example.com/a.ogg".into());
        rec.media_type = Some("hologram".into());
        assert!(matches!(
            Poi::try_from(rec),
            Err(PoiError::BadMediaKind(_, _))
        ));
    }

    #[test]
    fn unknown_kind_is_an_error_not_a_panic() {
        let err = Poi::try_from(record("portal")).unwrap_err();
        assert_eq!(err, PoiError::UnknownKind("portal".into()));
    }

    #[test]
    fn list_response_parses_and_skips_nothing() {
        let json = r#"{"pois":[
            {"poi_id":"a","type":"info","title":"A","position":{"x":0,"y":1,"z":2}},
            {"poi_id":"b","type":"link","title":"B","target_scene_id":"s9",
             "position":{"x":0,"y":0,"z":0},"visible":false}
        ]}"#;
        let parsed: PoiListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.pois.len(), 2);
        let b = Poi::try_from(parsed.pois[1].clone()).unwrap();
        assert!(!b.visible);
        assert_eq!(b.kind(), PoiKind::Link);
    }
}
