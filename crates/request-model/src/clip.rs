//! Input clip descriptors and group declarations.
//!
//! Clips are read-only for the duration of a planning call. The `source`
//! field is an opaque reference handed straight to the transcoder; nothing
//! in the planner inspects it.

use serde::{Deserialize, Serialize};

/// Identifier of a clip within one batch request.
pub type ClipId = String;

/// Identifier of a clip group.
pub type GroupId = String;

/// One input media segment eligible for composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique id within the batch.
    pub id: ClipId,

    /// Opaque file reference. Empty means "use the id".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    /// Native duration in seconds.
    pub duration_seconds: f64,

    /// Whether the source carries an audio stream.
    #[serde(default = "default_has_audio")]
    pub has_audio: bool,

    /// Group membership used by group mixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,

    /// Source geometry in pixels, when the caller probed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

fn default_has_audio() -> bool {
    true
}

impl Clip {
    /// Create a clip with audio, no group and unknown geometry.
    pub fn new(id: impl Into<ClipId>, duration_seconds: f64) -> Self {
        Self {
            id: id.into(),
            source: String::new(),
            duration_seconds,
            has_audio: true,
            group_id: None,
            width: None,
            height: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    pub fn in_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_geometry(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// The reference handed to the transcoder for this clip.
    pub fn source_ref(&self) -> &str {
        if self.source.is_empty() {
            &self.id
        } else {
            &self.source
        }
    }

    /// Source geometry if both dimensions are known and non-zero.
    pub fn geometry(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Whether the native duration is usable for planning.
    pub fn has_valid_duration(&self) -> bool {
        self.duration_seconds.is_finite() && self.duration_seconds > 0.0
    }
}

/// A named bucket of interchangeable clips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub id: GroupId,

    /// Position of the group in strict mode (ascending).
    #[serde(default)]
    pub order: i32,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GroupSpec {
    pub fn new(id: impl Into<GroupId>, order: i32) -> Self {
        Self {
            id: id.into(),
            order,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ref_falls_back_to_id() {
        let clip = Clip::new("intro", 4.0);
        assert_eq!(clip.source_ref(), "intro");

        let clip = clip.with_source("s3://bucket/intro.mp4");
        assert_eq!(clip.source_ref(), "s3://bucket/intro.mp4");
    }

    #[test]
    fn test_missing_has_audio_defaults_to_true() {
        let clip: Clip = serde_json::from_str(r#"{"id":"a","durationSeconds":3.5}"#).unwrap();
        assert!(clip.has_audio);
        assert_eq!(clip.group_id, None);
        assert!((clip.duration_seconds - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let clip = Clip::new("a", 2.0).in_group("hooks").with_audio(false);
        let json = serde_json::to_value(&clip).unwrap();
        assert_eq!(json["durationSeconds"], 2.0);
        assert_eq!(json["groupId"], "hooks");
        assert_eq!(json["hasAudio"], false);
        assert!(json.get("source").is_none());
    }

    #[test]
    fn test_geometry_requires_both_dimensions() {
        let mut clip = Clip::new("a", 1.0);
        assert_eq!(clip.geometry(), None);
        clip.width = Some(1280);
        assert_eq!(clip.geometry(), None);
        clip.height = Some(720);
        assert_eq!(clip.geometry(), Some((1280, 720)));
    }

    #[test]
    fn test_invalid_durations_are_flagged() {
        assert!(!Clip::new("a", 0.0).has_valid_duration());
        assert!(!Clip::new("a", -1.0).has_valid_duration());
        assert!(!Clip::new("a", f64::NAN).has_valid_duration());
        assert!(Clip::new("a", 0.2).has_valid_duration());
    }
}
