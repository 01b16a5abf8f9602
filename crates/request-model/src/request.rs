//! Batch request files.
//!
//! A request bundles the clip list, the group declarations, and one
//! mixing configuration. It is read from and written to JSON.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clip::{Clip, GroupSpec};
use crate::config::{DurationType, MixingConfiguration};
use crate::geometry::AspectRatio;

/// Everything the planner needs for one batch call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub clips: Vec<Clip>,

    #[serde(default)]
    pub groups: Vec<GroupSpec>,

    #[serde(default)]
    pub config: MixingConfiguration,
}

impl BatchRequest {
    pub fn new(clips: Vec<Clip>, config: MixingConfiguration) -> Self {
        Self {
            clips,
            groups: vec![],
            config,
        }
    }

    pub fn with_groups(mut self, groups: Vec<GroupSpec>) -> Self {
        self.groups = groups;
        self
    }

    /// A small ready-to-edit request used by `remix init`.
    pub fn sample() -> Self {
        let clips = vec![
            Clip::new("hook", 6.0)
                .with_source("sources/hook.mp4")
                .with_geometry(1080, 1920),
            Clip::new("demo", 12.0)
                .with_source("sources/demo.mp4")
                .with_geometry(1920, 1080),
            Clip::new("cta", 4.0)
                .with_source("sources/cta.mov")
                .with_audio(false)
                .with_geometry(1080, 1080),
        ];
        let config = MixingConfiguration {
            order_mixing: true,
            speed_mixing: true,
            allowed_speeds: vec![0.9, 1.0, 1.1],
            duration_type: DurationType::Fixed,
            target_duration_seconds: Some(15.0),
            aspect_ratio: AspectRatio::Vertical9x16,
            output_count: 6,
            ..Default::default()
        };
        Self::new(clips, config)
    }

    /// Load a request from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| RequestError::IoError {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| RequestError::ParseError { path, source: e })
    }

    /// Save the request as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RequestError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RequestError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| RequestError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| RequestError::IoError { path, source: e })
    }

    /// Human-readable problems that would make the planner reject the batch.
    ///
    /// An empty list means the request can be planned. Per-variant problems
    /// (an unreachable target duration, for example) are not detected here.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = vec![];

        if self.clips.is_empty() {
            issues.push("Request contains no clips".to_string());
        }

        let mut seen = HashSet::new();
        for clip in &self.clips {
            if clip.id.trim().is_empty() {
                issues.push("Clip with empty id".to_string());
            }
            if !seen.insert(clip.id.as_str()) {
                issues.push(format!("Duplicate clip id: {}", clip.id));
            }
            if !clip.has_valid_duration() {
                issues.push(format!(
                    "Clip {} has invalid duration {}",
                    clip.id, clip.duration_seconds
                ));
            }
        }

        if let Err(violation) = self.config.validate() {
            issues.push(format!("Configuration: {violation}"));
        }

        if self.config.aspect_ratio == AspectRatio::Original
            && !self.clips.is_empty()
            && self.clips.iter().all(|c| c.geometry().is_none())
        {
            issues.push(
                "Aspect ratio original needs width and height on at least one clip".to_string(),
            );
        }

        if self.config.group_mixing {
            let declared: HashSet<&str> = self.groups.iter().map(|g| g.id.as_str()).collect();
            if !declared.is_empty() {
                for clip in &self.clips {
                    if let Some(group) = clip.group_id.as_deref() {
                        if !declared.contains(group) {
                            issues.push(format!(
                                "Clip {} references undeclared group {group}",
                                clip.id
                            ));
                        }
                    }
                }
                for group in &self.groups {
                    if !self
                        .clips
                        .iter()
                        .any(|c| c.group_id.as_deref() == Some(group.id.as_str()))
                    {
                        issues.push(format!("Group {} has no clips", group.id));
                    }
                }
            } else if self.clips.iter().all(|c| c.group_id.is_none()) {
                issues.push("Group mixing is enabled but no clip belongs to a group".to_string());
            }
        }

        issues
    }
}

/// Errors that can occur when reading or writing request files.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_request_has_no_issues() {
        let request = BatchRequest::sample();
        assert!(request.issues().is_empty(), "{:?}", request.issues());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join("remix_request_test")
            .join("request.json");
        let _ = std::fs::remove_file(&path);

        let request = BatchRequest::sample();
        request.save(&path).unwrap();
        let loaded = BatchRequest::load(&path).unwrap();

        assert_eq!(loaded.clips, request.clips);
        assert_eq!(loaded.config, request.config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("remix_request_missing.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            BatchRequest::load(&path),
            Err(RequestError::IoError { .. })
        ));
    }

    #[test]
    fn test_issues_reports_duplicates_and_empty_groups() {
        let request = BatchRequest::new(
            vec![
                Clip::new("a", 3.0).in_group("intro"),
                Clip::new("a", 2.0).in_group("intro"),
            ],
            MixingConfiguration {
                group_mixing: true,
                ..Default::default()
            },
        )
        .with_groups(vec![GroupSpec::new("intro", 0), GroupSpec::new("outro", 1)]);

        let issues = request.issues();
        assert!(issues.iter().any(|i| i.contains("Duplicate clip id: a")));
        assert!(issues.iter().any(|i| i.contains("Group outro has no clips")));
    }

    #[test]
    fn test_issues_reports_config_violation() {
        let mut request = BatchRequest::sample();
        request.config.output_count = 0;
        assert!(request
            .issues()
            .iter()
            .any(|i| i.starts_with("Configuration:")));
    }

    #[test]
    fn test_issues_reports_original_aspect_without_clip_sizes() {
        let mut request = BatchRequest::new(
            vec![Clip::new("landscape", 4.0), Clip::new("portrait", 4.0)],
            MixingConfiguration::default(),
        );
        assert!(request
            .issues()
            .iter()
            .any(|i| i.contains("width and height")));

        request.clips[1] = request.clips[1].clone().with_geometry(1080, 1920);
        assert!(request.issues().is_empty(), "{:?}", request.issues());
    }

    #[test]
    fn test_minimal_json_parses() {
        let request: BatchRequest = serde_json::from_str(
            r#"{"clips":[{"id":"a","durationSeconds":10},{"id":"b","durationSeconds":8}]}"#,
        )
        .unwrap();
        assert_eq!(request.clips.len(), 2);
        assert!(request.groups.is_empty());
        assert_eq!(request.config, MixingConfiguration::default());
    }
}
