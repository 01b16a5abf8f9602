//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RemixError, RemixResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Planner tuning shared by every batch.
    pub planner: PlannerDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Upper bound for `permutation_enumeration_limit` (10!).
pub const MAX_PERMUTATION_ENUMERATION_LIMIT: u64 = 3_628_800;

/// Engine-level tuning for the planner.
///
/// These are not part of a batch request: they bound how hard the planner
/// works rather than what it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerDefaults {
    /// Allowed gap between the requested and the achieved fixed duration (seconds).
    pub duration_tolerance_secs: f64,

    /// Regeneration attempts for random group mixing before the
    /// duplicate policy kicks in.
    pub group_retry_attempts: usize,

    /// Largest permutation space that is enumerated up front.
    /// Bigger spaces are sampled with rejection instead.
    pub permutation_enumeration_limit: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "remix_planner=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            duration_tolerance_secs: 0.05,
            group_retry_attempts: 10,
            permutation_enumeration_limit: 40_320,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], errors are surfaced.
    pub fn load_from(path: impl AsRef<Path>) -> RemixResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RemixError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject tuning values the planner cannot work with.
    pub fn validate(&self) -> RemixResult<()> {
        let planner = &self.planner;
        if planner.duration_tolerance_secs.is_nan() || planner.duration_tolerance_secs <= 0.0 {
            return Err(RemixError::configuration(format!(
                "planner.duration_tolerance_secs must be positive, got {}",
                planner.duration_tolerance_secs
            )));
        }
        if planner.group_retry_attempts == 0 {
            return Err(RemixError::configuration(
                "planner.group_retry_attempts must be at least 1",
            ));
        }
        if planner.permutation_enumeration_limit > MAX_PERMUTATION_ENUMERATION_LIMIT {
            return Err(RemixError::configuration(format!(
                "planner.permutation_enumeration_limit must be at most {MAX_PERMUTATION_ENUMERATION_LIMIT}, got {}",
                planner.permutation_enumeration_limit
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("remix").join("config.json")
}
