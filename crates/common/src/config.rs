//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where intermediate pipeline files are written.
    pub cache_dir: PathBuf,

    /// Gallery persistence settings.
    pub gallery: GalleryConfig,

    /// Pipeline behavior settings.
    pub pipeline: PipelineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where final artifacts are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Root directory holding gallery albums.
    pub root: PathBuf,

    /// Album name final clips are saved into.
    pub album: String,
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-stage timeout for external tool invocations, in seconds.
    /// 0 disables the timeout.
    pub stage_timeout_secs: u64,

    /// What to do with intermediate files once a job finishes.
    pub cleanup: CleanupPolicy,

    /// Font file copied into the burn-in working directory.
    pub font_path: PathBuf,
}

/// Intermediate-file retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Delete intermediates after a successful job, keep them on failure.
    #[default]
    OnSuccess,
    /// Retain everything (useful for debugging).
    Never,
    /// Delete intermediates regardless of outcome.
    Always,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "storyclip=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            gallery: GalleryConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: default_gallery_root(),
            album: "StoryClip".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_secs: 120,
            cleanup: CleanupPolicy::OnSuccess,
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
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
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Standard config file location.
    pub fn path() -> PathBuf {
        config_file_path()
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
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("storyclip").join("config.json")
}

/// Default scratch directory for intermediate files.
fn default_cache_dir() -> PathBuf {
    let base = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".cache")
        });
    base.join("storyclip")
}

/// Default gallery root.
fn default_gallery_root() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("storyclip").join("gallery")
}
