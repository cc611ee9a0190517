//! Error types shared across StoryClip crates.

use std::path::PathBuf;

/// Top-level error type for StoryClip operations.
#[derive(Debug, thiserror::Error)]
pub enum StoryclipError {
    #[error("Overlay error: {message}")]
    Overlay { message: String },

    #[error("{stage} stage error: {message}")]
    Stage { stage: String, message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },

    #[error("Gallery error: {message}")]
    Gallery { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoryclipError.
pub type StoryclipResult<T> = Result<T, StoryclipError>;

impl StoryclipError {
    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::Overlay {
            message: msg.into(),
        }
    }

    pub fn stage(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: msg.into(),
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline {
            message: msg.into(),
        }
    }

    pub fn gallery(msg: impl Into<String>) -> Self {
        Self::Gallery {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
