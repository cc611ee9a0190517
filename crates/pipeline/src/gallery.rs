//! Gallery destination for finished clips.
//!
//! The pipeline hands the final artifact to a [`Gallery`], which files it
//! under a named album and returns a stable URI for the saved copy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use storyclip_common::error::{StoryclipError, StoryclipResult};

/// A clip saved into the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAsset {
    /// URI of the saved copy.
    pub uri: String,
    /// Filesystem path of the saved copy.
    pub path: PathBuf,
}

/// Destination store for finished clips.
#[async_trait]
pub trait Gallery: Send + Sync {
    /// Save `source` into `album`, creating the album if it does not
    /// exist yet. Never overwrites an existing asset.
    async fn save(&self, source: &Path, album: &str) -> StoryclipResult<SavedAsset>;
}

/// Gallery backed by a plain directory tree: one subdirectory per album.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the album directory, creating it on first use.
    fn ensure_album(&self, album: &str) -> StoryclipResult<PathBuf> {
        if album.is_empty() || album.contains(std::path::is_separator) {
            return Err(StoryclipError::gallery(format!(
                "Invalid album name: {album:?}"
            )));
        }
        let dir = self.root.join(album);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            tracing::info!(album = %album, path = %dir.display(), "Created gallery album");
        }
        Ok(dir)
    }

    /// Pick a destination name that does not collide with an existing
    /// asset in the album.
    fn unique_destination(dir: &Path, source: &Path) -> StoryclipResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| {
                StoryclipError::gallery(format!("Source has no file name: {}", source.display()))
            })?
            .to_string_lossy()
            .to_string();

        let candidate = dir.join(&file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "clip".to_string());
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        for counter in 1u32.. {
            let name = if ext.is_empty() {
                format!("{stem}_{counter}")
            } else {
                format!("{stem}_{counter}.{ext}")
            };
            let candidate = dir.join(name);
            if !candidate.exists() {
                return Ok(candidate);
            }
        }
        unreachable!("counter space exhausted")
    }
}

#[async_trait]
impl Gallery for DirectoryGallery {
    async fn save(&self, source: &Path, album: &str) -> StoryclipResult<SavedAsset> {
        if !source.exists() {
            return Err(StoryclipError::FileNotFound {
                path: source.to_path_buf(),
            });
        }

        let dir = self.ensure_album(album)?;
        let destination = Self::unique_destination(&dir, source)?;

        tokio::fs::copy(source, &destination).await?;

        let uri = format!("file://{}", destination.display());
        tracing::info!(uri = %uri, "Saved clip to gallery");
        Ok(SavedAsset {
            uri,
            path: destination,
        })
    }
}
