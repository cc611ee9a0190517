//! Scratch space for intermediate stage outputs.
//!
//! Each job gets timestamped file names under the cache directory so
//! concurrent jobs and re-runs never collide. The area remembers what it
//! handed out so cleanup can remove exactly the intermediates it created.

use std::path::{Path, PathBuf};

use storyclip_common::error::StoryclipResult;

/// Allocator for intermediate output paths inside the cache directory.
#[derive(Debug)]
pub struct ScratchArea {
    root: PathBuf,
    allocated: Vec<PathBuf>,
}

impl ScratchArea {
    /// Open (and create if needed) a scratch area rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoryclipResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            allocated: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh `{prefix}_{millis}.{ext}` path. The millisecond
    /// timestamp keeps re-runs distinct; a counter suffix resolves the
    /// rare same-millisecond collision.
    pub fn allocate(&mut self, prefix: &str, ext: &str) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis().max(0);
        let mut candidate = self.root.join(format!("{prefix}_{millis}.{ext}"));
        let mut counter = 1u32;
        while candidate.exists() || self.allocated.contains(&candidate) {
            candidate = self.root.join(format!("{prefix}_{millis}_{counter}.{ext}"));
            counter += 1;
        }
        self.allocated.push(candidate.clone());
        candidate
    }

    /// Paths handed out so far, in allocation order.
    pub fn allocated(&self) -> &[PathBuf] {
        &self.allocated
    }

    /// Remove every allocated file that exists, except the ones listed
    /// in `keep`. Missing files are fine; removal errors are logged and
    /// swallowed so cleanup never masks a pipeline result.
    pub fn cleanup(&mut self, keep: &[&Path]) {
        for path in self.allocated.drain(..) {
            if keep.iter().any(|k| *k == path) {
                continue;
            }
            if !path.exists() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove intermediate");
            } else {
                tracing::debug!(path = %path.display(), "Removed intermediate");
            }
        }
    }
}
