//! Stage output verification.
//!
//! External tool invocations can exit zero and still produce a truncated
//! or empty file, so every stage output is checked on disk before the
//! pipeline advances.

use std::path::Path;

/// Smallest output size considered a plausible video artifact.
/// Anything under this is treated as a failed stage even when the tool
/// reported success.
pub const MIN_PLAUSIBLE_OUTPUT_BYTES: u64 = 10 * 1024;

/// Verdict for one stage output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// File exists and clears the size threshold.
    Valid { size: u64 },
    /// File exists but is implausibly small.
    TooSmall { size: u64 },
    /// File was never written.
    Missing,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }

    /// Observed size, if the file exists at all.
    pub fn size(&self) -> Option<u64> {
        match self {
            Verification::Valid { size } | Verification::TooSmall { size } => Some(*size),
            Verification::Missing => None,
        }
    }
}

/// Check a video stage output: it must exist and clear the size threshold.
pub fn verify_video_output(path: &Path) -> Verification {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() >= MIN_PLAUSIBLE_OUTPUT_BYTES => {
            Verification::Valid { size: meta.len() }
        }
        Ok(meta) => Verification::TooSmall { size: meta.len() },
        Err(_) => Verification::Missing,
    }
}

/// Check a thumbnail output. Stills are legitimately small, so only
/// existence and non-emptiness are required.
pub fn verify_thumbnail_output(path: &Path) -> Verification {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Verification::Valid { size: meta.len() },
        Ok(meta) => Verification::TooSmall { size: meta.len() },
        Err(_) => Verification::Missing,
    }
}
