//! The executor seam between the pipeline and the external media tool.
//!
//! Each stage verb is one method; the pipeline never shells out directly.
//! Substituting a fake executor is how the stage chain is tested.

use std::path::Path;

use async_trait::async_trait;
use storyclip_common::error::StoryclipResult;

/// Result of one external tool invocation.
///
/// `ok` mirrors the tool's own success signal; `detail` carries captured
/// stderr / exit status for diagnostics. The pipeline never trusts `ok`
/// alone; output files are verified independently after every stage.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub ok: bool,
    pub detail: String,
}

impl Invocation {
    pub fn success() -> Self {
        Self {
            ok: true,
            detail: String::new(),
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Command executor for the media tool, one method per verb.
#[async_trait]
pub trait ClipExecutor: Send + Sync {
    /// Copy `[start, start + duration)` seconds of the input into the
    /// output without re-encoding.
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> StoryclipResult<Invocation>;

    /// Strip the audio track, leaving video untouched.
    async fn mute(&self, input: &Path, output: &Path) -> StoryclipResult<Invocation>;

    /// Burn the serialized overlay description into the video pixels.
    /// `work_dir` is where auxiliary resources (the font file) are resolved.
    async fn burn_overlays(
        &self,
        input: &Path,
        output: &Path,
        overlays_json: &str,
        work_dir: &Path,
    ) -> StoryclipResult<Invocation>;

    /// Extract a still image from the first frame.
    async fn thumbnail(&self, input: &Path, output: &Path) -> StoryclipResult<Invocation>;

    /// Whether the backing tool is available on this system.
    fn is_available(&self) -> bool;

    /// Executor name for logs.
    fn name(&self) -> &str;
}
