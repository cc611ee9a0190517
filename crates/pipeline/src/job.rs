//! Pipeline job definition and the stage orchestrator.
//!
//! A job runs trim, mute, overlay burn-in, thumbnail, and gallery save in
//! that order. Trim, mute, and gallery save are load-bearing: their
//! failure aborts the job. Overlay burn-in degrades to the muted artifact,
//! and a failed thumbnail is reported as absent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use storyclip_common::config::CleanupPolicy;
use storyclip_common::error::{StoryclipError, StoryclipResult};
use storyclip_overlay_model::OverlaySnapshot;

use crate::executor::{ClipExecutor, Invocation};
use crate::gallery::{Gallery, SavedAsset};
use crate::scratch::ScratchArea;
use crate::verify::{verify_thumbnail_output, verify_video_output, Verification};

/// Trim window for a job, in seconds from the start of the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimParams {
    pub start_secs: f64,
    pub duration_secs: f64,
}

impl TrimParams {
    /// Clamp to a usable window: non-negative start, whole-second
    /// duration of at least one second.
    pub fn sanitized(self) -> Self {
        Self {
            start_secs: self.start_secs.max(0.0),
            duration_secs: self.duration_secs.floor().max(1.0),
        }
    }
}

/// One post-processing job: a source recording, its trim window, and the
/// overlay snapshot frozen when recording stopped.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub source: PathBuf,
    pub trim: TrimParams,
    pub overlays: OverlaySnapshot,
}

/// Stages of the post-processing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Trim,
    Mute,
    BurnOverlays,
    Thumbnail,
    GallerySave,
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageName::Trim => "trim",
            StageName::Mute => "mute",
            StageName::BurnOverlays => "burn_overlays",
            StageName::Thumbnail => "thumbnail",
            StageName::GallerySave => "gallery_save",
        };
        f.write_str(name)
    }
}

/// Record of one executed stage, for diagnostics and the final report.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: StageName,
    pub output: PathBuf,
    pub success: bool,
    pub file_size: Option<u64>,
    pub detail: String,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Every stage produced a valid artifact.
    Full {
        asset: SavedAsset,
        thumbnail: Option<PathBuf>,
        reports: Vec<StageReport>,
    },
    /// Overlay burn-in failed; the muted clip was saved instead.
    Partial {
        asset: SavedAsset,
        thumbnail: Option<PathBuf>,
        reason: String,
        reports: Vec<StageReport>,
    },
}

impl PipelineOutcome {
    pub fn asset(&self) -> &SavedAsset {
        match self {
            PipelineOutcome::Full { asset, .. } | PipelineOutcome::Partial { asset, .. } => asset,
        }
    }

    pub fn thumbnail(&self) -> Option<&Path> {
        match self {
            PipelineOutcome::Full { thumbnail, .. }
            | PipelineOutcome::Partial { thumbnail, .. } => thumbnail.as_deref(),
        }
    }

    pub fn reports(&self) -> &[StageReport] {
        match self {
            PipelineOutcome::Full { reports, .. } | PipelineOutcome::Partial { reports, .. } => {
                reports
            }
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, PipelineOutcome::Full { .. })
    }
}

/// Runtime options for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Scratch root for intermediate artifacts.
    pub cache_dir: PathBuf,
    /// Gallery album the final clip is filed under.
    pub album: String,
    /// Per-stage wall-clock limit in seconds. Zero disables the limit.
    pub stage_timeout_secs: u64,
    /// When intermediate artifacts are removed.
    pub cleanup: CleanupPolicy,
}

/// Stage orchestrator, generic over the executor and gallery seams.
pub struct Pipeline<E, G> {
    executor: E,
    gallery: G,
    options: PipelineOptions,
}

impl<E: ClipExecutor, G: Gallery> Pipeline<E, G> {
    pub fn new(executor: E, gallery: G, options: PipelineOptions) -> Self {
        Self {
            executor,
            gallery,
            options,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn gallery(&self) -> &G {
        &self.gallery
    }

    /// Run the full stage chain for one job.
    pub async fn run(&self, job: &PipelineJob) -> StoryclipResult<PipelineOutcome> {
        if !job.source.exists() {
            return Err(StoryclipError::FileNotFound {
                path: job.source.clone(),
            });
        }

        let mut scratch = ScratchArea::open(&self.options.cache_dir)?;
        let result = self.run_stages(job, &mut scratch).await;

        let cleanup_now = match (&self.options.cleanup, &result) {
            (CleanupPolicy::Never, _) => false,
            (CleanupPolicy::Always, _) => true,
            (CleanupPolicy::OnSuccess, Ok(_)) => true,
            (CleanupPolicy::OnSuccess, Err(_)) => false,
        };
        if cleanup_now {
            let keep: Vec<&Path> = result
                .as_ref()
                .ok()
                .and_then(|outcome| outcome.thumbnail())
                .into_iter()
                .collect();
            scratch.cleanup(&keep);
        }

        result
    }

    async fn run_stages(
        &self,
        job: &PipelineJob,
        scratch: &mut ScratchArea,
    ) -> StoryclipResult<PipelineOutcome> {
        let trim = job.trim.sanitized();
        tracing::info!(
            source = %job.source.display(),
            start = trim.start_secs,
            duration = trim.duration_secs,
            overlays = job.overlays.len(),
            "Starting pipeline"
        );

        let mut reports = Vec::new();

        // Trim and mute must both yield plausible video files.
        let trimmed = scratch.allocate("trimmed", "mp4");
        let invocation = self
            .invoke(StageName::Trim, self.executor.trim(
                &job.source,
                &trimmed,
                trim.start_secs,
                trim.duration_secs,
            ))
            .await?;
        let verdict = verify_video_output(&trimmed);
        reports.push(stage_report(StageName::Trim, &trimmed, &invocation, verdict));
        if !invocation.ok || !verdict.is_valid() {
            return Err(StoryclipError::stage(
                "trim",
                "Trimming failed or output file invalid",
            ));
        }

        let muted = scratch.allocate("muted", "mp4");
        let invocation = self
            .invoke(StageName::Mute, self.executor.mute(&trimmed, &muted))
            .await?;
        let verdict = verify_video_output(&muted);
        reports.push(stage_report(StageName::Mute, &muted, &invocation, verdict));
        if !invocation.ok || !verdict.is_valid() {
            return Err(StoryclipError::stage(
                "mute",
                "Muting failed or output file invalid",
            ));
        }

        // Overlay burn-in degrades to the muted clip on failure. An empty
        // snapshot skips the stage without degrading the outcome.
        let mut final_video: PathBuf = muted.clone();
        let mut degraded: Option<String> = None;
        if job.overlays.is_empty() {
            tracing::debug!("No overlays to burn; skipping stage");
        } else {
            let overlaid = scratch.allocate("overlaid", "mp4");
            let overlays_json = job.overlays.to_wire_json()?;
            let invocation = self
                .invoke(
                    StageName::BurnOverlays,
                    self.executor.burn_overlays(
                        &muted,
                        &overlaid,
                        &overlays_json,
                        scratch.root(),
                    ),
                )
                .await?;
            let verdict = verify_video_output(&overlaid);
            reports.push(stage_report(
                StageName::BurnOverlays,
                &overlaid,
                &invocation,
                verdict,
            ));
            if invocation.ok && verdict.is_valid() {
                final_video = overlaid;
            } else {
                let reason = if invocation.detail.is_empty() {
                    "Overlay burn-in failed or output file invalid".to_string()
                } else {
                    invocation.detail.clone()
                };
                tracing::warn!(reason = %reason, "Overlay burn-in failed; saving muted clip");
                degraded = Some(reason);
            }
        }

        // A missing thumbnail never blocks the clip.
        let thumb_path = scratch.allocate("thumbnail", "jpg");
        let thumbnail = match self
            .invoke(
                StageName::Thumbnail,
                self.executor.thumbnail(&final_video, &thumb_path),
            )
            .await
        {
            Ok(invocation) => {
                let verdict = verify_thumbnail_output(&thumb_path);
                reports.push(stage_report(
                    StageName::Thumbnail,
                    &thumb_path,
                    &invocation,
                    verdict,
                ));
                if invocation.ok && verdict.is_valid() {
                    Some(thumb_path)
                } else {
                    tracing::warn!("Thumbnail extraction failed; continuing without one");
                    None
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Thumbnail stage errored; continuing without one");
                None
            }
        };

        let asset = self.gallery.save(&final_video, &self.options.album).await?;
        reports.push(StageReport {
            stage: StageName::GallerySave,
            output: asset.path.clone(),
            success: true,
            file_size: std::fs::metadata(&asset.path).ok().map(|m| m.len()),
            detail: asset.uri.clone(),
        });

        let outcome = match degraded {
            None => PipelineOutcome::Full {
                asset,
                thumbnail,
                reports,
            },
            Some(reason) => PipelineOutcome::Partial {
                asset,
                thumbnail,
                reason,
                reports,
            },
        };
        tracing::info!(
            full = outcome.is_full(),
            asset = %outcome.asset().uri,
            "Pipeline finished"
        );
        Ok(outcome)
    }

    /// Run one stage invocation under the configured wall-clock limit.
    /// A timeout is reported as a failed invocation, so the per-stage
    /// failure policy applies to it unchanged.
    async fn invoke<F>(&self, stage: StageName, fut: F) -> StoryclipResult<Invocation>
    where
        F: std::future::Future<Output = StoryclipResult<Invocation>>,
    {
        if self.options.stage_timeout_secs == 0 {
            return fut.await;
        }
        let limit = Duration::from_secs(self.options.stage_timeout_secs);
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(stage = %stage, limit_secs = limit.as_secs(), "Stage timed out");
                Ok(Invocation::failure(format!(
                    "{stage} timed out after {}s",
                    limit.as_secs()
                )))
            }
        }
    }
}

fn stage_report(
    stage: StageName,
    output: &Path,
    invocation: &Invocation,
    verdict: Verification,
) -> StageReport {
    StageReport {
        stage,
        output: output.to_path_buf(),
        success: invocation.ok && verdict.is_valid(),
        file_size: verdict.size(),
        detail: invocation.detail.clone(),
    }
}
