//! End-to-end pipeline scenarios over a scripted executor.
//!
//! The fake executor writes stage outputs of configured sizes instead of
//! shelling out, which lets the tests drive every failure policy: fatal
//! trim/mute failures, burn-in degradation, best-effort thumbnails,
//! timeouts, and cleanup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use storyclip_common::config::CleanupPolicy;
use storyclip_common::error::StoryclipResult;
use storyclip_overlay_model::{OverlayKind, OverlaySession, OverlaySnapshot, SurfaceSize};
use storyclip_pipeline::{
    ClipExecutor, DirectoryGallery, Invocation, Pipeline, PipelineJob, PipelineOptions,
    PipelineOutcome, TrimParams, MIN_PLAUSIBLE_OUTPUT_BYTES,
};

const PLAUSIBLE: usize = MIN_PLAUSIBLE_OUTPUT_BYTES as usize;

/// What a fake stage does when invoked.
#[derive(Debug, Clone)]
enum Script {
    /// Report success and write `len` bytes of `fill` to the output.
    Write { len: usize, fill: u8 },
    /// Report success but write nothing.
    WriteNothing,
    /// Report failure with the given detail, writing nothing.
    Fail(&'static str),
    /// Sleep for the given duration, then write a plausible output.
    Stall(Duration),
}

impl Script {
    async fn apply(&self, output: &Path) -> Invocation {
        match self {
            Script::Write { len, fill } => {
                std::fs::write(output, vec![*fill; *len]).unwrap();
                Invocation::success()
            }
            Script::WriteNothing => Invocation::success(),
            Script::Fail(detail) => Invocation::failure(*detail),
            Script::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                std::fs::write(output, vec![b'S'; PLAUSIBLE]).unwrap();
                Invocation::success()
            }
        }
    }
}

struct FakeExecutor {
    trim: Script,
    mute: Script,
    burn: Script,
    thumb: Script,
    burn_calls: AtomicUsize,
}

impl FakeExecutor {
    fn all_good() -> Self {
        Self {
            trim: Script::Write {
                len: PLAUSIBLE,
                fill: b'T',
            },
            mute: Script::Write {
                len: PLAUSIBLE,
                fill: b'M',
            },
            burn: Script::Write {
                len: PLAUSIBLE,
                fill: b'B',
            },
            thumb: Script::Write {
                len: 1024,
                fill: b'J',
            },
            burn_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClipExecutor for FakeExecutor {
    async fn trim(
        &self,
        _input: &Path,
        output: &Path,
        _start_secs: f64,
        _duration_secs: f64,
    ) -> StoryclipResult<Invocation> {
        Ok(self.trim.apply(output).await)
    }

    async fn mute(&self, _input: &Path, output: &Path) -> StoryclipResult<Invocation> {
        Ok(self.mute.apply(output).await)
    }

    async fn burn_overlays(
        &self,
        _input: &Path,
        output: &Path,
        overlays_json: &str,
        _work_dir: &Path,
    ) -> StoryclipResult<Invocation> {
        self.burn_calls.fetch_add(1, Ordering::SeqCst);
        // The orchestrator only hands over valid wire JSON.
        let parsed: serde_json::Value = serde_json::from_str(overlays_json).unwrap();
        assert!(parsed.is_array());
        Ok(self.burn.apply(output).await)
    }

    async fn thumbnail(&self, _input: &Path, output: &Path) -> StoryclipResult<Invocation> {
        Ok(self.thumb.apply(output).await)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct Fixture {
    _root: tempfile::TempDir,
    cache_dir: PathBuf,
    gallery_root: PathBuf,
    source: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("recording.mp4");
        std::fs::write(&source, vec![b'R'; PLAUSIBLE]).unwrap();
        Self {
            cache_dir: root.path().join("cache"),
            gallery_root: root.path().join("gallery"),
            source,
            _root: root,
        }
    }

    fn options(&self, cleanup: CleanupPolicy) -> PipelineOptions {
        PipelineOptions {
            cache_dir: self.cache_dir.clone(),
            album: "StoryClip".to_string(),
            stage_timeout_secs: 0,
            cleanup,
        }
    }

    fn pipeline(
        &self,
        executor: FakeExecutor,
        cleanup: CleanupPolicy,
    ) -> Pipeline<FakeExecutor, DirectoryGallery> {
        Pipeline::new(
            executor,
            DirectoryGallery::new(&self.gallery_root),
            self.options(cleanup),
        )
    }

    fn job_with_overlays(&self) -> PipelineJob {
        let mut session = OverlaySession::new(SurfaceSize::new(1080.0, 1920.0));
        session.add(OverlayKind::Emoji, "🔥");
        session.add(OverlayKind::Text, "Hello");
        PipelineJob {
            source: self.source.clone(),
            trim: TrimParams {
                start_secs: 0.0,
                duration_secs: 5.0,
            },
            overlays: session.snapshot(),
        }
    }

    fn job_without_overlays(&self) -> PipelineJob {
        PipelineJob {
            source: self.source.clone(),
            trim: TrimParams {
                start_secs: 0.0,
                duration_secs: 5.0,
            },
            overlays: OverlaySnapshot::default(),
        }
    }

    fn album_files(&self) -> Vec<PathBuf> {
        let album = self.gallery_root.join("StoryClip");
        if !album.exists() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(album)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    fn cache_files(&self) -> Vec<PathBuf> {
        if !self.cache_dir.exists() {
            return Vec::new();
        }
        std::fs::read_dir(&self.cache_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

#[tokio::test]
async fn full_run_saves_burned_clip_and_thumbnail() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline(FakeExecutor::all_good(), CleanupPolicy::Never);

    let outcome = pipeline.run(&fx.job_with_overlays()).await.unwrap();

    assert!(outcome.is_full());
    let asset = outcome.asset();
    assert!(asset.uri.starts_with("file://"));
    assert_eq!(std::fs::read(&asset.path).unwrap(), vec![b'B'; PLAUSIBLE]);
    assert_eq!(fx.album_files().len(), 1);

    let thumb = outcome.thumbnail().unwrap();
    assert!(thumb.exists());
}

#[tokio::test]
async fn burn_failure_degrades_to_muted_clip() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    // Exit status lies; the 1-byte output fails verification.
    executor.burn = Script::Write { len: 1, fill: b'B' };
    let pipeline = fx.pipeline(executor, CleanupPolicy::Never);

    let outcome = pipeline.run(&fx.job_with_overlays()).await.unwrap();

    let PipelineOutcome::Partial { asset, reason, .. } = &outcome else {
        panic!("expected a partial outcome");
    };
    assert!(!reason.is_empty());
    // The gallery copy is the muted artifact, not the truncated burn.
    assert_eq!(std::fs::read(&asset.path).unwrap(), vec![b'M'; PLAUSIBLE]);
    assert_eq!(fx.album_files().len(), 1);
}

#[tokio::test]
async fn trim_failure_is_fatal_and_saves_nothing() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.trim = Script::WriteNothing;
    let pipeline = fx.pipeline(executor, CleanupPolicy::Never);

    let err = pipeline.run(&fx.job_with_overlays()).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("Trimming failed or output file invalid"));
    assert!(fx.album_files().is_empty());
}

#[tokio::test]
async fn mute_failure_is_fatal() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.mute = Script::Fail("muxer exploded");
    let pipeline = fx.pipeline(executor, CleanupPolicy::Never);

    let err = pipeline.run(&fx.job_with_overlays()).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("Muting failed or output file invalid"));
    assert!(fx.album_files().is_empty());
}

#[tokio::test]
async fn empty_overlay_snapshot_skips_burn_and_stays_full() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline(FakeExecutor::all_good(), CleanupPolicy::Never);

    let outcome = pipeline.run(&fx.job_without_overlays()).await.unwrap();

    assert!(outcome.is_full());
    assert_eq!(
        pipeline_burn_calls(&pipeline),
        0,
        "burn stage must not run for an empty snapshot"
    );
    assert_eq!(
        std::fs::read(&outcome.asset().path).unwrap(),
        vec![b'M'; PLAUSIBLE]
    );
}

fn pipeline_burn_calls(pipeline: &Pipeline<FakeExecutor, DirectoryGallery>) -> usize {
    pipeline.executor().burn_calls.load(Ordering::SeqCst)
}

#[tokio::test]
async fn thumbnail_failure_is_not_fatal() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.thumb = Script::Fail("no frames");
    let pipeline = fx.pipeline(executor, CleanupPolicy::Never);

    let outcome = pipeline.run(&fx.job_with_overlays()).await.unwrap();
    assert!(outcome.is_full());
    assert!(outcome.thumbnail().is_none());
    assert_eq!(fx.album_files().len(), 1);
}

#[tokio::test]
async fn missing_source_is_rejected_up_front() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline(FakeExecutor::all_good(), CleanupPolicy::Never);

    let mut job = fx.job_with_overlays();
    job.source = fx.source.with_file_name("gone.mp4");
    let err = pipeline.run(&job).await.unwrap_err();
    assert!(err.to_string().contains("gone.mp4"));
}

#[tokio::test(start_paused = true)]
async fn stage_timeout_counts_as_stage_failure() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.trim = Script::Stall(Duration::from_secs(600));
    let mut options = fx.options(CleanupPolicy::Never);
    options.stage_timeout_secs = 120;
    let pipeline = Pipeline::new(executor, DirectoryGallery::new(&fx.gallery_root), options);

    let err = pipeline.run(&fx.job_with_overlays()).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("Trimming failed or output file invalid"));
}

#[tokio::test]
async fn cleanup_on_success_removes_intermediates_but_keeps_thumbnail() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline(FakeExecutor::all_good(), CleanupPolicy::OnSuccess);

    let outcome = pipeline.run(&fx.job_with_overlays()).await.unwrap();

    let remaining = fx.cache_files();
    let thumb = outcome.thumbnail().unwrap().to_path_buf();
    assert_eq!(remaining, vec![thumb]);
    // The saved asset lives in the gallery, untouched by cleanup.
    assert!(outcome.asset().path.exists());
}

#[tokio::test]
async fn cleanup_on_success_keeps_intermediates_after_failure() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.mute = Script::WriteNothing;
    let pipeline = fx.pipeline(executor, CleanupPolicy::OnSuccess);

    pipeline.run(&fx.job_with_overlays()).await.unwrap_err();
    // The trimmed artifact stays behind for inspection.
    assert!(fx
        .cache_files()
        .iter()
        .any(|p| p.file_name().unwrap().to_string_lossy().starts_with("trimmed_")));
}

#[tokio::test]
async fn cleanup_always_removes_intermediates_after_failure() {
    let fx = Fixture::new();
    let mut executor = FakeExecutor::all_good();
    executor.mute = Script::WriteNothing;
    let pipeline = fx.pipeline(executor, CleanupPolicy::Always);

    pipeline.run(&fx.job_with_overlays()).await.unwrap_err();
    assert!(fx.cache_files().is_empty());
}
