//! Run the post-processing pipeline on a recording.

use std::path::PathBuf;

use storyclip_common::config::{AppConfig, CleanupPolicy};
use storyclip_overlay_model::OverlaySnapshot;
use storyclip_pipeline::{
    DirectoryGallery, FfmpegExecutor, Pipeline, PipelineJob, PipelineOptions, PipelineOutcome,
    TrimParams,
};

pub async fn run(
    path: PathBuf,
    start: f64,
    duration: Option<f64>,
    overlays: Option<PathBuf>,
    album: Option<String>,
    keep_intermediates: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let executor = FfmpegExecutor::new(config.pipeline.font_path.clone());
    if !storyclip_pipeline::ClipExecutor::is_available(&executor) {
        return Err(anyhow::anyhow!(
            "ffmpeg and ffprobe are required but not found in PATH"
        ));
    }

    let overlays = match overlays {
        Some(overlay_path) => {
            let json = std::fs::read_to_string(&overlay_path).map_err(|e| {
                anyhow::anyhow!("Failed to read overlays at {}: {e}", overlay_path.display())
            })?;
            OverlaySnapshot::from_wire_json(&json)
                .map_err(|e| anyhow::anyhow!("Invalid overlay list: {e}"))?
        }
        None => OverlaySnapshot::default(),
    };

    // Without an explicit duration, keep everything but the last two
    // seconds (recordings trail off when the user reaches for stop).
    let duration = match duration {
        Some(d) => d,
        None => {
            let probed = executor.probe_duration_secs(&path).await?;
            let derived = (probed.floor() - 2.0).max(1.0);
            tracing::debug!(probed, derived, "Derived trim duration from source");
            derived
        }
    };

    let options = PipelineOptions {
        cache_dir: config.cache_dir.clone(),
        album: album.unwrap_or_else(|| config.gallery.album.clone()),
        stage_timeout_secs: config.pipeline.stage_timeout_secs,
        cleanup: if keep_intermediates {
            CleanupPolicy::Never
        } else {
            config.pipeline.cleanup
        },
    };

    println!("Processing: {}", path.display());
    println!("  Trim: {start:.1}s + {duration:.1}s");
    println!("  Overlays: {}", overlays.len());
    println!("  Album: {}", options.album);

    let gallery = DirectoryGallery::new(config.gallery.root.clone());
    let pipeline = Pipeline::new(executor, gallery, options);

    let job = PipelineJob {
        source: path,
        trim: TrimParams {
            start_secs: start,
            duration_secs: duration,
        },
        overlays,
    };

    let outcome = pipeline
        .run(&job)
        .await
        .map_err(|e| anyhow::anyhow!("Processing failed: {e}"))?;

    println!();
    for report in outcome.reports() {
        let mark = if report.success { "OK " } else { "FAIL" };
        let size = report
            .file_size
            .map(|s| format!("{s} bytes"))
            .unwrap_or_else(|| "missing".to_string());
        println!("  [{mark}] {}: {size}", report.stage);
    }

    println!();
    match &outcome {
        PipelineOutcome::Full { asset, .. } => {
            println!("Saved clip: {}", asset.uri);
        }
        PipelineOutcome::Partial { asset, reason, .. } => {
            println!("Saved clip without overlays: {}", asset.uri);
            println!("  Overlay burn-in failed: {reason}");
        }
    }
    if let Some(thumbnail) = outcome.thumbnail() {
        println!("Thumbnail: {}", thumbnail.display());
    }

    Ok(())
}
