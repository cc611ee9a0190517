//! ffmpeg-backed executor.
//!
//! Each stage verb maps to one ffmpeg invocation. Trim and mute are
//! stream copies; overlay burn-in re-encodes video through a `drawtext`
//! filter chain; thumbnails grab the first frame.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use storyclip_common::error::{StoryclipError, StoryclipResult};
use storyclip_overlay_model::WireOverlay;

use crate::executor::{ClipExecutor, Invocation};
use crate::filter::build_overlay_filter;

/// Name of the font file staged into each job's working directory.
const WORK_DIR_FONT_NAME: &str = "overlay_font.ttf";

/// Executor that shells out to ffmpeg / ffprobe.
pub struct FfmpegExecutor {
    ffmpeg_path: String,
    ffprobe_path: String,
    /// System font copied into the work dir before overlay burn-in.
    font_source: PathBuf,
}

impl FfmpegExecutor {
    pub fn new(font_source: PathBuf) -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            font_source,
        }
    }

    /// Specify a custom ffmpeg binary path.
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Specify a custom ffprobe binary path.
    #[must_use]
    pub fn with_ffprobe_path(mut self, path: impl Into<String>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    /// Run one ffmpeg invocation to completion, capturing stderr for
    /// diagnostics. ffmpeg writes its log to stderr even on success.
    async fn run_ffmpeg(&self, args: &[String]) -> StoryclipResult<Invocation> {
        tracing::debug!(args = ?args, "Running ffmpeg");

        // kill_on_drop ties the child to the invocation future: when a
        // stage timeout drops the future, the tool must not keep running
        // and write its output after the job was reported failed.
        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| StoryclipError::pipeline(format!("Failed to start ffmpeg: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            Ok(Invocation::success())
        } else {
            let detail = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("ffmpeg exited with an error")
                .to_string();
            tracing::warn!(status = ?output.status.code(), detail = %detail, "ffmpeg failed");
            Ok(Invocation::failure(detail))
        }
    }

    /// Stage the overlay font into the work dir. Idempotent: an already
    /// staged copy is reused across jobs sharing a work dir.
    fn ensure_font(&self, work_dir: &Path) -> StoryclipResult<PathBuf> {
        let staged = work_dir.join(WORK_DIR_FONT_NAME);
        if staged.exists() {
            return Ok(staged);
        }
        if !self.font_source.exists() {
            return Err(StoryclipError::FileNotFound {
                path: self.font_source.clone(),
            });
        }
        std::fs::copy(&self.font_source, &staged)?;
        tracing::debug!(font = %staged.display(), "Staged overlay font");
        Ok(staged)
    }

    /// Probe the duration of a media file in seconds.
    pub async fn probe_duration_secs(&self, path: &Path) -> StoryclipResult<f64> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| StoryclipError::pipeline(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(StoryclipError::pipeline(format!(
                "ffprobe failed for {}",
                path.display()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        raw.trim()
            .parse::<f64>()
            .map_err(|_| StoryclipError::pipeline(format!("Unparseable duration: {raw:?}")))
    }

    /// Probe the pixel dimensions of the first video stream.
    pub async fn probe_dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "csv=p=0:s=x",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let raw = String::from_utf8(output.stdout).ok()?;
        let line = raw.lines().next()?.trim();
        let (w, h) = line.split_once('x')?;
        let width = w.parse::<u32>().ok()?;
        let height = h.parse::<u32>().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some((width, height))
    }
}

#[async_trait]
impl ClipExecutor for FfmpegExecutor {
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> StoryclipResult<Invocation> {
        let args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{start_secs}"),
            "-i".to_string(),
            input.display().to_string(),
            "-t".to_string(),
            format!("{duration_secs}"),
            "-c".to_string(),
            "copy".to_string(),
            output.display().to_string(),
        ];
        self.run_ffmpeg(&args).await
    }

    async fn mute(&self, input: &Path, output: &Path) -> StoryclipResult<Invocation> {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-an".to_string(),
            output.display().to_string(),
        ];
        self.run_ffmpeg(&args).await
    }

    async fn burn_overlays(
        &self,
        input: &Path,
        output: &Path,
        overlays_json: &str,
        work_dir: &Path,
    ) -> StoryclipResult<Invocation> {
        let overlays: Vec<WireOverlay> = serde_json::from_str(overlays_json)?;

        let font = self.ensure_font(work_dir)?;
        let Some(filter) = build_overlay_filter(&overlays, &font) else {
            // Nothing to draw; a plain copy keeps the stage contract.
            let args = vec![
                "-y".to_string(),
                "-i".to_string(),
                input.display().to_string(),
                "-c".to_string(),
                "copy".to_string(),
                output.display().to_string(),
            ];
            return self.run_ffmpeg(&args).await;
        };

        tracing::debug!(overlays = overlays.len(), filter = %filter, "Burning overlays");
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            filter,
            "-c:a".to_string(),
            "copy".to_string(),
            output.display().to_string(),
        ];
        self.run_ffmpeg(&args).await
    }

    async fn thumbnail(&self, input: &Path, output: &Path) -> StoryclipResult<Invocation> {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output.display().to_string(),
        ];
        self.run_ffmpeg(&args).await
    }

    fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg_path) && command_exists(&self.ffprobe_path)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Check whether a binary resolves on the current PATH.
pub fn command_exists(binary: &str) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_font_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("system_font.ttf");
        std::fs::write(&source, b"fontdata").unwrap();

        let work = tempfile::tempdir().unwrap();
        let exec = FfmpegExecutor::new(source);

        let first = exec.ensure_font(work.path()).unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), b"fontdata");

        // A second call must reuse the staged copy, not re-copy.
        std::fs::write(&first, b"staged").unwrap();
        let second = exec.ensure_font(work.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"staged");
    }

    #[test]
    fn test_ensure_font_missing_source() {
        let work = tempfile::tempdir().unwrap();
        let exec = FfmpegExecutor::new(PathBuf::from("/nonexistent/font.ttf"));
        assert!(exec.ensure_font(work.path()).is_err());
    }

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-binary-xyz"));
    }

    #[tokio::test]
    async fn test_dropped_invocation_kills_the_child() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();

        // Stand-in tool: sleep, then write 20 KiB to its last argument.
        let script = dir.path().join("slow_tool.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\nsleep 2\nfor a in \"$@\"; do out=\"$a\"; done\nhead -c 20480 /dev/zero > \"$out\"\n",
        )
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let font = dir.path().join("font.ttf");
        std::fs::write(&font, b"font").unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();
        let output = dir.path().join("out.mp4");

        let exec = FfmpegExecutor::new(font).with_ffmpeg_path(script.display().to_string());

        // Abandon the invocation mid-flight, as a stage timeout does.
        let result = tokio::time::timeout(
            Duration::from_millis(200),
            exec.trim(&input, &output, 0.0, 1.0),
        )
        .await;
        assert!(result.is_err());

        // If the child outlived the drop it would finish its sleep and
        // write the output; give it ample time to prove it cannot.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!output.exists());
    }
}
