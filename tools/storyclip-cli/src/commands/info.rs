//! Show media information for a recording.

use std::path::PathBuf;

use storyclip_common::config::AppConfig;
use storyclip_pipeline::FfmpegExecutor;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!("No such file: {}", path.display()));
    }

    let config = AppConfig::load();
    let executor = FfmpegExecutor::new(config.pipeline.font_path.clone());

    let size = std::fs::metadata(&path)?.len();

    println!("Media: {}", path.display());
    println!("  Size: {size} bytes");

    match executor.probe_duration_secs(&path).await {
        Ok(duration) => {
            println!("  Duration: {duration:.2}s");
            let default_trim = (duration.floor() - 2.0).max(1.0);
            println!("  Default trim duration: {default_trim:.0}s");
        }
        Err(e) => println!("  Duration: unavailable ({e})"),
    }

    match executor.probe_dimensions(&path).await {
        Some((width, height)) => println!("  Resolution: {width}x{height}"),
        None => println!("  Resolution: unavailable"),
    }

    Ok(())
}
