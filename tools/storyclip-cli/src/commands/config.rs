//! Show or initialize the configuration file.

use storyclip_common::config::AppConfig;

pub fn run(init: bool) -> anyhow::Result<()> {
    let config_path = AppConfig::path();
    let config = AppConfig::load();

    if init {
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", config_path.display()))?;
        println!("Wrote defaults to: {}", config_path.display());
        return Ok(());
    }

    if config_path.exists() {
        println!("Config file: {}", config_path.display());
    } else {
        println!(
            "No config file at {} (using defaults; run `storyclip config --init` to create one)",
            config_path.display()
        );
    }
    println!();
    println!("  Cache dir: {}", config.cache_dir.display());
    println!("  Gallery root: {}", config.gallery.root.display());
    println!("  Gallery album: {}", config.gallery.album);
    println!(
        "  Stage timeout: {}",
        if config.pipeline.stage_timeout_secs == 0 {
            "disabled".to_string()
        } else {
            format!("{}s", config.pipeline.stage_timeout_secs)
        }
    );
    println!("  Cleanup policy: {:?}", config.pipeline.cleanup);
    println!("  Overlay font: {}", config.pipeline.font_path.display());
    println!("  Log level: {}", config.logging.level);

    Ok(())
}
