//! Check system capabilities.

use storyclip_common::config::AppConfig;
use storyclip_pipeline::ffmpeg::command_exists;

pub fn run() -> anyhow::Result<()> {
    println!("StoryClip System Check");
    println!("{}", "=".repeat(50));

    let config = AppConfig::load();
    let mut all_ok = true;

    for binary in ["ffmpeg", "ffprobe"] {
        if command_exists(binary) {
            println!("[OK] {binary} found in PATH");
        } else {
            println!("[FAIL] {binary} not found in PATH");
            all_ok = false;
        }
    }

    if config.pipeline.font_path.exists() {
        println!(
            "[OK] Overlay font: {}",
            config.pipeline.font_path.display()
        );
    } else {
        println!(
            "[FAIL] Overlay font missing: {}",
            config.pipeline.font_path.display()
        );
        all_ok = false;
    }

    match std::fs::create_dir_all(&config.cache_dir) {
        Ok(()) => println!("[OK] Cache directory: {}", config.cache_dir.display()),
        Err(e) => {
            println!(
                "[FAIL] Cache directory {}: {e}",
                config.cache_dir.display()
            );
            all_ok = false;
        }
    }

    match std::fs::create_dir_all(&config.gallery.root) {
        Ok(()) => println!("[OK] Gallery root: {}", config.gallery.root.display()),
        Err(e) => {
            println!("[FAIL] Gallery root {}: {e}", config.gallery.root.display());
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All capabilities are available. StoryClip is ready.");
    } else {
        println!("Some capabilities are missing. See above for details.");
    }

    Ok(())
}
