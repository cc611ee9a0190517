//! Logging and tracing initialization.

use std::fs::File;
use std::sync::Arc;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` overrides the configured level when set. With
/// `config.file` set, output goes to that file (without ANSI colors)
/// instead of the default stream.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = config.file.as_ref().and_then(|path| match File::create(path) {
        Ok(file) => Some(Arc::new(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", path.display());
            None
        }
    });

    match (log_file, config.json) {
        (Some(file), true) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (Some(file), false) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (None, true) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (None, false) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
}
