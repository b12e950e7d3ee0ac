use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::Result;
use color_eyre::eyre::Context;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Install the global subscriber.
///
/// The console layer is filtered by `console_directive`, an `EnvFilter`
/// directive such as `info` or `venue_booking=debug,tower_http=debug`. When
/// `log_file` is set every record at or above `file_level` is also appended
/// to that file without colors. Records emitted through the `log` facade are
/// forwarded by the subscriber's `tracing-log` bridge.
pub fn setup_logging(
    console_directive: &str,
    log_file: Option<PathBuf>,
    file_level: LevelFilter,
) -> Result<()> {
    let console_filter = EnvFilter::try_new(console_directive)
        .wrap_err_with(|| format!("Invalid log level directive: {console_directive}"))?;
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(console_filter);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(file_level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(())
}
