//! File logging backed by `fern`.
//!
//! Library code logs through the `log` macros; nothing is written anywhere
//! until [`setup`] installs a dispatcher. Disabled logging installs nothing.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;

use crate::config::LoggingConfig;

/// Build the dispatcher for `config` without installing it.
///
/// Creates the log file (and its directory) so a bad path fails here rather
/// than on the first log line.
pub fn build_dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
    let level = config.level_filter()?;
    let path = config.resolved_file()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;

    Ok(fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", level.min(log::LevelFilter::Warn))
        .chain(file))
}

/// Install the global logger. Returns the log file path when logging is on.
pub fn setup(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let path = config.resolved_file()?;
    build_dispatch(config)?
        .apply()
        .context("A global logger is already installed")?;

    log::info!("Logging to {}", path.display());
    Ok(Some(path))
}
