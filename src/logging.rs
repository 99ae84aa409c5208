//! File logging.
//!
//! The terminal is owned by the menu, so log records go to a file only.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::path::Path;

/// Parse a level name; unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Install a global logger appending to `path` at `level`.
///
/// # Errors
///
/// Fails when the file cannot be opened or a logger is already installed.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, config, file).context("Logger already initialized")?;
    log::info!("logging to {} at {level}", path.display());
    Ok(())
}
