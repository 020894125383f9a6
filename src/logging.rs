/// File logging setup.
///
/// The game owns the terminal, so log lines go to a file in the data
/// directory instead of stderr.

use std::path::Path;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;
use crate::error::LogError;

/// Installs the global subscriber. Does nothing when logging is disabled.
pub fn init(log: &LogConfig, dir: &Path) -> Result<(), LogError> {
    if !log.enabled {
        return Ok(());
    }
    let level = log.level.parse::<Level>().unwrap_or(Level::INFO);

    std::fs::create_dir_all(dir).map_err(|source| LogError::Io { path: dir.display().to_string(), source })?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log.file.as_str())
        .build(dir)?;

    tracing_subscriber::fmt()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level)
        .finish()
        .try_init()?;
    Ok(())
}
