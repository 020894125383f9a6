/// Persistent data: settings and the leaderboard.
///
/// Both live as JSON files in one data directory, by default
/// `$HOME/.terminal_snake`. Reads never fail: a missing or damaged file
/// yields defaults (logged at warn level). Writes report errors.

pub mod leaderboard;
pub mod settings;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::StoreError;

const DATA_DIR_NAME: &str = ".terminal_snake";
const SETTINGS_FILE: &str = "settings.json";
const LEADER_BOARD_FILE: &str = "leaderboard.json";

#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    /// `$HOME/.terminal_snake`, or `./.terminal_snake` without a home.
    pub fn default_root() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(DATA_DIR_NAME),
            None => PathBuf::from(DATA_DIR_NAME),
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    fn leader_board_path(&self) -> PathBuf {
        self.root.join(LEADER_BOARD_FILE)
    }

    /// Parsed JSON from `path`, or `None` if absent or unreadable.
    fn read_json(path: &Path) -> Option<serde_json::Value> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                None
            }
        }
    }

    /// Writes `value` as 4-space indented JSON, creating the directory.
    fn write_json(&self, path: &Path, value: &impl Serialize) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: path.display().to_string(), source };
        std::fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser)?;
        std::fs::write(path, buf).map_err(io_err)
    }
}
