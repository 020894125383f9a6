/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::settings::GameSpeed;
use crate::store::Store;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub data_dir: PathBuf,
    pub log: LogConfig,
}

/// Frame time for each game speed.
#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub slow_ms: u64,
    pub normal_ms: u64,
    pub fast_ms: u64,
    pub very_fast_ms: u64,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub enabled: bool,
    /// File name inside the data directory.
    pub file: String,
    pub level: String,
}

impl SpeedConfig {
    pub fn frame_time(&self, speed: GameSpeed) -> Duration {
        let ms = match speed {
            GameSpeed::Slow => self.slow_ms,
            GameSpeed::Normal => self.normal_ms,
            GameSpeed::Fast => self.fast_ms,
            GameSpeed::VeryFast => self.very_fast_ms,
        };
        Duration::from_millis(ms.max(1))
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_slow")]
    slow_ms: u64,
    #[serde(default = "default_normal")]
    normal_ms: u64,
    #[serde(default = "default_fast")]
    fast_ms: u64,
    #[serde(default = "default_very_fast")]
    very_fast_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    data_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_enabled")]
    enabled: bool,
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_slow() -> u64 { 450 }
fn default_normal() -> u64 { 300 }
fn default_fast() -> u64 { 200 }
fn default_very_fast() -> u64 { 120 }

fn default_log_enabled() -> bool { true }
fn default_log_file() -> String { "snake.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            slow_ms: default_slow(),
            normal_ms: default_normal(),
            fast_ms: default_fast(),
            very_fast_ms: default_very_fast(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            enabled: default_log_enabled(),
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        Self::from_toml(load_toml(&candidate_dirs()))
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        // Empty means the per-user default
        let data_dir = match toml_cfg.general.data_dir.trim() {
            "" => Store::default_root(),
            dir => PathBuf::from(dir),
        };

        GameConfig {
            speed: SpeedConfig {
                slow_ms: toml_cfg.speed.slow_ms,
                normal_ms: toml_cfg.speed.normal_ms,
                fast_ms: toml_cfg.speed.fast_ms,
                very_fast_ms: toml_cfg.speed.very_fast_ms,
            },
            data_dir,
            log: LogConfig {
                enabled: toml_cfg.log.enabled,
                file: toml_cfg.log.file,
                level: toml_cfg.log.level,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return parse_toml(&text),
            Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: config.toml parse error: {e}");
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}
