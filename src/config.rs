use crate::rules::MIN_LOOKBACK;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET: &str = "src-tauri/src/features/appearances/commands/update.rs";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: Option<PathBuf>,
    #[serde(default = "default_lookback")]
    pub lookback: usize,
}

fn default_lookback() -> usize {
    MIN_LOOKBACK
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: None,
            lookback: default_lookback(),
        }
    }
}

impl Config {
    pub fn target_or_default(&self) -> PathBuf {
        self.target
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raw(&raw)
}

/// Explicitly requested config, or defaults when none was asked for.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load(path),
        None => Ok(Config::default()),
    }
}

pub fn parse_raw(raw: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(raw)?;
    Ok(cfg)
}
