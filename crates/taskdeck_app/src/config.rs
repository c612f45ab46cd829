//! Console configuration.
//!
//! Read from a RON file (first CLI argument, else `./taskdeck.ron` when it
//! exists). Every field is optional and falls back to its default. The base
//! URL can be overridden with `--base-url` or `TASKDECK_BASE_URL`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use taskdeck_core::SyncSettings;
use taskdeck_engine::TransportSettings;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "taskdeck.ron";

#[derive(Debug, Parser)]
#[command(name = "taskdeck")]
#[command(about = "Live console for server-side background tasks", long_about = None)]
pub struct Cli {
    /// RON config file; `./taskdeck.ron` is used when omitted and present.
    pub config: Option<PathBuf>,
    /// Task server base URL, overriding the config file.
    #[arg(long, env = "TASKDECK_BASE_URL")]
    pub base_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub reconnect_interval_ms: u64,
    pub refresh_debounce_ms: u64,
    pub log_tail_lines: u32,
    pub log_file: PathBuf,
    pub log_level: String,
    pub log_to_terminal: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            reconnect_interval_ms: 3_000,
            refresh_debounce_ms: 120,
            log_tail_lines: 600,
            log_file: PathBuf::from("./taskdeck.log"),
            log_level: "info".to_string(),
            log_to_terminal: false,
        }
    }
}

impl AppConfig {
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            refresh_debounce: Duration::from_millis(self.refresh_debounce_ms),
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
            log_tail_lines: self.log_tail_lines,
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

/// Loads the config from `explicit`, or the default file if present, then
/// applies the base URL override.
pub fn load(explicit: Option<&Path>, base_url: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut config = match explicit {
        Some(path) => read_file(path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                read_file(fallback)?
            } else {
                AppConfig::default()
            }
        }
    };
    if let Some(base_url) = base_url.map(str::trim).filter(|url| !url.is_empty()) {
        config.base_url = base_url.to_string();
    }
    config.level_filter()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

fn parse(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    ron::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
