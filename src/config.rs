//! TOML configuration.
//!
//! Read from `--config` or `<config_dir>/todo-list/config.toml`. A missing
//! file means defaults; a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::db::STORAGE_KEY;
use crate::seed::{DEFAULT_COUNT, DEFAULT_ENDPOINT};

const APP_DIR: &str = "todo-list";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key: default_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_endpoint(),
            count: default_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_timeout_secs() -> u64 {
    10
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Load the config at `path`, or at the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse_config(raw: &str) -> Result<Config> {
    Ok(toml::from_str(raw)?)
}

impl Config {
    /// Data directory: explicit override, then config, then the platform default.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".todo-list"))
    }
}
