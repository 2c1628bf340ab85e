//! Config Module - settings file for the CLI
//!
//! ```toml
//! [source]
//! kind = "http"
//! base_url = "http://localhost:8080"
//! page_size = 50
//! timeout_secs = 30
//!
//! [alignment]
//! fallback = "omit"
//! max_segments = 10000
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::DEFAULT_MAX_SEGMENTS;
use crate::core::{AlignConfig, FallbackPolicy};

/// Errors while loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Main settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub alignment: AlignmentSettings,
    pub logging: LoggingSettings,
}

/// Where devices and records come from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    /// JSON files on disk
    File { devices: String, records: String },

    /// Remote registry and store sharing one API root
    Http {
        base_url: String,
        #[serde(default = "default_page_size")]
        page_size: usize,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::File {
            devices: "~/.sensor-snapshots/devices.json".to_string(),
            records: "~/.sensor-snapshots/records.json".to_string(),
        }
    }
}

fn default_page_size() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentSettings {
    pub fallback: FallbackPolicy,
    pub max_segments: usize,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            max_segments: DEFAULT_MAX_SEGMENTS,
        }
    }
}

impl AlignmentSettings {
    /// Typed configuration for the core
    pub fn to_align_config(&self) -> AlignConfig {
        AlignConfig::new(self.fallback).with_max_segments(self.max_segments)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. "info" or "sensor_snapshots=debug"
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, or from the default location if it exists
    ///
    /// A missing default file means default settings; a missing explicit
    /// file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// `<config dir>/sensor-snapshots/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sensor-snapshots").join("config.toml"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
