//! Configuration
//!
//! Read from a TOML file. Every key is optional:
//!
//! ```toml
//! [layout]
//! width = 1600
//! column_pitch = 160
//!
//! [timeline]
//! scope_naming = "unique"
//!
//! [playback]
//! interval_ms = 300
//! ```

use crate::layout::LayoutConfig;
use crate::timeline::{BuildOptions, ScopeNaming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid layout.{key}: {value}")]
    InvalidMetric { key: &'static str, value: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub timeline: TimelineConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub scope_naming: ScopeNaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between autoplay steps
    pub interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig { interval_ms: 500 }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject layout metrics that are negative, non-finite or larger than
    /// the canvas allows
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.layout.invalid_metric() {
            Some((key, value)) => Err(ConfigError::InvalidMetric { key, value }),
            None => Ok(()),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            scope_naming: self.timeline.scope_naming,
        }
    }
}
