//! Configuration handling for the plugin
//!
//! Configuration is read from the file given with `--config` (or
//! `COMPILER_PLUGIN_CONFIG`), falling back to `config.toml` in the per-user
//! config directory. A missing file means defaults.
//!
//! ```toml
//! [handler]
//! echo_requests = false
//!
//! [transport]
//! framing = "length-prefixed"
//! max_frame_bytes = 67108864
//!
//! [capability]
//! features = []
//!
//! [log]
//! level = "warn"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::plugin::{Framing, HandlerOptions, DEFAULT_MAX_FRAME_BYTES};
use crate::protocol::{PluginCapability, FEATURE_LOAD_PLUGIN_LIBRARY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HandlerConfig {
    /// Append a copy of each request to the expansion it produced.
    /// Only builds with the `request-echo` feature accept `true`.
    pub echo_requests: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        let options = HandlerOptions::default();
        Self {
            echo_requests: options.echo_requests,
        }
    }
}

/// Wire settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    pub framing: Framing,

    /// Largest accepted inbound message
    pub max_frame_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// What the plugin advertises in `getCapabilityResult`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Extra feature strings to advertise
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub handler: HandlerConfig,
    pub transport: TransportConfig,
    pub capability: CapabilityConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Returns the per-user config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "compiler-plugin", "compiler-plugin")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Reads and validates a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;

        Ok(config)
    }

    /// Parses and validates config text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handler.echo_requests && !cfg!(feature = "request-echo") {
            return Err(ConfigError::Invalid(
                "handler.echo_requests requires a build with the request-echo feature"
                    .to_string(),
            ));
        }

        if self.transport.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid(
                "transport.max_frame_bytes must be greater than zero".to_string(),
            ));
        }

        if self
            .capability
            .features
            .iter()
            .any(|feature| feature == FEATURE_LOAD_PLUGIN_LIBRARY)
        {
            return Err(ConfigError::Invalid(format!(
                "feature '{}' cannot be advertised: this plugin does not load libraries",
                FEATURE_LOAD_PLUGIN_LIBRARY
            )));
        }

        self.log.level_filter()?;
        Ok(())
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            echo_requests: self.handler.echo_requests,
        }
    }

    /// Capability advertised to the host
    pub fn plugin_capability(&self) -> PluginCapability {
        self.capability
            .features
            .iter()
            .fold(PluginCapability::default(), |capability, feature| {
                capability.with_feature(feature.clone())
            })
    }
}
