//! Configuration file handling for ascii-worker.
//!
//! Loads render defaults from `~/.config/ascii-worker/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ascii::{CharSet, DEFAULT_CHAR_ASPECT_RATIO};
use crate::renderer::{Dither, RenderOptions};

/// Configuration file structure for ascii-worker.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
}

/// The `[render]` section.
///
/// ```toml
/// [render]
/// charset = "blocks"
/// invert = true
/// char_aspect = 2.0
/// gamma = true
/// dither = "floyd-steinberg"
/// ```
#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub invert: bool,
    #[serde(default = "default_char_aspect")]
    pub char_aspect: f32,
    #[serde(default)]
    pub gamma: bool,
    #[serde(default)]
    pub dither: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            charset: None,
            invert: false,
            char_aspect: default_char_aspect(),
            gamma: false,
            dither: None,
        }
    }
}

fn default_char_aspect() -> f32 {
    DEFAULT_CHAR_ASPECT_RATIO
}

impl RenderConfig {
    /// Resolve the section into validated render options.
    pub fn options(&self) -> Result<RenderOptions, ConfigError> {
        let charset = match &self.charset {
            Some(name) => name
                .parse::<CharSet>()
                .map_err(|message| ConfigError::InvalidValue {
                    field: "render.charset",
                    message,
                })?,
            None => CharSet::default(),
        };
        let dither = match &self.dither {
            Some(name) => name
                .parse::<Dither>()
                .map_err(|message| ConfigError::InvalidValue {
                    field: "render.dither",
                    message,
                })?,
            None => Dither::default(),
        };

        let options = RenderOptions {
            charset,
            char_aspect: self.char_aspect,
            gamma: self.gamma,
            dither,
        };
        options
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                field: "render.char_aspect",
                message: e.to_string(),
            })?;
        Ok(options)
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::from_toml_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ascii-worker").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/ascii-worker/config.toml")
        })
}
