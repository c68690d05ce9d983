//! Configuration loading.
//!
//! The configuration is a small TOML file holding the Gemini API key and the
//! model name. It is read through a [`ConfigProvider`] on every generation
//! request so that edits take effect without a restart.

use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the configuration lives unless told otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// The value shipped in the example configuration; never a real key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Example configuration shown when the startup check fails.
pub const SAMPLE_CONFIG: &str = r#"# config/config.toml
api_key = "YOUR_GEMINI_API_KEY"
model_name = "gemini-2.0-flash"
"#;

/// Errors from loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found at: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error decoding TOML file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0}")]
    InvalidValue(String),
}

/// API credentials and model selection.
///
/// Missing keys deserialize to empty strings; [`Configuration::validate`]
/// is what rejects them.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model_name: String,
}

impl Configuration {
    pub fn new(api_key: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: model_name.into(),
        }
    }

    /// Startup check: reject empty or placeholder credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(ConfigError::InvalidValue(
                "API key is missing or appears to be a placeholder.".to_string(),
            ));
        }

        if self.model_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "Model name is missing in the configuration.".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("model_name", &self.model_name)
            .finish()
    }
}

/// Show only the first and last four characters of a key.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Read and parse a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Source of the current configuration.
///
/// Implementations must return the latest value on every call.
pub trait ConfigProvider: Send + Sync {
    fn load(&self) -> Result<Configuration, ConfigError>;
}

/// Re-reads a TOML file on every call.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigProvider for FileConfig {
    fn load(&self) -> Result<Configuration, ConfigError> {
        load_config(&self.path)
    }
}

/// A fixed configuration value.
#[derive(Debug, Clone)]
pub struct StaticConfig(pub Configuration);

impl ConfigProvider for StaticConfig {
    fn load(&self) -> Result<Configuration, ConfigError> {
        Ok(self.0.clone())
    }
}
