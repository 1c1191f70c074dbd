//! Engine configuration.
//!
//! Every field has a default so an empty TOML document is a valid config.
//!
//! ```toml
//! max_lights = 8
//! texture_dir = "texture"
//! log_filter = "ovo_scene=debug"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Number of light slots fixed-function hardware guarantees.
pub const MAX_HARDWARE_LIGHTS: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many lights the render list may configure per frame.
    pub max_lights: usize,
    /// Directory texture file names from OVO materials are resolved against.
    pub texture_dir: PathBuf,
    /// `env_logger` filter used by the binaries when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_lights: MAX_HARDWARE_LIGHTS,
            texture_dir: PathBuf::from("texture"),
            log_filter: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// The light budget can be lowered but never raised past the hardware slots.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lights == 0 || self.max_lights > MAX_HARDWARE_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "max_lights must be within 1..={MAX_HARDWARE_LIGHTS}, got {}",
                self.max_lights
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
