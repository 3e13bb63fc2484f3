//! Configuration system
//!
//! Contract-level settings (frames in flight, default light rig) loaded from
//! TOML or RON depending on the file extension. Parsed values are validated
//! before they are returned.

pub use serde::{Serialize, Deserialize};

use crate::render::light_rig::LightRig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse and validate configuration text, choosing the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Self = if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
    
    /// Serialize configuration, choosing the format from `path`'s extension
    fn to_string_with_format(&self, path: &str) -> Result<String, ConfigError> {
        if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(path)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Value outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Largest number of frames the host may prepare ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

/// Settings for producing contract records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Number of per-frame record sets kept alive (1 to 3)
    pub frames_in_flight: usize,
    /// Light placements used when a scene does not provide its own
    pub lights: LightRig,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            lights: LightRig::default(),
        }
    }
}

impl Config for ContractConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FRAMES_IN_FLIGHT).contains(&self.frames_in_flight) {
            return Err(ConfigError::Invalid {
                field: "frames_in_flight",
                reason: format!("must be between 1 and {MAX_FRAMES_IN_FLIGHT}, got {}", self.frames_in_flight),
            });
        }
        Ok(())
    }
}
