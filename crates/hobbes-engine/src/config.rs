//! Engine configuration

use crate::error::{EngineError, LoadError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the inference engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest chain of nested arguments before building fails
    pub max_depth: usize,

    /// Reuse arguments already built within one environment
    pub memoize_arguments: bool,

    /// Conclusions examined by `explain_ages`
    pub conclusions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            memoize_arguments: true,
            conclusions: vec!["model prediction".to_string(), "need marine curve".to_string()],
        }
    }
}

impl EngineConfig {
    /// Shallow nesting limit, for rule bases that should stay flat
    pub fn strict() -> Self {
        Self {
            max_depth: 8,
            ..Self::default()
        }
    }

    /// Rebuild every argument, even ones already seen
    pub fn uncached() -> Self {
        Self {
            memoize_arguments: false,
            ..Self::default()
        }
    }

    /// Parse configuration from TOML; missing fields take defaults
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_depth == 0 {
            return Err(EngineError::Config("max_depth must be at least 1".to_string()));
        }
        if self.conclusions.iter().any(|c| c.trim().is_empty()) {
            return Err(EngineError::Config("conclusions must not be blank".to_string()));
        }
        Ok(())
    }
}
