//! Dispatch Configuration
//!
//! Settings for check compilers and dispatch factories, read from TOML:
//!
//! ```toml
//! [compiler]
//! import_prefilter = true
//! preload = ["decimal", "fractions"]
//!
//! [dispatch]
//! fallback_name = "<dispatch>"
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name given to a dispatch factory built without a fallback.
pub const DEFAULT_FALLBACK_NAME: &str = "<dispatch>";

/// Errors from reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How check compilers are built.
    pub compiler: CompilerConfig,

    /// How dispatch factories are built.
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Check compiler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Reject values whose type text does not mention the module's package
    /// before loading anything for an import-path check.
    pub import_prefilter: bool,

    /// Modules loaded when the compiler is built.
    pub preload: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            import_prefilter: true,
            preload: Vec::new(),
        }
    }
}

/// Dispatch factory configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Name used when no fallback implementation is given.
    pub fallback_name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
        }
    }
}
