use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::language::{
    CompileConfig, DEFAULT_TOOL_PATH, FileExtension, Language,
};
use crate::types::ResourceLimits;

pub mod language;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../crucible.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("language '{0}' not found in configuration")]
    LanguageNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for the compile worker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Largest accepted source submission in bytes
    #[serde(default = "default_max_source_size")]
    pub max_source_size: usize,

    /// Per-stream cap on captured compiler output in bytes
    #[serde(default = "default_max_diagnostics_bytes")]
    pub max_diagnostics_bytes: usize,

    /// Directory where successful artifacts are persisted.
    /// Defaults to the system temp directory when unset.
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Base resource limits applied to every compile.
    /// Overridden per language and per request.
    #[serde(default)]
    pub default_limits: ResourceLimits,

    /// Language configurations keyed by language ID
    #[serde(default)]
    pub languages: HashMap<String, Language>,
}

impl Config {
    /// Create a new config with embedded default languages
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no languages
    pub fn empty() -> Self {
        Self {
            max_source_size: default_max_source_size(),
            max_diagnostics_bytes: default_max_diagnostics_bytes(),
            artifact_dir: None,
            default_limits: ResourceLimits::default(),
            languages: HashMap::new(),
        }
    }

    /// Get a language by ID
    pub fn get_language(&self, id: &str) -> Result<&Language, ConfigError> {
        self.languages
            .get(id)
            .ok_or_else(|| ConfigError::LanguageNotFound(id.to_string()))
    }

    /// Directory where artifacts are persisted
    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Merge resource limits with the configured defaults
    pub fn effective_limits(&self, overrides: Option<&ResourceLimits>) -> ResourceLimits {
        match overrides {
            Some(limits) => self.default_limits.with_overrides(limits),
            None => self.default_limits.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_max_source_size() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_diagnostics_bytes() -> usize {
    64 * 1024
}
