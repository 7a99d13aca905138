//! TOML configuration file support.
//!
//! Reader tuning and output defaults can live in a config file instead of
//! being passed on every run:
//!
//! ```toml
//! # srmdoc.toml
//! [reader]
//! buffer_size = 262144
//!
//! [output]
//! json = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use srmdoc::reader::ReaderConfig;
use std::path::Path;

/// Root configuration structure for srmdoc.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Document reader settings.
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output settings for the info command.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Print summaries as JSON.
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
