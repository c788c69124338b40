//! Provider configuration.
//!
//! The setup wizard and CLI own writing this file; the core only reads it
//! and treats the resulting value as read-only input per call.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::llm::Provider;

/// Configuration for one backend, as loaded from `.revq/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Feed past findings for a file back into its review prompt.
    #[serde(default = "default_include_context")]
    pub include_context: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: String::new(),
            model: default_model(),
            include_context: default_include_context(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }

    /// The gate the setup wizard establishes: a provider is usable once an
    /// API key is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_include_context() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}
