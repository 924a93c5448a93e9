//! YAML configuration file support for neardup.
//!
//! Both stages (signature generation and the banding index) are described in
//! a single YAML file and validated on load.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "news dedup"
//!
//! minhash:
//!   num_perm: 128
//!   seed: 1
//!   use_parallel: false
//!
//! index:
//!   num_bands: 32
//! ```
//!
//! The index always takes its signature length from `minhash.num_perm`, so
//! the two stages cannot disagree on the shape contract.

use std::fs;
use std::path::Path;

use index::IndexConfig;
use minhash::MinHashConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NeardupConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Signature generation
    #[serde(default)]
    pub minhash: MinHashYamlConfig,

    /// Banding index
    #[serde(default)]
    pub index: IndexYamlConfig,
}

impl NeardupConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NeardupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Signature stage configuration.
    pub fn minhash_config(&self) -> MinHashConfig {
        MinHashConfig::new()
            .with_num_perm(self.minhash.num_perm)
            .with_seed(self.minhash.seed)
            .with_parallel(self.minhash.use_parallel)
    }

    /// Index configuration, shaped by `minhash.num_perm`.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new()
            .with_num_bands(self.index.num_bands)
            .with_num_perm(self.minhash.num_perm)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.minhash_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("minhash: {err}")))?;
        self.index_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("index: {err}")))?;

        Ok(())
    }
}

impl Default for NeardupConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            minhash: MinHashYamlConfig::default(),
            index: IndexYamlConfig::default(),
        }
    }
}

/// Signature stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinHashYamlConfig {
    #[serde(default = "default_num_perm")]
    pub num_perm: usize,

    #[serde(default = "default_seed")]
    pub seed: u32,

    #[serde(default)]
    pub use_parallel: bool,
}

impl Default for MinHashYamlConfig {
    fn default() -> Self {
        Self {
            num_perm: default_num_perm(),
            seed: default_seed(),
            use_parallel: false,
        }
    }
}

/// Banding index YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexYamlConfig {
    #[serde(default = "default_num_bands")]
    pub num_bands: usize,
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            num_bands: default_num_bands(),
        }
    }
}

fn default_num_perm() -> usize {
    MinHashConfig::default().num_perm
}
fn default_seed() -> u32 {
    MinHashConfig::default().seed
}
fn default_num_bands() -> usize {
    IndexConfig::default().num_bands
}
