//! Configuration module
//!
//! This module handles configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voicevox_script::config::Config;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = Config::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = Config::from_file(&config_path)?;
//!
//! println!("Using engine at {}", config.api_url);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::{EngineYaml, VoicevoxYaml, YamlConfig};

use crate::core::client::DEFAULT_API_URL;
use crate::core::engine::EngineConfig;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// VOICEVOX engine base URL
    pub api_url: String,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Bound on the startup speaker catalog fetch
    pub catalog_timeout: Duration,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    ///
    /// The .env file, if any, is loaded into the environment by the binary
    /// before this is called.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_api_url_setting(&self.api_url)?;
        validation::validate_timeout("http_timeout", self.http_timeout)?;
        validation::validate_timeout("catalog_timeout", self.catalog_timeout)?;
        validation::validate_engine(&self.engine)?;
        Ok(())
    }
}
