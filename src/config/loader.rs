//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{RtiError, RtiResult};

use super::types::{EmployerConfig, GatewayConfig, RtiConfig};

/// Loads and provides access to the engine configuration.
///
/// # File Layout
///
/// ```text
/// employer:
///   employer_ref: "123/AB45678"
///   accounts_office_ref: "123PA00045678"
/// gateway:              # optional, every key has a default
///   submit_delay_ms: 1000
///   acceptance_delay_ms: 5000
///   timeout_ms: 30000
///   reference_prefix: "RTI"
/// ```
///
/// # Example
///
/// ```no_run
/// use rti_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/rti.yaml").unwrap();
/// println!("Employer: {}", loader.employer().employer_ref);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: RtiConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML or lacks the employer section
    pub fn load<P: AsRef<Path>>(path: P) -> RtiResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| RtiError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Example
    ///
    /// ```
    /// use rti_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_yaml_str(
    ///     "employer:\n  employer_ref: \"123/AB45678\"\n  accounts_office_ref: \"123PA00045678\"\n",
    /// )?;
    /// assert_eq!(loader.gateway().reference_prefix, "RTI");
    /// # Ok::<(), rti_engine::error::RtiError>(())
    /// ```
    pub fn from_yaml_str(content: &str) -> RtiResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: RtiConfig) -> Self {
        Self { config }
    }

    fn parse(content: &str, path: &str) -> RtiResult<Self> {
        let config: RtiConfig =
            serde_yaml::from_str(content).map_err(|e| RtiError::ConfigParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        if config.employer.employer_ref.trim().is_empty() {
            return Err(RtiError::ConfigParseError {
                path: path.to_string(),
                message: "employer.employer_ref must not be empty".to_string(),
            });
        }

        Ok(Self { config })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RtiConfig {
        &self.config
    }

    /// Returns the employer identity.
    pub fn employer(&self) -> &EmployerConfig {
        &self.config.employer
    }

    /// Returns the gateway settings.
    pub fn gateway(&self) -> &GatewayConfig {
        &self.config.gateway
    }
}
