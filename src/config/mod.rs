//! Configuration loading and management for the RTI engine.
//!
//! This module loads the employer identity and gateway settings from a
//! YAML file.
//!
//! # Example
//!
//! ```no_run
//! use rti_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/rti.yaml").unwrap();
//! println!("Filing as: {}", config.employer().employer_ref);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EmployerConfig, GatewayConfig, RtiConfig};
