//! Configuration types for the RTI engine.
//!
//! These structures are deserialized from the YAML configuration file.

use std::time::Duration;

use serde::Deserialize;

/// Employer identity printed on every filing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmployerConfig {
    /// PAYE employer reference, e.g. "123/AB45678".
    pub employer_ref: String,
    /// Accounts office reference, e.g. "123PA00045678".
    pub accounts_office_ref: String,
}

/// Timings and labels for the filing gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Simulated acknowledgement round-trip in milliseconds.
    pub submit_delay_ms: u64,
    /// Delay between acknowledgement and the acceptance poll in milliseconds.
    pub acceptance_delay_ms: u64,
    /// Upper bound on a single gateway submit call in milliseconds.
    pub timeout_ms: u64,
    /// Prefix for generated gateway references.
    pub reference_prefix: String,
}

impl GatewayConfig {
    /// The acknowledgement delay.
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// The acceptance delay.
    pub fn acceptance_delay(&self) -> Duration {
        Duration::from_millis(self.acceptance_delay_ms)
    }

    /// The submit timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1_000,
            acceptance_delay_ms: 5_000,
            timeout_ms: 30_000,
            reference_prefix: "RTI".to_string(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RtiConfig {
    /// Employer identity.
    pub employer: EmployerConfig,
    /// Gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_section_is_optional() {
        let yaml = r#"
employer:
  employer_ref: "123/AB45678"
  accounts_office_ref: "123PA00045678"
"#;
        let config: RtiConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_partial_gateway_section_keeps_other_defaults() {
        let yaml = r#"
employer:
  employer_ref: "123/AB45678"
  accounts_office_ref: "123PA00045678"
gateway:
  acceptance_delay_ms: 250
"#;
        let config: RtiConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway.acceptance_delay(), Duration::from_millis(250));
        assert_eq!(config.gateway.submit_delay_ms, 1_000);
        assert_eq!(config.gateway.reference_prefix, "RTI");
    }
}
