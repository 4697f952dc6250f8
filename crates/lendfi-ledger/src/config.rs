//! # Ledger Configuration
//!
//! ```yaml
//! custodian: lendfi-escrow
//! min_deadline_lead_secs: 60
//! ```

use serde::{Deserialize, Serialize};

use lendfi_core::PartyId;

use crate::error::ConfigError;

/// Settings for a [`LoanLedger`](crate::LoanLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Account under which the ledger holds deposits and collateral.
    /// Registries must approve this party for collateral transfers.
    pub custodian: PartyId,

    /// A submitted deadline must be strictly later than now plus this lead.
    #[serde(default)]
    pub min_deadline_lead_secs: i64,
}

impl LedgerConfig {
    pub fn new(custodian: PartyId) -> Self {
        Self {
            custodian,
            min_deadline_lead_secs: 0,
        }
    }

    pub fn with_min_deadline_lead_secs(mut self, secs: i64) -> Self {
        self.min_deadline_lead_secs = secs;
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.custodian.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid("custodian must not be empty".into()));
        }
        if self.min_deadline_lead_secs < 0 {
            return Err(ConfigError::Invalid(format!(
                "min_deadline_lead_secs must be non-negative, got {}",
                self.min_deadline_lead_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let config =
            LedgerConfig::from_yaml_str("custodian: lendfi-escrow\nmin_deadline_lead_secs: 60\n")
                .unwrap();
        assert_eq!(config.custodian.as_str(), "lendfi-escrow");
        assert_eq!(config.min_deadline_lead_secs, 60);
    }

    #[test]
    fn test_lead_defaults_to_zero() {
        let config = LedgerConfig::from_yaml_str("custodian: escrow\n").unwrap();
        assert_eq!(config.min_deadline_lead_secs, 0);
    }

    #[test]
    fn test_missing_custodian_rejected() {
        assert!(matches!(
            LedgerConfig::from_yaml_str("min_deadline_lead_secs: 5\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_custodian_rejected() {
        assert!(matches!(
            LedgerConfig::from_yaml_str("custodian: \"\"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_negative_lead_rejected() {
        let config = LedgerConfig::new(PartyId::new("escrow").unwrap())
            .with_min_deadline_lead_secs(-1);
        assert!(config.validate().is_err());
    }
}
