//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier the escrow handles. These prevent
//! accidental identifier confusion: a `TokenId` cannot be passed where a
//! `LoanId` is expected, and a registry cannot be confused with a party.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identity of a participant: lender, borrower, third party, or the
/// ledger's own custodian account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyId(String);

impl PartyId {
    /// Create a party identifier, rejecting empty or whitespace-only names.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "party identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sequence number of a loan within a ledger. Assigned monotonically from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoanId(pub u64);

impl LoanId {
    /// Arena slot for this id, if it fits the platform's address space.
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

/// Identifier of a non-fungible token within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u64);

/// Identifier of a collateral registry (the token contract).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryId(String);

impl RegistryId {
    /// Create a registry identifier, rejecting empty names.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "registry identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A pledged collateral asset: which registry, which token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollateralRef {
    /// The registry that tracks ownership of the token.
    pub registry: RegistryId,
    /// The token within that registry.
    pub token_id: TokenId,
}

impl CollateralRef {
    pub fn new(registry: RegistryId, token_id: TokenId) -> Self {
        Self { registry, token_id }
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loan:{}", self.0)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

impl std::fmt::Display for RegistryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CollateralRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.registry, self.token_id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_id_rejects_empty() {
        assert!(PartyId::new("").is_err());
        assert!(PartyId::new("   ").is_err());
        assert_eq!(PartyId::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_registry_id_rejects_empty() {
        assert!(RegistryId::new("").is_err());
    }

    #[test]
    fn test_display_formats() {
        let collateral = CollateralRef::new(RegistryId::new("collateral-nft").unwrap(), TokenId(1));
        assert_eq!(collateral.to_string(), "collateral-nft#1");
        assert_eq!(LoanId(7).to_string(), "loan:7");
        assert_eq!(TokenId(3).to_string(), "token:3");
    }

    #[test]
    fn test_loan_id_ordering_follows_sequence() {
        assert!(LoanId(0) < LoanId(1));
        assert_eq!(LoanId(5).index(), Some(5));
    }
}
