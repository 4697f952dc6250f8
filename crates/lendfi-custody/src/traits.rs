//! # Custody Traits
//!
//! Abstract interfaces for the two external custody collaborators.
//! Both require `Send + Sync` so a ledger can be shared across threads.

use thiserror::Error;

use lendfi_core::{Amount, CollateralRef, PartyId, RegistryId};

/// Failure surfaced by a collateral registry or funds vault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The registry has no record of the token.
    #[error("token {0} does not exist")]
    UnknownToken(CollateralRef),

    /// The collateral names a registry this deployment does not know.
    #[error("unknown collateral registry {0}")]
    UnknownRegistry(RegistryId),

    /// The `from` side of a token transfer does not own the token.
    #[error("{party} does not own {collateral}")]
    NotOwner {
        collateral: CollateralRef,
        party: PartyId,
    },

    /// The source balance cannot cover the transfer.
    #[error("insufficient funds: {party} needs {needed}, has {available}")]
    InsufficientFunds {
        party: PartyId,
        needed: Amount,
        available: Amount,
    },

    /// Crediting the destination would overflow its balance.
    #[error("balance overflow crediting {0}")]
    BalanceOverflow(PartyId),

    /// The collaborator refused the transfer for its own reasons.
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// A transfer failed and reversing the legs already executed also failed.
    #[error("{cause}; unwinding failed: {unwind}")]
    UnwindFailed {
        cause: Box<CustodyError>,
        unwind: Box<CustodyError>,
    },
}

/// Ownership and transfer-approval registry for non-fungible collateral.
pub trait CollateralRegistry: Send + Sync {
    /// Whether `custodian` may move `collateral` on behalf of `owner`.
    fn is_approved_for_transfer(
        &self,
        custodian: &PartyId,
        owner: &PartyId,
        collateral: &CollateralRef,
    ) -> Result<bool, CustodyError>;

    /// Move ownership of `collateral` from `from` to `to`.
    ///
    /// Fails with [`CustodyError::NotOwner`] if `from` is not the current owner.
    fn transfer_custody(
        &self,
        collateral: &CollateralRef,
        from: &PartyId,
        to: &PartyId,
    ) -> Result<(), CustodyError>;

    /// Current owner of `collateral`.
    fn owner_of(&self, collateral: &CollateralRef) -> Result<PartyId, CustodyError>;
}

/// Value-transfer mechanism for principal and repayments.
pub trait FundsVault: Send + Sync {
    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: &PartyId, to: &PartyId, amount: Amount) -> Result<(), CustodyError>;

    /// Current balance of `party`. Unknown parties hold zero.
    fn balance_of(&self, party: &PartyId) -> Amount;
}
