//! # Settlement
//!
//! An operation stages the custody movements it needs as ordered
//! [`CustodyLeg`]s. [`Settlement::execute`] runs them in order; if one fails,
//! the legs that already ran are reversed newest-first and the original
//! failure is returned. The ledger commits the loan record only after a
//! settlement succeeds, so a failed leg never leaves a half-applied transition.
//!
//! If a reversal itself fails the custody collaborators have diverged from
//! the ledger. That is reported as [`CustodyError::UnwindFailed`] and logged
//! at `error` level for an operator to reconcile.

use lendfi_core::{Amount, CollateralRef, PartyId};
use lendfi_custody::{CollateralRegistry, CustodyError, FundsVault};

/// One custody movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyLeg {
    Funds {
        from: PartyId,
        to: PartyId,
        amount: Amount,
    },
    Collateral {
        collateral: CollateralRef,
        from: PartyId,
        to: PartyId,
    },
}

impl CustodyLeg {
    /// The movement that undoes this one.
    pub fn reversed(&self) -> CustodyLeg {
        match self {
            Self::Funds { from, to, amount } => Self::Funds {
                from: to.clone(),
                to: from.clone(),
                amount: *amount,
            },
            Self::Collateral {
                collateral,
                from,
                to,
            } => Self::Collateral {
                collateral: collateral.clone(),
                from: to.clone(),
                to: from.clone(),
            },
        }
    }

    fn run(
        &self,
        registry: &dyn CollateralRegistry,
        vault: &dyn FundsVault,
    ) -> Result<(), CustodyError> {
        match self {
            Self::Funds { from, to, amount } => vault.transfer(from, to, *amount),
            Self::Collateral {
                collateral,
                from,
                to,
            } => registry.transfer_custody(collateral, from, to),
        }
    }
}

/// Ordered custody legs of a single ledger operation.
#[derive(Debug, Default, Clone)]
pub struct Settlement {
    legs: Vec<CustodyLeg>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, leg: CustodyLeg) {
        self.legs.push(leg);
    }

    pub fn legs(&self) -> &[CustodyLeg] {
        &self.legs
    }

    /// Run every leg, or none of them.
    pub fn execute(
        &self,
        registry: &dyn CollateralRegistry,
        vault: &dyn FundsVault,
    ) -> Result<(), CustodyError> {
        for (done, leg) in self.legs.iter().enumerate() {
            if let Err(cause) = leg.run(registry, vault) {
                tracing::warn!(?leg, error = %cause, unwinding = done, "custody leg failed");
                return match unwind(&self.legs[..done], registry, vault) {
                    Ok(()) => Err(cause),
                    Err(unwind) => {
                        tracing::error!(?leg, error = %cause, unwind_error = %unwind, "custody unwind failed");
                        Err(CustodyError::UnwindFailed {
                            cause: Box::new(cause),
                            unwind: Box::new(unwind),
                        })
                    }
                };
            }
        }
        Ok(())
    }
}

fn unwind(
    executed: &[CustodyLeg],
    registry: &dyn CollateralRegistry,
    vault: &dyn FundsVault,
) -> Result<(), CustodyError> {
    for leg in executed.iter().rev() {
        leg.reversed().run(registry, vault)?;
    }
    Ok(())
}
