//! # In-Memory Custody
//!
//! Process-local implementations of [`CollateralRegistry`] and [`FundsVault`].
//! The registry follows non-fungible token semantics: every token has exactly
//! one owner, owners may approve an operator for all their tokens or for a
//! single token, and a single-token approval is cleared when the token moves.
//!
//! Both types can be told to reject transfers (`freeze_token`,
//! `freeze_party`) so callers can exercise their failure paths.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use lendfi_core::{Amount, CollateralRef, PartyId, RegistryId};

use crate::traits::{CollateralRegistry, CustodyError, FundsVault};

// ─── Collateral Registry ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct RegistryBook {
    known_registries: HashSet<RegistryId>,
    owners: HashMap<CollateralRef, PartyId>,
    token_approvals: HashMap<CollateralRef, PartyId>,
    /// (registry, owner, operator)
    operator_approvals: HashSet<(RegistryId, PartyId, PartyId)>,
    frozen: HashSet<CollateralRef>,
}

/// In-memory non-fungible token registry.
#[derive(Debug, Default)]
pub struct InMemoryCollateralRegistry {
    book: Mutex<RegistryBook>,
}

impl InMemoryCollateralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token contract so its tokens can be minted.
    pub fn register(&self, registry: RegistryId) {
        self.book.lock().known_registries.insert(registry);
    }

    /// Mint `collateral` to `owner`.
    pub fn mint(&self, collateral: CollateralRef, owner: PartyId) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        if !book.known_registries.contains(&collateral.registry) {
            return Err(CustodyError::UnknownRegistry(collateral.registry));
        }
        if book.owners.contains_key(&collateral) {
            return Err(CustodyError::Rejected(format!("{collateral} already minted")));
        }
        book.owners.insert(collateral, owner);
        Ok(())
    }

    /// Approve or revoke `operator` for every token `owner` holds in `registry`.
    pub fn set_approval_for_all(
        &self,
        registry: &RegistryId,
        owner: &PartyId,
        operator: &PartyId,
        approved: bool,
    ) {
        let key = (registry.clone(), owner.clone(), operator.clone());
        let mut book = self.book.lock();
        if approved {
            book.operator_approvals.insert(key);
        } else {
            book.operator_approvals.remove(&key);
        }
    }

    /// Approve `operator` for a single token. Only the owner may approve.
    pub fn approve(
        &self,
        collateral: &CollateralRef,
        owner: &PartyId,
        operator: &PartyId,
    ) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        let current = book
            .owners
            .get(collateral)
            .ok_or_else(|| CustodyError::UnknownToken(collateral.clone()))?;
        if current != owner {
            return Err(CustodyError::NotOwner {
                collateral: collateral.clone(),
                party: owner.clone(),
            });
        }
        book.token_approvals
            .insert(collateral.clone(), operator.clone());
        Ok(())
    }

    /// Make every transfer of `collateral` fail until unfrozen.
    pub fn freeze_token(&self, collateral: &CollateralRef, frozen: bool) {
        let mut book = self.book.lock();
        if frozen {
            book.frozen.insert(collateral.clone());
        } else {
            book.frozen.remove(collateral);
        }
    }

    /// Number of tokens currently owned by `party` across all registries.
    pub fn balance_of(&self, party: &PartyId) -> usize {
        self.book
            .lock()
            .owners
            .values()
            .filter(|owner| *owner == party)
            .count()
    }
}

impl CollateralRegistry for InMemoryCollateralRegistry {
    fn is_approved_for_transfer(
        &self,
        custodian: &PartyId,
        owner: &PartyId,
        collateral: &CollateralRef,
    ) -> Result<bool, CustodyError> {
        let book = self.book.lock();
        if !book.known_registries.contains(&collateral.registry) {
            return Err(CustodyError::UnknownRegistry(collateral.registry.clone()));
        }
        if !book.owners.contains_key(collateral) {
            return Err(CustodyError::UnknownToken(collateral.clone()));
        }
        let for_all = book.operator_approvals.contains(&(
            collateral.registry.clone(),
            owner.clone(),
            custodian.clone(),
        ));
        let single = book.token_approvals.get(collateral) == Some(custodian);
        Ok(for_all || single)
    }

    fn transfer_custody(
        &self,
        collateral: &CollateralRef,
        from: &PartyId,
        to: &PartyId,
    ) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        if !book.known_registries.contains(&collateral.registry) {
            return Err(CustodyError::UnknownRegistry(collateral.registry.clone()));
        }
        if book.frozen.contains(collateral) {
            return Err(CustodyError::Rejected(format!("{collateral} is frozen")));
        }
        let owner = book
            .owners
            .get_mut(collateral)
            .ok_or_else(|| CustodyError::UnknownToken(collateral.clone()))?;
        if owner != from {
            return Err(CustodyError::NotOwner {
                collateral: collateral.clone(),
                party: from.clone(),
            });
        }
        *owner = to.clone();
        book.token_approvals.remove(collateral);
        tracing::trace!(%collateral, %from, %to, "collateral moved");
        Ok(())
    }

    fn owner_of(&self, collateral: &CollateralRef) -> Result<PartyId, CustodyError> {
        self.book
            .lock()
            .owners
            .get(collateral)
            .cloned()
            .ok_or_else(|| CustodyError::UnknownToken(collateral.clone()))
    }
}

// ─── Funds Vault ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct VaultBook {
    balances: HashMap<PartyId, Amount>,
    frozen: HashSet<PartyId>,
}

/// In-memory balance book.
#[derive(Debug, Default)]
pub struct InMemoryFundsVault {
    book: Mutex<VaultBook>,
}

impl InMemoryFundsVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `party`'s balance.
    pub fn credit(&self, party: &PartyId, amount: Amount) -> Result<Amount, CustodyError> {
        let mut book = self.book.lock();
        let balance = book.balances.entry(party.clone()).or_default();
        *balance = balance
            .checked_add(amount)
            .map_err(|_| CustodyError::BalanceOverflow(party.clone()))?;
        Ok(*balance)
    }

    /// Make every transfer touching `party` fail until unfrozen.
    pub fn freeze_party(&self, party: &PartyId, frozen: bool) {
        let mut book = self.book.lock();
        if frozen {
            book.frozen.insert(party.clone());
        } else {
            book.frozen.remove(party);
        }
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Result<Amount, CustodyError> {
        self.book
            .lock()
            .balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
            .map_err(|e| CustodyError::Rejected(e.to_string()))
    }
}

impl FundsVault for InMemoryFundsVault {
    fn transfer(&self, from: &PartyId, to: &PartyId, amount: Amount) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        if let Some(party) = [from, to].into_iter().find(|p| book.frozen.contains(*p)) {
            return Err(CustodyError::Rejected(format!("account {party} is frozen")));
        }
        let available = book.balances.get(from).copied().unwrap_or_default();
        let debited = available
            .checked_sub(amount)
            .map_err(|_| CustodyError::InsufficientFunds {
                party: from.clone(),
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = book
            .balances
            .get(to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .map_err(|_| CustodyError::BalanceOverflow(to.clone()))?;
        book.balances.insert(from.clone(), debited);
        book.balances.insert(to.clone(), credited);
        tracing::trace!(%from, %to, %amount, "funds moved");
        Ok(())
    }

    fn balance_of(&self, party: &PartyId) -> Amount {
        self.book
            .lock()
            .balances
            .get(party)
            .copied()
            .unwrap_or_default()
    }
}
