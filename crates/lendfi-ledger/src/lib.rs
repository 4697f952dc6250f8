//! # lendfi-ledger — Loan Ledger and Lifecycle State Machine
//!
//! A collateralized peer-to-peer loan escrow. A lender and a borrower agree
//! on a principal, a lump-sum interest, one non-fungible collateral token and
//! a deadline. The ledger holds the lender's principal and the borrower's
//! collateral until the loan is repaid or defaults.
//!
//! ## Lifecycle
//!
//! - **Submission** (`submit_loan`): records the terms. Nothing moves.
//! - **Confirmation** (`confirm_lender`, `confirm_borrower`): either side may
//!   go first. The confirmation that completes the pair activates the loan
//!   and forwards the principal to the borrower.
//! - **Repayment** (`payback_loan`): exactly principal plus interest goes to
//!   the lender, the collateral goes back to the borrower.
//! - **Default** (`claim_collateral`): past the deadline, the lender takes
//!   the collateral of an unpaid active loan.
//! - **Revocation** (`revoke_confirmation`): past the deadline, a side that
//!   confirmed a loan that never activated takes its deposit back.
//! - **Extension** (`extend_deadline`): the lender may push the deadline
//!   later until the loan is executed.
//!
//! ## Custody guarantees
//!
//! Each operation on a loan is atomic: the checks, the custody transfers and
//! the record update happen under that loan's lock, and the record changes
//! only if every transfer succeeded (see [`settlement`]). Funds and
//! collateral are never duplicated or released to the wrong party.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lendfi_core::{Amount, CollateralRef, ManualClock, PartyId, RegistryId, Timestamp, TokenId};
//! use lendfi_custody::{InMemoryCollateralRegistry, InMemoryFundsVault};
//! use lendfi_ledger::{LedgerConfig, LoanLedger, LoanState, LoanTerms};
//!
//! let escrow = PartyId::new("escrow").unwrap();
//! let alice = PartyId::new("alice").unwrap();
//! let bob = PartyId::new("bob").unwrap();
//! let nft = CollateralRef::new(RegistryId::new("collateral").unwrap(), TokenId(1));
//!
//! let registry = Arc::new(InMemoryCollateralRegistry::new());
//! registry.register(nft.registry.clone());
//! registry.mint(nft.clone(), bob.clone()).unwrap();
//! registry.set_approval_for_all(&nft.registry, &bob, &escrow, true);
//!
//! let vault = Arc::new(InMemoryFundsVault::new());
//! vault.credit(&alice, Amount::from_units(500)).unwrap();
//! vault.credit(&bob, Amount::from_units(50)).unwrap();
//!
//! let clock = Arc::new(ManualClock::new(Timestamp::from_epoch_secs(1_000).unwrap()));
//! let ledger = LoanLedger::new(LedgerConfig::new(escrow), registry, vault, clock).unwrap();
//!
//! let id = ledger
//!     .submit_loan(
//!         &alice,
//!         LoanTerms {
//!             lender: alice.clone(),
//!             borrower: bob.clone(),
//!             principal: Amount::from_units(500),
//!             interest: Amount::from_units(50),
//!             collateral: nft,
//!             deadline: Timestamp::from_epoch_secs(2_000).unwrap(),
//!         },
//!     )
//!     .unwrap();
//!
//! ledger.confirm_lender(&alice, id, Amount::from_units(500)).unwrap();
//! let loan = ledger.confirm_borrower(&bob, id).unwrap();
//! assert_eq!(loan.state(), LoanState::Active);
//!
//! let loan = ledger.payback_loan(&bob, id, Amount::from_units(550)).unwrap();
//! assert_eq!(loan.state(), LoanState::Repaid);
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod settlement;

pub use config::LedgerConfig;
pub use error::{AmountContext, ConfigError, LoanError, LoanErrorKind, Role};
pub use ledger::LoanLedger;
pub use loan::{
    CollateralHolder, Loan, LoanEventKind, LoanState, LoanTerms, LoanTransitionRecord,
};
pub use settlement::{CustodyLeg, Settlement};
