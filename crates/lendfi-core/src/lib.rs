//! # lendfi-core — Foundational Types for the LendFi Escrow
//!
//! Defines the type-system primitives shared by the custody boundary and the
//! loan ledger. Every other crate in the workspace depends on `lendfi-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `PartyId`, `LoanId`,
//!    `TokenId`, `RegistryId`. No bare strings or integers for identifiers,
//!    so a token id can never be passed where a loan id is expected.
//!
//! 2. **Integer amounts only.** `Amount` counts the smallest indivisible unit
//!    and only offers checked arithmetic. There are no floats anywhere in the
//!    value path.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC, truncated to seconds.
//!    Deadlines compare against a `Clock`, never against ambient time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lendfi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use error::CoreError;
pub use identity::{CollateralRef, LoanId, PartyId, RegistryId, TokenId};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
