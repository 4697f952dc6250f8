//! # lendfi-custody — Custody Boundary
//!
//! The escrow never owns the collateral registry or the parties' funds. It
//! reaches both through the narrow traits defined here:
//!
//! - [`CollateralRegistry`]: "is custodian C approved to move token T for
//!   owner O" and "move token T from A to B".
//! - [`FundsVault`]: "move amount N from A to B".
//!
//! Implementations must fail loudly. A transfer that cannot complete returns
//! a [`CustodyError`]; it never reports success without moving the asset.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryCollateralRegistry`] and [`memory::InMemoryFundsVault`]
//!   back tests and embedders that keep custody in process.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryCollateralRegistry, InMemoryFundsVault};
pub use traits::{CollateralRegistry, CustodyError, FundsVault};
