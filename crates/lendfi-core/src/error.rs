//! # Error Types
//!
//! Errors raised by the foundational types. Ledger and custody errors live
//! in their own crates and wrap these where needed.

use thiserror::Error;

/// Error produced by `lendfi-core` constructors and arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A timestamp string or epoch value could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Amount arithmetic left the representable range.
    #[error("amount overflow: {0}")]
    AmountOverflow(String),

    /// An identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
