//! # Ledger Errors
//!
//! Every failed ledger call returns one of these and leaves the loan record
//! exactly as it was. Display strings are the human-readable reason for the
//! violated condition.

use thiserror::Error;

use lendfi_core::{Amount, LoanId, Timestamp};
use lendfi_custody::CustodyError;

/// The role an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Lender,
    Borrower,
    /// Either the lender or the borrower.
    Party,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Lender => "lender",
            Self::Borrower => "borrower",
            Self::Party => "lender or borrower",
        };
        f.write_str(s)
    }
}

/// Which value movement carried the wrong amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountContext {
    /// Lender's principal deposit.
    Deposit,
    /// Borrower's repayment of principal plus interest.
    Repayment,
}

impl std::fmt::Display for AmountContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => f.write_str("Please send the amount you agreed to loaning out"),
            Self::Repayment => f.write_str("Please pay back the exact amount you owe"),
        }
    }
}

/// Errors returned by [`LoanLedger`](crate::LoanLedger) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("Deadline can not be in the past")]
    InvalidDeadline { deadline: Timestamp, now: Timestamp },

    #[error("The lender and borrower can not be the same")]
    SelfLoan,

    #[error("The escrow account can not be a party to a loan")]
    CustodianParty,

    #[error("Invalid loan amount: {0}")]
    InvalidAmount(String),

    #[error("You are not the {required} of this loan")]
    Unauthorized { required: Role },

    #[error("{context}")]
    WrongAmount {
        context: AmountContext,
        expected: Amount,
        actual: Amount,
    },

    #[error("The {role} has already confirmed this loan")]
    AlreadyConfirmed { role: Role },

    #[error("Token is not approved for this contract")]
    CollateralNotApproved,

    #[error("Loan is not active")]
    NotActive,

    #[error("Deadline has not passed yet")]
    NotExpired { deadline: Timestamp, now: Timestamp },

    #[error("Loan is already active")]
    AlreadyActive,

    #[error("Loan has already been executed")]
    AlreadyExecuted,

    #[error("Deadline can only be extended")]
    CannotShorten {
        current: Timestamp,
        requested: Timestamp,
    },

    #[error("Loan {0} does not exist")]
    NotFound(LoanId),

    #[error("Custody transfer failed: {0}")]
    CustodyTransferFailed(#[from] CustodyError),
}

/// Fieldless discriminant of [`LoanError`], for matching on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanErrorKind {
    InvalidDeadline,
    SelfLoan,
    CustodianParty,
    InvalidAmount,
    Unauthorized,
    WrongAmount,
    AlreadyConfirmed,
    CollateralNotApproved,
    NotActive,
    NotExpired,
    AlreadyActive,
    AlreadyExecuted,
    CannotShorten,
    NotFound,
    CustodyTransferFailed,
}

impl LoanError {
    pub fn kind(&self) -> LoanErrorKind {
        match self {
            Self::InvalidDeadline { .. } => LoanErrorKind::InvalidDeadline,
            Self::SelfLoan => LoanErrorKind::SelfLoan,
            Self::CustodianParty => LoanErrorKind::CustodianParty,
            Self::InvalidAmount(_) => LoanErrorKind::InvalidAmount,
            Self::Unauthorized { .. } => LoanErrorKind::Unauthorized,
            Self::WrongAmount { .. } => LoanErrorKind::WrongAmount,
            Self::AlreadyConfirmed { .. } => LoanErrorKind::AlreadyConfirmed,
            Self::CollateralNotApproved => LoanErrorKind::CollateralNotApproved,
            Self::NotActive => LoanErrorKind::NotActive,
            Self::NotExpired { .. } => LoanErrorKind::NotExpired,
            Self::AlreadyActive => LoanErrorKind::AlreadyActive,
            Self::AlreadyExecuted => LoanErrorKind::AlreadyExecuted,
            Self::CannotShorten { .. } => LoanErrorKind::CannotShorten,
            Self::NotFound(_) => LoanErrorKind::NotFound,
            Self::CustodyTransferFailed(_) => LoanErrorKind::CustodyTransferFailed,
        }
    }
}

/// Configuration could not be loaded or failed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            LoanError::SelfLoan.to_string(),
            "The lender and borrower can not be the same"
        );
        assert_eq!(
            LoanError::Unauthorized {
                required: Role::Lender
            }
            .to_string(),
            "You are not the lender of this loan"
        );
        assert_eq!(
            LoanError::Unauthorized {
                required: Role::Borrower
            }
            .to_string(),
            "You are not the borrower of this loan"
        );
        assert_eq!(
            LoanError::CollateralNotApproved.to_string(),
            "Token is not approved for this contract"
        );
    }

    #[test]
    fn test_wrong_amount_reason_follows_context() {
        let deposit = LoanError::WrongAmount {
            context: AmountContext::Deposit,
            expected: Amount::from_units(500),
            actual: Amount::from_units(250),
        };
        assert_eq!(
            deposit.to_string(),
            "Please send the amount you agreed to loaning out"
        );
        let repayment = LoanError::WrongAmount {
            context: AmountContext::Repayment,
            expected: Amount::from_units(550),
            actual: Amount::from_units(50),
        };
        assert_eq!(
            repayment.to_string(),
            "Please pay back the exact amount you owe"
        );
    }

    #[test]
    fn test_custody_error_wraps() {
        let err: LoanError = CustodyError::Rejected("frozen".to_string()).into();
        assert_eq!(err.kind(), LoanErrorKind::CustodyTransferFailed);
        assert_eq!(
            err.to_string(),
            "Custody transfer failed: transfer rejected: frozen"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(LoanError::NotActive.kind(), LoanErrorKind::NotActive);
        assert_eq!(
            LoanError::NotFound(LoanId(3)).kind(),
            LoanErrorKind::NotFound
        );
    }
}
