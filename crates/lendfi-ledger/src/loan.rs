//! # Loan Record and Lifecycle States
//!
//! A [`Loan`] stores its status as the flag set agreed between the parties
//! (`lender_confirmed`, `borrower_confirmed`, `active`, `executed`,
//! `loan_paid`, `collateral_claimed`). [`Loan::state()`] derives the
//! lifecycle state from those flags so there is exactly one source of truth.
//!
//! ## States
//!
//! ```text
//!              ┌──▶ LenderConfirmed ───┐
//! Proposed ────┤                       ├──▶ Active ──▶ Repaid    (terminal)
//!              └──▶ BorrowerConfirmed ─┘        └───▶ Defaulted (terminal)
//!
//! LenderConfirmed | BorrowerConfirmed ──revoke (after deadline)──▶ Proposed
//! ```
//!
//! ## Invariants
//!
//! - `active ⇒ lender_confirmed ∧ borrower_confirmed`
//! - `executed ⇒ ¬active`
//! - `loan_paid` and `collateral_claimed` are never both set
//! - the principal sits in custody (`escrowed`) only between the lender's
//!   confirmation and activation or refund

use serde::{Deserialize, Serialize};

use lendfi_core::{Amount, CollateralRef, LoanId, PartyId, Timestamp};

// ─── Loan State ──────────────────────────────────────────────────────

/// Lifecycle state of a loan, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanState {
    /// Submitted, neither side has confirmed.
    Proposed,
    /// The lender's principal is in custody.
    LenderConfirmed,
    /// The borrower's collateral is in custody.
    BorrowerConfirmed,
    /// Principal forwarded to the borrower, collateral in custody.
    Active,
    /// Borrower repaid; collateral returned (terminal).
    Repaid,
    /// Deadline passed unpaid; lender took the collateral (terminal).
    Defaulted,
}

impl LoanState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Repaid | Self::Defaulted)
    }
}

impl std::fmt::Display for LoanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Proposed => "PROPOSED",
            Self::LenderConfirmed => "LENDER_CONFIRMED",
            Self::BorrowerConfirmed => "BORROWER_CONFIRMED",
            Self::Active => "ACTIVE",
            Self::Repaid => "REPAID",
            Self::Defaulted => "DEFAULTED",
        };
        f.write_str(s)
    }
}

/// Who holds the collateral token according to the loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollateralHolder {
    Borrower,
    Ledger,
    Lender,
}

// ─── Transition Records ──────────────────────────────────────────────

/// What happened in a recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanEventKind {
    Submitted,
    LenderConfirmed,
    BorrowerConfirmed,
    /// A confirmation completed the pair and the principal was forwarded.
    Activated,
    Repaid,
    CollateralClaimed,
    DeadlineExtended,
    LenderRevoked,
    BorrowerRevoked,
}

impl std::fmt::Display for LoanEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "loan.submitted",
            Self::LenderConfirmed => "loan.lender_confirmed",
            Self::BorrowerConfirmed => "loan.borrower_confirmed",
            Self::Activated => "loan.activated",
            Self::Repaid => "loan.repaid",
            Self::CollateralClaimed => "loan.collateral_claimed",
            Self::DeadlineExtended => "loan.deadline_extended",
            Self::LenderRevoked => "loan.lender_revoked",
            Self::BorrowerRevoked => "loan.borrower_revoked",
        };
        f.write_str(s)
    }
}

/// Record of a committed loan transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTransitionRecord {
    pub kind: LoanEventKind,
    pub from_state: LoanState,
    pub to_state: LoanState,
    /// Party whose call produced the transition.
    pub actor: PartyId,
    pub timestamp: Timestamp,
}

// ─── Terms ───────────────────────────────────────────────────────────

/// The agreement proposed at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub lender: PartyId,
    pub borrower: PartyId,
    pub principal: Amount,
    /// Fixed lump sum owed on top of principal.
    pub interest: Amount,
    pub collateral: CollateralRef,
    pub deadline: Timestamp,
}

// ─── Loan ────────────────────────────────────────────────────────────

/// A loan record. Values handed out by the ledger are snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub lender: PartyId,
    pub borrower: PartyId,
    pub principal: Amount,
    pub interest: Amount,
    pub collateral: CollateralRef,
    pub deadline: Timestamp,
    pub lender_confirmed: bool,
    pub borrower_confirmed: bool,
    pub active: bool,
    pub executed: bool,
    pub loan_paid: bool,
    pub collateral_claimed: bool,
    /// Principal currently held by the ledger's custodian for this loan.
    pub escrowed: Amount,
    pub created_at: Timestamp,
    /// Ordered log of every committed transition.
    pub transitions: Vec<LoanTransitionRecord>,
}

impl Loan {
    pub(crate) fn proposed(id: LoanId, terms: LoanTerms, created_at: Timestamp) -> Self {
        Self {
            id,
            lender: terms.lender,
            borrower: terms.borrower,
            principal: terms.principal,
            interest: terms.interest,
            collateral: terms.collateral,
            deadline: terms.deadline,
            lender_confirmed: false,
            borrower_confirmed: false,
            active: false,
            executed: false,
            loan_paid: false,
            collateral_claimed: false,
            escrowed: Amount::ZERO,
            created_at,
            transitions: Vec::new(),
        }
    }

    /// Lifecycle state derived from the flags.
    ///
    /// Only meaningful for records that pass [`Loan::check_invariants`]. A
    /// record with both confirmations but no activation never leaves the
    /// ledger; it maps to `Active` here and fails the invariant check.
    pub fn state(&self) -> LoanState {
        if self.loan_paid {
            LoanState::Repaid
        } else if self.collateral_claimed {
            LoanState::Defaulted
        } else if self.active {
            LoanState::Active
        } else {
            match (self.lender_confirmed, self.borrower_confirmed) {
                (true, false) => LoanState::LenderConfirmed,
                (false, true) => LoanState::BorrowerConfirmed,
                // Staged only; `try_activate` resolves it before commit.
                (true, true) => LoanState::Active,
                (false, false) => LoanState::Proposed,
            }
        }
    }

    /// The exact amount the borrower must repay.
    ///
    /// Submission rejects terms whose sum overflows, so this is `None` only
    /// for records constructed outside the ledger.
    pub fn repayment_amount(&self) -> Option<Amount> {
        self.principal.checked_add(self.interest).ok()
    }

    pub fn is_party(&self, party: &PartyId) -> bool {
        &self.lender == party || &self.borrower == party
    }

    /// Whether `now` is strictly past the deadline.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.deadline
    }

    pub fn collateral_holder(&self) -> CollateralHolder {
        if self.collateral_claimed {
            CollateralHolder::Lender
        } else if self.borrower_confirmed && !self.executed {
            CollateralHolder::Ledger
        } else {
            CollateralHolder::Borrower
        }
    }

    /// Check the record-level invariants, naming the first one violated.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if self.active && !(self.lender_confirmed && self.borrower_confirmed) {
            return Err("active loan is missing a confirmation");
        }
        if self.lender_confirmed && self.borrower_confirmed && !self.active && !self.executed {
            return Err("both sides confirmed but loan not activated");
        }
        if self.executed && self.active {
            return Err("executed loan is still active");
        }
        if self.loan_paid && self.collateral_claimed {
            return Err("loan both repaid and claimed");
        }
        if self.executed != (self.loan_paid || self.collateral_claimed) {
            return Err("executed flag disagrees with outcome");
        }
        let holds_principal = self.lender_confirmed && !self.active && !self.executed;
        let expected_escrow = if holds_principal {
            self.principal
        } else {
            Amount::ZERO
        };
        if self.escrowed != expected_escrow {
            return Err("escrowed principal disagrees with confirmation state");
        }
        Ok(())
    }

    pub(crate) fn record(
        &mut self,
        kind: LoanEventKind,
        from_state: LoanState,
        actor: &PartyId,
        timestamp: Timestamp,
    ) {
        self.transitions.push(LoanTransitionRecord {
            kind,
            from_state,
            to_state: self.state(),
            actor: actor.clone(),
            timestamp,
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lendfi_core::{RegistryId, TokenId};

    fn terms() -> LoanTerms {
        LoanTerms {
            lender: PartyId::new("alice").unwrap(),
            borrower: PartyId::new("bob").unwrap(),
            principal: Amount::from_units(500),
            interest: Amount::from_units(50),
            collateral: CollateralRef::new(RegistryId::new("nft").unwrap(), TokenId(1)),
            deadline: Timestamp::from_epoch_secs(2_000).unwrap(),
        }
    }

    fn proposed() -> Loan {
        Loan::proposed(LoanId(0), terms(), Timestamp::from_epoch_secs(1_000).unwrap())
    }

    #[test]
    fn test_proposed_state() {
        let loan = proposed();
        assert_eq!(loan.state(), LoanState::Proposed);
        assert!(!loan.state().is_terminal());
        assert_eq!(loan.collateral_holder(), CollateralHolder::Borrower);
        assert!(loan.check_invariants().is_ok());
    }

    #[test]
    fn test_state_derivation() {
        let mut loan = proposed();
        loan.lender_confirmed = true;
        loan.escrowed = loan.principal;
        assert_eq!(loan.state(), LoanState::LenderConfirmed);
        assert!(loan.check_invariants().is_ok());

        let mut loan = proposed();
        loan.borrower_confirmed = true;
        assert_eq!(loan.state(), LoanState::BorrowerConfirmed);
        assert_eq!(loan.collateral_holder(), CollateralHolder::Ledger);

        loan.lender_confirmed = true;
        loan.active = true;
        assert_eq!(loan.state(), LoanState::Active);
        assert!(loan.check_invariants().is_ok());

        loan.active = false;
        loan.executed = true;
        loan.loan_paid = true;
        assert_eq!(loan.state(), LoanState::Repaid);
        assert!(loan.state().is_terminal());
        assert_eq!(loan.collateral_holder(), CollateralHolder::Borrower);
        assert!(loan.check_invariants().is_ok());
    }

    #[test]
    fn test_defaulted_collateral_with_lender() {
        let mut loan = proposed();
        loan.lender_confirmed = true;
        loan.borrower_confirmed = true;
        loan.executed = true;
        loan.collateral_claimed = true;
        assert_eq!(loan.state(), LoanState::Defaulted);
        assert_eq!(loan.collateral_holder(), CollateralHolder::Lender);
        assert!(loan.check_invariants().is_ok());
    }

    #[test]
    fn test_invariant_violations_detected() {
        let mut loan = proposed();
        loan.active = true;
        assert!(loan.check_invariants().is_err());

        let mut loan = proposed();
        loan.loan_paid = true;
        loan.collateral_claimed = true;
        loan.executed = true;
        assert!(loan.check_invariants().is_err());

        let mut loan = proposed();
        loan.lender_confirmed = true;
        assert_eq!(
            loan.check_invariants(),
            Err("escrowed principal disagrees with confirmation state")
        );
    }

    #[test]
    fn test_unactivated_pair_fails_invariants() {
        let mut loan = proposed();
        loan.lender_confirmed = true;
        loan.borrower_confirmed = true;
        loan.escrowed = loan.principal;
        assert_eq!(
            loan.check_invariants(),
            Err("both sides confirmed but loan not activated")
        );

        let json = serde_json::to_string(&loan).unwrap();
        let parsed: Loan = serde_json::from_str(&json).unwrap();
        assert!(parsed.check_invariants().is_err());
    }

    #[test]
    fn test_repayment_amount() {
        assert_eq!(proposed().repayment_amount(), Some(Amount::from_units(550)));
    }

    #[test]
    fn test_expiry_is_strict() {
        let loan = proposed();
        assert!(!loan.is_expired(Timestamp::from_epoch_secs(2_000).unwrap()));
        assert!(loan.is_expired(Timestamp::from_epoch_secs(2_001).unwrap()));
    }

    #[test]
    fn test_record_captures_states() {
        let mut loan = proposed();
        let alice = loan.lender.clone();
        let from = loan.state();
        loan.lender_confirmed = true;
        loan.escrowed = loan.principal;
        loan.record(
            LoanEventKind::LenderConfirmed,
            from,
            &alice,
            Timestamp::from_epoch_secs(1_500).unwrap(),
        );
        let record = &loan.transitions[0];
        assert_eq!(record.from_state, LoanState::Proposed);
        assert_eq!(record.to_state, LoanState::LenderConfirmed);
        assert_eq!(record.actor, alice);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(LoanState::LenderConfirmed.to_string(), "LENDER_CONFIRMED");
        assert_eq!(LoanState::Defaulted.to_string(), "DEFAULTED");
        assert_eq!(LoanEventKind::Activated.to_string(), "loan.activated");
    }

    #[test]
    fn test_loan_serialization() {
        let loan = proposed();
        let json = serde_json::to_string(&loan).unwrap();
        let parsed: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, loan);
    }
}
