//! # Loan Ledger
//!
//! Owns every loan record and drives every custody movement.
//!
//! ## Storage
//!
//! Loans live in an arena indexed by [`LoanId`]. The arena lock is held only
//! to allocate a slot or to look one up; each slot carries its own mutex,
//! held for the whole of an operation on that loan: read, authorization,
//! custody settlement, commit. Operations on different loans never contend
//! on anything but the brief arena read.
//!
//! ## Commit discipline
//!
//! Every mutating operation runs through `transact`: the operation stages
//! its changes on a copy of the record and lists its custody legs in a
//! [`Settlement`]. The copy replaces the stored record only after every leg
//! has succeeded. A rejected call or a failed transfer leaves the record
//! untouched.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use lendfi_core::{Amount, Clock, LoanId, PartyId, Timestamp};
use lendfi_custody::{CollateralRegistry, FundsVault};

use crate::config::LedgerConfig;
use crate::error::{AmountContext, ConfigError, LoanError, Role};
use crate::loan::{Loan, LoanEventKind, LoanState, LoanTerms};
use crate::settlement::{CustodyLeg, Settlement};

/// The collateralized loan escrow.
pub struct LoanLedger {
    config: LedgerConfig,
    registry: Arc<dyn CollateralRegistry>,
    vault: Arc<dyn FundsVault>,
    clock: Arc<dyn Clock>,
    loans: RwLock<Vec<Arc<Mutex<Loan>>>>,
}

impl LoanLedger {
    /// Create an empty ledger. Fails if `config` does not validate.
    pub fn new(
        config: LedgerConfig,
        registry: Arc<dyn CollateralRegistry>,
        vault: Arc<dyn FundsVault>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            vault,
            clock,
            loans: RwLock::new(Vec::new()),
        })
    }

    /// The account holding deposits and collateral in custody.
    pub fn custodian(&self) -> &PartyId {
        &self.config.custodian
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Propose a loan. No custody moves until the parties confirm.
    pub fn submit_loan(&self, caller: &PartyId, terms: LoanTerms) -> Result<LoanId, LoanError> {
        let now = self.clock.now();
        if let Err(err) = self.validate_terms(&terms, now) {
            tracing::debug!(actor = %caller, error = %err, "loan submission rejected");
            return Err(err);
        }

        let mut loans = self.loans.write();
        let id = LoanId(loans.len() as u64);
        let mut loan = Loan::proposed(id, terms, now);
        loan.record(LoanEventKind::Submitted, LoanState::Proposed, caller, now);
        tracing::info!(
            loan_id = %id,
            actor = %caller,
            lender = %loan.lender,
            borrower = %loan.borrower,
            principal = %loan.principal,
            interest = %loan.interest,
            collateral = %loan.collateral,
            deadline = %loan.deadline,
            "loan submitted"
        );
        loans.push(Arc::new(Mutex::new(loan)));
        Ok(id)
    }

    fn validate_terms(&self, terms: &LoanTerms, now: Timestamp) -> Result<(), LoanError> {
        let earliest = now
            .checked_add_secs(self.config.min_deadline_lead_secs)
            .map_err(|_| LoanError::InvalidDeadline {
                deadline: terms.deadline,
                now,
            })?;
        if terms.deadline <= earliest {
            return Err(LoanError::InvalidDeadline {
                deadline: terms.deadline,
                now,
            });
        }
        if terms.lender == terms.borrower {
            return Err(LoanError::SelfLoan);
        }
        // Every loan's principal and collateral sit under the one custodian
        // account, so it can never be a party itself.
        if &terms.lender == self.custodian() || &terms.borrower == self.custodian() {
            return Err(LoanError::CustodianParty);
        }
        if terms.principal.is_zero() {
            return Err(LoanError::InvalidAmount(
                "principal must be greater than zero".to_string(),
            ));
        }
        terms
            .principal
            .checked_add(terms.interest)
            .map_err(|e| LoanError::InvalidAmount(e.to_string()))?;
        Ok(())
    }

    // ── Confirmation ─────────────────────────────────────────────────

    /// Lender deposits exactly the principal into custody.
    ///
    /// Activates the loan if the borrower has already confirmed.
    pub fn confirm_lender(
        &self,
        caller: &PartyId,
        id: LoanId,
        deposited: Amount,
    ) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, settlement, _now| {
            require_role(loan, caller, Role::Lender)?;
            if loan.executed {
                return Err(LoanError::AlreadyExecuted);
            }
            if loan.lender_confirmed {
                return Err(LoanError::AlreadyConfirmed { role: Role::Lender });
            }
            if deposited != loan.principal {
                return Err(LoanError::WrongAmount {
                    context: AmountContext::Deposit,
                    expected: loan.principal,
                    actual: deposited,
                });
            }
            settlement.push(CustodyLeg::Funds {
                from: loan.lender.clone(),
                to: self.custodian().clone(),
                amount: loan.principal,
            });
            loan.lender_confirmed = true;
            loan.escrowed = loan.principal;
            Ok(Some(
                self.try_activate(loan, settlement)
                    .unwrap_or(LoanEventKind::LenderConfirmed),
            ))
        })
    }

    /// Borrower moves the collateral into custody.
    ///
    /// The registry must report the custodian as approved for the token.
    /// Activates the loan if the lender has already confirmed.
    pub fn confirm_borrower(&self, caller: &PartyId, id: LoanId) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, settlement, _now| {
            require_role(loan, caller, Role::Borrower)?;
            if loan.executed {
                return Err(LoanError::AlreadyExecuted);
            }
            if loan.borrower_confirmed {
                return Err(LoanError::AlreadyConfirmed {
                    role: Role::Borrower,
                });
            }
            let approved = self.registry.is_approved_for_transfer(
                self.custodian(),
                &loan.borrower,
                &loan.collateral,
            )?;
            if !approved {
                return Err(LoanError::CollateralNotApproved);
            }
            settlement.push(CustodyLeg::Collateral {
                collateral: loan.collateral.clone(),
                from: loan.borrower.clone(),
                to: self.custodian().clone(),
            });
            loan.borrower_confirmed = true;
            Ok(Some(
                self.try_activate(loan, settlement)
                    .unwrap_or(LoanEventKind::BorrowerConfirmed),
            ))
        })
    }

    /// Shared tail of both confirmations: once both sides are in custody,
    /// forward the principal to the borrower.
    fn try_activate(&self, loan: &mut Loan, settlement: &mut Settlement) -> Option<LoanEventKind> {
        if !(loan.lender_confirmed && loan.borrower_confirmed) || loan.active || loan.executed {
            return None;
        }
        settlement.push(CustodyLeg::Funds {
            from: self.custodian().clone(),
            to: loan.borrower.clone(),
            amount: loan.escrowed,
        });
        loan.escrowed = Amount::ZERO;
        loan.active = true;
        Some(LoanEventKind::Activated)
    }

    // ── Outcomes ─────────────────────────────────────────────────────

    /// Borrower repays exactly principal plus interest and gets the
    /// collateral back.
    pub fn payback_loan(
        &self,
        caller: &PartyId,
        id: LoanId,
        repaid: Amount,
    ) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, settlement, _now| {
            require_role(loan, caller, Role::Borrower)?;
            if !loan.active {
                return Err(LoanError::NotActive);
            }
            let owed = loan.repayment_amount().ok_or_else(|| {
                LoanError::InvalidAmount("principal plus interest overflows".to_string())
            })?;
            if repaid != owed {
                return Err(LoanError::WrongAmount {
                    context: AmountContext::Repayment,
                    expected: owed,
                    actual: repaid,
                });
            }
            settlement.push(CustodyLeg::Funds {
                from: loan.borrower.clone(),
                to: loan.lender.clone(),
                amount: repaid,
            });
            settlement.push(CustodyLeg::Collateral {
                collateral: loan.collateral.clone(),
                from: self.custodian().clone(),
                to: loan.borrower.clone(),
            });
            loan.active = false;
            loan.executed = true;
            loan.loan_paid = true;
            Ok(Some(LoanEventKind::Repaid))
        })
    }

    /// Lender takes the collateral of an active loan past its deadline.
    pub fn claim_collateral(&self, caller: &PartyId, id: LoanId) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, settlement, now| {
            require_role(loan, caller, Role::Lender)?;
            if !loan.active {
                return Err(LoanError::NotActive);
            }
            if !loan.is_expired(now) {
                return Err(LoanError::NotExpired {
                    deadline: loan.deadline,
                    now,
                });
            }
            settlement.push(CustodyLeg::Collateral {
                collateral: loan.collateral.clone(),
                from: self.custodian().clone(),
                to: loan.lender.clone(),
            });
            loan.active = false;
            loan.executed = true;
            loan.collateral_claimed = true;
            Ok(Some(LoanEventKind::CollateralClaimed))
        })
    }

    // ── Amendments ───────────────────────────────────────────────────

    /// Lender moves the deadline later. Never earlier, never after execution.
    pub fn extend_deadline(
        &self,
        caller: &PartyId,
        id: LoanId,
        new_deadline: Timestamp,
    ) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, _settlement, _now| {
            require_role(loan, caller, Role::Lender)?;
            if loan.executed {
                return Err(LoanError::AlreadyExecuted);
            }
            if new_deadline <= loan.deadline {
                return Err(LoanError::CannotShorten {
                    current: loan.deadline,
                    requested: new_deadline,
                });
            }
            loan.deadline = new_deadline;
            Ok(Some(LoanEventKind::DeadlineExtended))
        })
    }

    /// After the deadline, a party whose side confirmed on a loan that never
    /// activated takes its deposit back. A caller whose side never confirmed
    /// gets the unchanged record.
    pub fn revoke_confirmation(&self, caller: &PartyId, id: LoanId) -> Result<Loan, LoanError> {
        self.transact(id, caller, |loan, settlement, now| {
            require_role(loan, caller, Role::Party)?;
            if !loan.is_expired(now) {
                return Err(LoanError::NotExpired {
                    deadline: loan.deadline,
                    now,
                });
            }
            if loan.active {
                return Err(LoanError::AlreadyActive);
            }
            if loan.executed {
                return Err(LoanError::AlreadyExecuted);
            }
            if caller == &loan.lender && loan.lender_confirmed {
                settlement.push(CustodyLeg::Funds {
                    from: self.custodian().clone(),
                    to: loan.lender.clone(),
                    amount: loan.escrowed,
                });
                loan.escrowed = Amount::ZERO;
                loan.lender_confirmed = false;
                return Ok(Some(LoanEventKind::LenderRevoked));
            }
            if caller == &loan.borrower && loan.borrower_confirmed {
                settlement.push(CustodyLeg::Collateral {
                    collateral: loan.collateral.clone(),
                    from: self.custodian().clone(),
                    to: loan.borrower.clone(),
                });
                loan.borrower_confirmed = false;
                return Ok(Some(LoanEventKind::BorrowerRevoked));
            }
            Ok(None)
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Snapshot of a loan record.
    pub fn get_loan(&self, id: LoanId) -> Result<Loan, LoanError> {
        Ok(self.slot(id)?.lock().clone())
    }

    pub fn state_of(&self, id: LoanId) -> Result<LoanState, LoanError> {
        Ok(self.slot(id)?.lock().state())
    }

    /// Number of loans ever submitted. Also the next id to be assigned.
    pub fn loan_count(&self) -> u64 {
        self.loans.read().len() as u64
    }

    /// Every loan where `party` is lender or borrower, in id order.
    pub fn loans_for(&self, party: &PartyId) -> Vec<Loan> {
        let slots: Vec<Arc<Mutex<Loan>>> = self.loans.read().clone();
        slots
            .iter()
            .map(|slot| slot.lock().clone())
            .filter(|loan| loan.is_party(party))
            .collect()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn slot(&self, id: LoanId) -> Result<Arc<Mutex<Loan>>, LoanError> {
        let loans = self.loans.read();
        id.index()
            .and_then(|i| loans.get(i))
            .cloned()
            .ok_or(LoanError::NotFound(id))
    }

    /// Run one operation on one loan as an indivisible unit.
    ///
    /// `stage` validates and mutates a copy of the record and pushes custody
    /// legs. Returning `Ok(None)` means there is nothing to do, and the
    /// stored record is returned as-is.
    fn transact<F>(&self, id: LoanId, caller: &PartyId, stage: F) -> Result<Loan, LoanError>
    where
        F: FnOnce(&mut Loan, &mut Settlement, Timestamp) -> Result<Option<LoanEventKind>, LoanError>,
    {
        let slot = self.slot(id)?;
        let mut loan = slot.lock();
        let now = self.clock.now();
        let from = loan.state();

        let mut staged = loan.clone();
        let mut settlement = Settlement::new();
        let kind = match stage(&mut staged, &mut settlement, now) {
            Ok(Some(kind)) => kind,
            Ok(None) => {
                tracing::debug!(loan_id = %id, actor = %caller, state = %from, "nothing to revoke");
                return Ok(loan.clone());
            }
            Err(err) => {
                tracing::debug!(loan_id = %id, actor = %caller, state = %from, error = %err, "loan operation rejected");
                return Err(err);
            }
        };

        if let Err(err) = settlement.execute(self.registry.as_ref(), self.vault.as_ref()) {
            tracing::warn!(loan_id = %id, actor = %caller, %kind, error = %err, "custody settlement failed");
            return Err(err.into());
        }

        staged.record(kind, from, caller, now);
        *loan = staged;
        tracing::info!(
            loan_id = %id,
            actor = %caller,
            %kind,
            from = %from,
            to = %loan.state(),
            legs = settlement.legs().len(),
            "loan transition committed"
        );
        Ok(loan.clone())
    }
}

fn require_role(loan: &Loan, caller: &PartyId, role: Role) -> Result<(), LoanError> {
    let allowed = match role {
        Role::Lender => caller == &loan.lender,
        Role::Borrower => caller == &loan.borrower,
        Role::Party => loan.is_party(caller),
    };
    if allowed {
        Ok(())
    } else {
        Err(LoanError::Unauthorized { required: role })
    }
}

impl std::fmt::Debug for LoanLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanLedger")
            .field("custodian", &self.config.custodian)
            .field("loan_count", &self.loan_count())
            .finish()
    }
}
