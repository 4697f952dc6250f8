//! Shared fixture for ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lendfi_core::{
    Amount, Clock, CollateralRef, LoanId, ManualClock, PartyId, RegistryId, Timestamp, TokenId,
};
use lendfi_custody::{CollateralRegistry, FundsVault, InMemoryCollateralRegistry, InMemoryFundsVault};
use lendfi_ledger::{LedgerConfig, LoanLedger, LoanTerms};

/// 10^18 base units.
pub const ETHER: u128 = 1_000_000_000_000_000_000;

pub const START: i64 = 1_700_000_000;

/// Thousandths of an ether.
pub fn milli_ether(milli: u128) -> Amount {
    Amount::from_units(milli * ETHER / 1_000)
}

pub fn party(name: &str) -> PartyId {
    PartyId::new(name).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Fixture {
    pub ledger: LoanLedger,
    pub registry: Arc<InMemoryCollateralRegistry>,
    pub vault: Arc<InMemoryFundsVault>,
    pub clock: Arc<ManualClock>,
    pub escrow: PartyId,
    pub lender: PartyId,
    pub borrower: PartyId,
    pub stranger: PartyId,
    pub nft: CollateralRef,
}

impl Fixture {
    /// Lender holds 1 ether, borrower 0.1 ether, stranger 1 ether.
    /// Token 1 of the collateral registry is minted to the borrower but
    /// not yet approved for the escrow.
    pub fn new() -> Self {
        init_tracing();
        let escrow = party("lendfi-escrow");
        let lender = party("user1");
        let borrower = party("user2");
        let stranger = party("user3");
        let registry_id = RegistryId::new("collateral").unwrap();
        let nft = CollateralRef::new(registry_id.clone(), TokenId(1));

        let registry = Arc::new(InMemoryCollateralRegistry::new());
        registry.register(registry_id);
        registry.mint(nft.clone(), borrower.clone()).unwrap();

        let vault = Arc::new(InMemoryFundsVault::new());
        vault.credit(&lender, milli_ether(1_000)).unwrap();
        vault.credit(&borrower, milli_ether(100)).unwrap();
        vault.credit(&stranger, milli_ether(1_000)).unwrap();

        let clock = Arc::new(ManualClock::new(Timestamp::from_epoch_secs(START).unwrap()));

        let ledger = LoanLedger::new(
            LedgerConfig::new(escrow.clone()),
            registry.clone(),
            vault.clone(),
            clock.clone(),
        )
        .unwrap();

        Self {
            ledger,
            registry,
            vault,
            clock,
            escrow,
            lender,
            borrower,
            stranger,
            nft,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn at(&self, offset_secs: i64) -> Timestamp {
        self.now().checked_add_secs(offset_secs).unwrap()
    }

    /// principal 0.5, interest 0.05, deadline now + 1000.
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            lender: self.lender.clone(),
            borrower: self.borrower.clone(),
            principal: milli_ether(500),
            interest: milli_ether(50),
            collateral: self.nft.clone(),
            deadline: self.at(1_000),
        }
    }

    pub fn submit(&self) -> LoanId {
        self.ledger.submit_loan(&self.lender, self.terms()).unwrap()
    }

    pub fn approve_escrow(&self) {
        self.registry
            .set_approval_for_all(&self.nft.registry, &self.borrower, &self.escrow, true);
    }

    /// Submitted, both sides confirmed.
    pub fn active_loan(&self) -> LoanId {
        let id = self.submit();
        self.ledger
            .confirm_lender(&self.lender, id, milli_ether(500))
            .unwrap();
        self.approve_escrow();
        self.ledger.confirm_borrower(&self.borrower, id).unwrap();
        id
    }

    pub fn past_deadline(&self) {
        self.clock.advance_secs(1_001).unwrap();
    }

    pub fn balance(&self, who: &PartyId) -> Amount {
        self.vault.balance_of(who)
    }

    pub fn nft_owner(&self) -> PartyId {
        self.registry.owner_of(&self.nft).unwrap()
    }
}
