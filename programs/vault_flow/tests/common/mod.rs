#![allow(dead_code)]

use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use vault_flow::runtime::{Clock, HashRandom, ManualClock};
use vault_flow::*;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
}

/// Everything a workflow talks to, wired to a manual clock and the mock ledger.
pub struct Harness {
    pub config: FlowConfig,
    pub clock: Rc<ManualClock>,
    pub wallet: Rc<MockWallet>,
    pub catalog: VaultCatalog,
    pub ledger: Rc<MockLedger>,
    pub notifications: Rc<NotificationLog>,
    pub navigation: Rc<NavigationLog>,
    pub events: Rc<EventBus>,
}

impl Harness {
    /// Empty book, connected wallet holding `balance`.
    pub fn new(config: FlowConfig, balance: f64) -> Self {
        Self::build(config, Rc::new(MockWallet::connected(balance)), false)
    }

    /// Book preloaded with the canned positions.
    pub fn seeded(config: FlowConfig, balance: f64) -> Self {
        Self::build(config, Rc::new(MockWallet::connected(balance)), true)
    }

    pub fn with_wallet(config: FlowConfig, wallet: MockWallet) -> Self {
        Self::build(config, Rc::new(wallet), false)
    }

    fn build(config: FlowConfig, wallet: Rc<MockWallet>, seeded: bool) -> Self {
        let clock = Rc::new(ManualClock::new(t0()));
        let catalog = VaultCatalog::mock(&HashRandom::default(), t0()).unwrap();
        let random = Rc::new(HashRandom::new(b"integration"));
        let ledger = if seeded {
            MockLedger::seeded(
                config.clone(),
                catalog.clone(),
                wallet.clone(),
                clock.clone(),
                random,
            )
        } else {
            MockLedger::new(
                config.clone(),
                catalog.clone(),
                wallet.clone(),
                clock.clone(),
                random,
            )
        }
        .unwrap();

        Self {
            config,
            clock,
            wallet,
            catalog,
            ledger: Rc::new(ledger),
            notifications: Rc::new(NotificationLog::default()),
            navigation: Rc::new(NavigationLog::default()),
            events: Rc::new(EventBus::new()),
        }
    }

    pub fn ctx(&self) -> FlowContext {
        FlowContext {
            config: self.config.clone(),
            clock: self.clock.clone(),
            wallet: self.wallet.clone(),
            ledger: self.ledger.clone(),
            notifier: self.notifications.clone(),
            navigator: self.navigation.clone(),
            events: self.events.clone(),
        }
    }

    pub fn deposit_flow(&self, vault_id: &str) -> DepositWorkflow {
        open_deposit(self.ctx(), &self.catalog, vault_id).unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Moves the clock past the longest commit latency.
    pub fn wait_for_commit(&self) {
        self.clock.advance_ms(self.config.commit_latency_max_ms);
    }

    /// Resolves a read call by waiting out its latency.
    pub fn read<T: 'static>(&self, mut call: LedgerCall<T>) -> T {
        self.clock.set(call.ready_at());
        call.poll(self.clock.now()).unwrap()
    }

    pub fn positions(&self) -> Vec<UserInvestment> {
        self.read(self.ledger.list_positions())
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.read(self.ledger.list_transactions())
    }

    pub fn balance(&self) -> f64 {
        self.wallet.balance().primary
    }

    /// Counts `deposit-success` and `withdraw-success` deliveries.
    pub fn record_events(&self) -> Rc<std::cell::RefCell<Vec<DomainEvent>>> {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        self.events.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        seen
    }
}

pub fn always_succeed() -> FlowConfig {
    FlowConfig::default().with_success_rate(1.0)
}

pub fn always_fail() -> FlowConfig {
    FlowConfig::default().with_success_rate(0.0)
}

pub fn assert_flow_error(err: &anchor_lang::error::Error, expected: FlowError) {
    assert!(expected.is(err), "expected {expected:?}, got {err:?}");
}
