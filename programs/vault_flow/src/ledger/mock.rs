//! In-process ledger with simulated latency and failures.
//!
//! Successful commits settle against the in-memory book: the wallet is
//! debited or credited, the position is created, topped up, drawn down or
//! closed, and a `completed` transaction is appended. A simulated failure
//! appends a `failed` transaction and changes nothing else. So does a
//! rejection once the vault or position is known, such as a debit the wallet
//! can no longer cover.

use std::cell::RefCell;
use std::rc::Rc;

use anchor_lang::prelude::{error, msg, require};
use anchor_lang::Result;
use borsh_derive::BorshSerialize;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::catalog::VaultCatalog;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::ledger::{seed, Ledger, LedgerCall, LedgerReceipt};
use crate::projection;
use crate::runtime::{after_ms, Clock, RandomSource};
use crate::state::{
    TransactionKind, TransactionRecord, TransactionStatus, UserInvestment, Vault,
};
use crate::wallet::MockWallet;

/// Values below this are treated as rounding noise when comparing amounts.
const AMOUNT_EPSILON: f64 = 1e-9;

/// Hashed to derive a transaction id.
#[derive(BorshSerialize)]
struct TxSeed {
    kind: u8,
    subject: String,
    amount: f64,
    nonce: u64,
    timestamp: i64,
}

#[derive(Debug, Default)]
struct Book {
    catalog: VaultCatalog,
    positions: IndexMap<String, UserInvestment>,
    transactions: Vec<TransactionRecord>,
    nonce: u64,
}

impl Book {
    fn next_tx_id(
        &mut self,
        kind: TransactionKind,
        subject: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let seed = TxSeed {
            kind: kind as u8,
            subject: subject.to_string(),
            amount,
            nonce: self.nonce,
            timestamp: now.timestamp_millis(),
        };
        let bytes = borsh::to_vec(&seed).map_err(|_| error!(FlowError::EncodingFailed))?;
        self.nonce = self.nonce.saturating_add(1);
        Ok(format!("tx_{}", &blake3::hash(&bytes).to_hex()[..16]))
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        id: &str,
        kind: TransactionKind,
        amount: f64,
        vault_id: &str,
        vault_name: &str,
        now: DateTime<Utc>,
        status: TransactionStatus,
    ) {
        self.transactions.push(TransactionRecord {
            id: id.to_string(),
            kind,
            amount,
            vault_id: vault_id.to_string(),
            vault_name: vault_name.to_string(),
            timestamp: now,
            status,
        });
    }
}

pub struct MockLedger {
    book: Rc<RefCell<Book>>,
    wallet: Rc<MockWallet>,
    clock: Rc<dyn Clock>,
    random: Rc<dyn RandomSource>,
    config: FlowConfig,
}

impl MockLedger {
    /// Empty book over `catalog`.
    pub fn new(
        config: FlowConfig,
        catalog: VaultCatalog,
        wallet: Rc<MockWallet>,
        clock: Rc<dyn Clock>,
        random: Rc<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        let book = Book {
            catalog,
            ..Book::default()
        };
        Ok(Self {
            book: Rc::new(RefCell::new(book)),
            wallet,
            clock,
            random,
            config,
        })
    }

    /// Book preloaded with the canned positions and history.
    pub fn seeded(
        config: FlowConfig,
        catalog: VaultCatalog,
        wallet: Rc<MockWallet>,
        clock: Rc<dyn Clock>,
        random: Rc<dyn RandomSource>,
    ) -> Result<Self> {
        let ledger = Self::new(config, catalog, wallet, clock, random)?;
        {
            let now = ledger.clock.now();
            let mut book = ledger.book.borrow_mut();
            let positions = seed::positions(&book.catalog, now);
            book.transactions = seed::transactions(&book.catalog, &positions, now);
            book.positions = positions.into_iter().map(|p| (p.id.clone(), p)).collect();
            msg!(
                "Mock ledger seeded with {} positions and {} transactions",
                book.positions.len(),
                book.transactions.len()
            );
        }
        Ok(ledger)
    }

    pub fn wallet(&self) -> &Rc<MockWallet> {
        &self.wallet
    }

    /// Position as currently stored, without latency or accrual.
    pub fn position(&self, position_id: &str) -> Option<UserInvestment> {
        self.book.borrow().positions.get(position_id).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.book.borrow().transactions.len()
    }

    fn read_ready_at(&self) -> DateTime<Utc> {
        after_ms(self.clock.now(), self.config.read_latency_ms)
    }

    fn commit_ready_at(&self) -> DateTime<Utc> {
        let latency = self.random.range_u64(
            self.config.commit_latency_min_ms,
            self.config.commit_latency_max_ms,
        );
        after_ms(self.clock.now(), latency)
    }
}

/// Settles a deposit. Once the vault is known every outcome is recorded:
/// a rejection after that point leaves a `failed` transaction behind.
fn settle_deposit(
    book: &RefCell<Book>,
    wallet: &MockWallet,
    now: DateTime<Utc>,
    vault_id: &str,
    amount: f64,
    lockup_days: u32,
    succeed: bool,
) -> Result<LedgerReceipt> {
    require!(amount.is_finite() && amount > 0.0, FlowError::InvalidAmount);

    let mut book = book.borrow_mut();
    let vault: Vault = book
        .catalog
        .get(vault_id)
        .cloned()
        .ok_or(FlowError::VaultNotFound)?;

    let tx_id = book.next_tx_id(TransactionKind::Deposit, vault_id, amount, now)?;
    let applied = apply_deposit(&mut book, wallet, now, &vault, amount, lockup_days, succeed);
    let status = match applied {
        Ok(true) => TransactionStatus::Completed,
        _ => TransactionStatus::Failed,
    };
    book.record(
        &tx_id,
        TransactionKind::Deposit,
        amount,
        &vault.id,
        &vault.name,
        now,
        status,
    );

    match applied {
        Ok(success) => {
            if success {
                msg!("Transaction: {}", tx_id);
            } else {
                msg!("Deposit of {} into {} failed: {}", amount, vault.id, tx_id);
            }
            Ok(LedgerReceipt { success, tx_id })
        }
        Err(err) => {
            msg!("Deposit of {} into {} rejected ({}): {}", amount, vault.id, tx_id, err);
            Err(err)
        }
    }
}

/// Moves funds and updates the position. Returns false for a simulated failure.
fn apply_deposit(
    book: &mut Book,
    wallet: &MockWallet,
    now: DateTime<Utc>,
    vault: &Vault,
    amount: f64,
    lockup_days: u32,
    succeed: bool,
) -> Result<bool> {
    let lockup = *vault
        .lockup(lockup_days)
        .ok_or(FlowError::UnknownLockupPeriod)?;
    if !succeed {
        return Ok(false);
    }

    wallet.debit(amount)?;

    let unlock_at = projection::unlock_date(now, lockup.days);
    let position_id = UserInvestment::position_id(&vault.id);
    match book.positions.get_mut(&position_id) {
        Some(position) => position.top_up(amount, unlock_at, now),
        None => {
            let position = UserInvestment {
                id: position_id.clone(),
                vault_id: vault.id.clone(),
                vault_name: vault.name.clone(),
                principal: amount,
                profit: 0.0,
                effective_apr: projection::effective_apr(vault.base_apr, lockup.apr_boost),
                lockup_days: lockup.days,
                deposited_at: now,
                unlock_at,
                last_accrual_at: now,
            };
            book.positions.insert(position_id, position);
        }
    }

    msg!("Deposited {} into {} for {} days", amount, vault.id, lockup.days);
    Ok(true)
}

/// Settles a withdrawal. Once the position is known every outcome is
/// recorded, as for deposits.
fn settle_withdraw(
    book: &RefCell<Book>,
    wallet: &MockWallet,
    now: DateTime<Utc>,
    position_id: &str,
    amount: f64,
    succeed: bool,
) -> Result<LedgerReceipt> {
    require!(amount.is_finite() && amount > 0.0, FlowError::InvalidAmount);

    let mut book = book.borrow_mut();
    let mut position = book
        .positions
        .get(position_id)
        .cloned()
        .ok_or(FlowError::PositionNotFound)?;
    position.accrue(now);

    let tx_id = book.next_tx_id(TransactionKind::Withdraw, position_id, amount, now)?;
    let applied = apply_withdraw(&mut book, wallet, now, &mut position, amount, succeed);
    let status = match applied {
        Ok(true) => TransactionStatus::Completed,
        _ => TransactionStatus::Failed,
    };
    book.record(
        &tx_id,
        TransactionKind::Withdraw,
        amount,
        &position.vault_id,
        &position.vault_name,
        now,
        status,
    );

    match applied {
        Ok(success) => {
            if success {
                msg!("Transaction: {}", tx_id);
            } else {
                msg!("Withdrawal of {} from {} failed: {}", amount, position_id, tx_id);
            }
            Ok(LedgerReceipt { success, tx_id })
        }
        Err(err) => {
            msg!("Withdrawal of {} from {} rejected ({}): {}", amount, position_id, tx_id, err);
            Err(err)
        }
    }
}

/// Credits the wallet and draws down `position`, closing it when empty.
/// Returns false for a simulated failure.
fn apply_withdraw(
    book: &mut Book,
    wallet: &MockWallet,
    now: DateTime<Utc>,
    position: &mut UserInvestment,
    amount: f64,
    succeed: bool,
) -> Result<bool> {
    require!(position.is_withdrawable(now), FlowError::PositionLocked);
    require!(
        amount <= position.current_value() + AMOUNT_EPSILON,
        FlowError::InsufficientBalance
    );
    if !succeed {
        return Ok(false);
    }

    wallet.credit(amount)?;

    let remaining = position.draw(amount);
    if remaining > 0.0 {
        book.positions.insert(position.id.clone(), position.clone());
    } else {
        book.positions.shift_remove(&position.id);
        msg!("Position {} closed", position.id);
    }

    msg!("Withdrew {} from {}", amount, position.id);
    msg!("Remaining in position: {}", remaining);
    Ok(true)
}

impl Ledger for MockLedger {
    fn list_vaults(&self) -> LedgerCall<Vec<Vault>> {
        let vaults = self.book.borrow().catalog.iter().cloned().collect();
        LedgerCall::ready(self.read_ready_at(), vaults)
    }

    fn get_vault(&self, vault_id: &str) -> LedgerCall<Result<Vault>> {
        let vault = self
            .book
            .borrow()
            .catalog
            .get(vault_id)
            .cloned()
            .ok_or_else(|| error!(FlowError::VaultNotFound));
        LedgerCall::ready(self.read_ready_at(), vault)
    }

    fn list_positions(&self) -> LedgerCall<Vec<UserInvestment>> {
        let now = self.clock.now();
        let positions = self
            .book
            .borrow()
            .positions
            .values()
            .cloned()
            .map(|mut p| {
                p.accrue(now);
                p
            })
            .collect();
        LedgerCall::ready(self.read_ready_at(), positions)
    }

    fn list_transactions(&self) -> LedgerCall<Vec<TransactionRecord>> {
        let history = self.book.borrow().transactions.iter().rev().cloned().collect();
        LedgerCall::ready(self.read_ready_at(), history)
    }

    fn deposit(
        &self,
        vault_id: &str,
        amount: f64,
        lockup_days: u32,
    ) -> LedgerCall<Result<LedgerReceipt>> {
        let ready_at = self.commit_ready_at();
        let succeed = self.random.chance(self.config.success_rate);
        let (book, wallet, clock) = (self.book.clone(), self.wallet.clone(), self.clock.clone());
        let vault_id = vault_id.to_string();

        msg!("Deposit of {} into {} submitted", amount, vault_id);
        LedgerCall::deferred(ready_at, move || {
            settle_deposit(&book, &wallet, clock.now(), &vault_id, amount, lockup_days, succeed)
        })
    }

    fn withdraw(&self, position_id: &str, amount: f64) -> LedgerCall<Result<LedgerReceipt>> {
        let ready_at = self.commit_ready_at();
        let succeed = self.random.chance(self.config.success_rate);
        let (book, wallet, clock) = (self.book.clone(), self.wallet.clone(), self.clock.clone());
        let position_id = position_id.to_string();

        msg!("Withdrawal of {} from {} submitted", amount, position_id);
        LedgerCall::deferred(ready_at, move || {
            settle_withdraw(&book, &wallet, clock.now(), &position_id, amount, succeed)
        })
    }
}
