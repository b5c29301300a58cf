//! Ledger boundary.
//!
//! The workflows only see the [`Ledger`] trait. Every call returns a
//! [`LedgerCall`] that resolves after a non-zero latency; the side effects of
//! a commit happen when the call resolves, so dropping an unresolved call
//! commits nothing.

pub mod mock;
pub mod seed;

pub use mock::*;

use anchor_lang::prelude::*;
use chrono::{DateTime, Utc};

use crate::state::{TransactionRecord, UserInvestment, Vault};

/// Outcome of a commit as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub success: bool,
    pub tx_id: String,
}

type Settle<T> = Box<dyn FnOnce() -> T>;

/// A ledger response that becomes available at `ready_at`.
pub struct LedgerCall<T> {
    ready_at: DateTime<Utc>,
    settle: Option<Settle<T>>,
}

impl<T: 'static> LedgerCall<T> {
    /// Resolves to `value` at `ready_at`.
    pub fn ready(ready_at: DateTime<Utc>, value: T) -> Self {
        Self::deferred(ready_at, move || value)
    }

    /// Runs `settle` when first polled at or after `ready_at`.
    pub fn deferred(ready_at: DateTime<Utc>, settle: impl FnOnce() -> T + 'static) -> Self {
        Self {
            ready_at,
            settle: Some(Box::new(settle)),
        }
    }
}

impl<T> LedgerCall<T> {
    pub fn ready_at(&self) -> DateTime<Utc> {
        self.ready_at
    }

    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        now >= self.ready_at
    }

    pub fn is_consumed(&self) -> bool {
        self.settle.is_none()
    }

    /// Yields the response once, at or after `ready_at`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        if !self.is_ready(now) {
            return None;
        }
        self.settle.take().map(|settle| settle())
    }
}

impl<T> std::fmt::Debug for LedgerCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCall")
            .field("ready_at", &self.ready_at)
            .field("consumed", &self.settle.is_none())
            .finish()
    }
}

/// Vault, position, and history provider.
///
/// A production build swaps the mock for a real wallet/ledger integration.
pub trait Ledger {
    fn list_vaults(&self) -> LedgerCall<Vec<Vault>>;

    fn get_vault(&self, vault_id: &str) -> LedgerCall<Result<Vault>>;

    fn list_positions(&self) -> LedgerCall<Vec<UserInvestment>>;

    /// Newest first.
    fn list_transactions(&self) -> LedgerCall<Vec<TransactionRecord>>;

    fn deposit(
        &self,
        vault_id: &str,
        amount: f64,
        lockup_days: u32,
    ) -> LedgerCall<Result<LedgerReceipt>>;

    fn withdraw(&self, position_id: &str, amount: f64) -> LedgerCall<Result<LedgerReceipt>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_call_waits_for_latency() {
        let mut call = LedgerCall::ready(t0() + Duration::milliseconds(300), 7);
        assert_eq!(call.poll(t0()), None);
        assert_eq!(call.poll(t0() + Duration::milliseconds(300)), Some(7));
        assert_eq!(call.poll(t0() + Duration::seconds(1)), None);
        assert!(call.is_consumed());
    }

    #[test]
    fn test_dropped_call_never_settles() {
        let settled = Rc::new(Cell::new(false));
        let flag = settled.clone();
        let call = LedgerCall::deferred(t0(), move || flag.set(true));
        drop(call);
        assert!(!settled.get());
    }
}
