//! Wallet provider boundary and the in-memory mock used by the demo ledger.

use std::cell::{Cell, RefCell};

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::FlowError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WalletBalance {
    /// Spendable balance in the vaults' deposit currency.
    pub primary: f64,
    /// Native balance, shown only.
    pub secondary: f64,
}

/// Read-mostly view of the user's wallet. Workflows never mutate balances.
pub trait WalletClient {
    fn is_connected(&self) -> bool;
    fn address(&self) -> Option<Pubkey>;
    /// Zero when disconnected.
    fn balance(&self) -> WalletBalance;
    fn connect(&self) -> Result<Pubkey>;
    fn disconnect(&self);
}

#[derive(Debug)]
pub struct MockWallet {
    address: Pubkey,
    connected: Cell<bool>,
    balance: RefCell<WalletBalance>,
}

impl MockWallet {
    pub fn new(balance: WalletBalance) -> Self {
        Self {
            address: Pubkey::new_from_array(*blake3::hash(MOCK_WALLET_SEED).as_bytes()),
            connected: Cell::new(false),
            balance: RefCell::new(balance),
        }
    }

    /// Already-connected wallet holding `primary`.
    pub fn connected(primary: f64) -> Self {
        let wallet = Self::new(WalletBalance {
            primary,
            secondary: MOCK_SECONDARY_BALANCE,
        });
        wallet.connected.set(true);
        wallet
    }

    /// Settlement hook for the mock ledger.
    pub fn debit(&self, amount: f64) -> Result<()> {
        require!(self.connected.get(), FlowError::WalletNotConnected);
        let mut balance = self.balance.borrow_mut();
        require!(balance.primary >= amount, FlowError::InsufficientBalance);
        balance.primary -= amount;
        Ok(())
    }

    /// Settlement hook for the mock ledger.
    pub fn credit(&self, amount: f64) -> Result<()> {
        require!(self.connected.get(), FlowError::WalletNotConnected);
        self.balance.borrow_mut().primary += amount;
        Ok(())
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new(WalletBalance {
            primary: MOCK_PRIMARY_BALANCE,
            secondary: MOCK_SECONDARY_BALANCE,
        })
    }
}

impl WalletClient for MockWallet {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn address(&self) -> Option<Pubkey> {
        self.connected.get().then_some(self.address)
    }

    fn balance(&self) -> WalletBalance {
        if self.connected.get() {
            *self.balance.borrow()
        } else {
            WalletBalance::default()
        }
    }

    fn connect(&self) -> Result<Pubkey> {
        if !self.connected.replace(true) {
            msg!("Wallet connected: {}", self.address);
        }
        Ok(self.address)
    }

    fn disconnect(&self) {
        if self.connected.replace(false) {
            msg!("Wallet disconnected: {}", self.address);
        }
    }
}
