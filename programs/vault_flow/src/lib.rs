//! # Vault Flow
//!
//! Deposit and withdraw workflow engine for yield vaults, with the return
//! projection math the workflow screens share.
//!
//! - **Details**: amount and lockup entry, validated on every change
//! - **Review**: projected return, total value and unlock date
//! - **Processing**: one simulated commit in flight, resubmission disabled
//! - **Success**: celebration (when motion is allowed) and a `deposit-success` event
//!
//! ## Features
//! - Simple (non-compounding) interest: `amount * apr/100 * days/365`
//! - Configurable minimum deposit and simulated success rate
//! - Replaceable [`ledger::Ledger`] boundary with an in-process mock
//! - Injected clock, randomness, wallet, notifications and navigation
//!
//! ## Mock Only
//! Every backend call is simulated in-process. Nothing touches a real chain.

use anchor_lang::prelude::*;

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod format;
pub mod ledger;
pub mod portfolio;
pub mod projection;
pub mod runtime;
pub mod state;
pub mod validation;
pub mod wallet;
pub mod workflow;

pub use catalog::{SortKey, VaultCatalog};
pub use config::FlowConfig;
pub use error::FlowError;
pub use events::{DepositSucceeded, DomainEvent, EventBus, WithdrawSucceeded};
pub use ledger::{Ledger, LedgerCall, LedgerReceipt, MockLedger};
pub use portfolio::PortfolioSummary;
pub use projection::Projection;
pub use state::*;
pub use wallet::{MockWallet, WalletBalance, WalletClient};
pub use workflow::*;

/// Opens a deposit flow for `vault_id`.
///
/// # Arguments
/// * `ctx` - Collaborators shared by the workflows
/// * `catalog` - Catalog the vault is looked up in
/// * `vault_id` - Vault to deposit into
///
/// # Errors
/// Returns an error if the vault is not in the catalog.
pub fn open_deposit(
    ctx: FlowContext,
    catalog: &VaultCatalog,
    vault_id: &str,
) -> Result<DepositWorkflow> {
    let vault = catalog.get(vault_id).cloned().ok_or(FlowError::VaultNotFound)?;
    Ok(DepositWorkflow::open(ctx, vault))
}

/// Opens a withdraw flow for one of the user's positions.
///
/// # Arguments
/// * `ctx` - Collaborators shared by the workflows
/// * `positions` - Positions as last read from the ledger
/// * `position_id` - Position to withdraw from
///
/// # Errors
/// Returns an error if:
/// - The position is not in `positions`
/// - The position is still locked
pub fn open_withdraw(
    ctx: FlowContext,
    positions: &[UserInvestment],
    position_id: &str,
) -> Result<WithdrawWorkflow> {
    let position = positions
        .iter()
        .find(|p| p.id == position_id)
        .cloned()
        .ok_or(FlowError::PositionNotFound)?;
    require!(
        position.is_withdrawable(ctx.clock.now()),
        FlowError::PositionLocked
    );
    Ok(WithdrawWorkflow::open(ctx, position))
}

/// Projects the return of depositing `amount` into `vault` for `lockup_days`.
///
/// # Arguments
/// * `vault` - Vault supplying the base APR and lockup options
/// * `amount` - Principal; non-finite or non-positive values project to zero
/// * `lockup_days` - One of the vault's lockup periods
/// * `now` - Reference instant for the unlock date
///
/// # Errors
/// Returns an error if the vault does not offer `lockup_days`.
pub fn project_return(
    vault: &Vault,
    amount: f64,
    lockup_days: u32,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Projection> {
    let lockup = vault
        .lockup(lockup_days)
        .ok_or(FlowError::UnknownLockupPeriod)?;
    Ok(projection::project(amount, vault.base_apr, lockup, now))
}
