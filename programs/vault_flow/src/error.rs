//! Error types for the vault flow engine.
//!
//! Every recoverable failure of the deposit and withdraw workflows, the mock
//! ledger, and configuration loading maps to one code here.
//!
//! Codes are assigned in declaration order starting at 6000.

use anchor_lang::prelude::*;

/// Custom error codes for the vault flow engine.
///
/// Codes start at 6000 (Anchor's custom error offset).
#[error_code]
#[derive(PartialEq, Eq)]
pub enum FlowError {
    // ========== Input Validation Errors (6000-6004) ==========

    /// [6000] Amount is empty, not a number, or not above zero.
    #[msg("Enter a valid amount greater than zero")]
    InvalidAmount,

    /// [6001] Amount exceeds the available balance.
    #[msg("Amount exceeds available balance")]
    InsufficientBalance,

    /// [6002] Amount is under the configured minimum deposit.
    #[msg("Amount is below the minimum deposit")]
    BelowMinimum,

    /// [6003] No lockup period chosen yet.
    #[msg("Select a lockup period to continue")]
    NoLockupSelected,

    /// [6004] Wallet is disconnected.
    #[msg("Connect a wallet to continue")]
    WalletNotConnected,

    // ========== Workflow Errors (6005-6008) ==========

    /// [6005] The simulated ledger rejected the commit.
    #[msg("Transaction failed - please try again")]
    SubmissionFailed,

    /// [6006] A submission is already awaiting the ledger.
    #[msg("A transaction is already in progress")]
    SubmissionInFlight,

    /// [6007] The requested action is not available in the current stage.
    #[msg("Action not available at this step")]
    InvalidStage,

    /// [6008] The workflow has been dismissed.
    #[msg("Workflow has been closed")]
    WorkflowClosed,

    // ========== Ledger Errors (6009-6013) ==========

    /// [6009] No vault with the given id.
    #[msg("Vault not found")]
    VaultNotFound,

    /// [6010] No position with the given id.
    #[msg("Position not found")]
    PositionNotFound,

    /// [6011] The position's lockup has not ended.
    #[msg("Position is still locked")]
    PositionLocked,

    /// [6012] The vault does not offer the requested lockup.
    #[msg("Lockup period not offered by this vault")]
    UnknownLockupPeriod,

    /// [6013] Transaction seed could not be encoded.
    #[msg("Failed to encode transaction seed")]
    EncodingFailed,

    // ========== Configuration Errors (6014-6018) ==========

    /// [6014] Success rate outside [0, 1].
    #[msg("Success rate must be between 0 and 1")]
    InvalidSuccessRate,

    /// [6015] Latency bounds are zero or inverted.
    #[msg("Latency must be non-zero and min must not exceed max")]
    InvalidLatency,

    /// [6016] Minimum deposit is negative or not finite.
    #[msg("Minimum deposit must be a finite non-negative number")]
    InvalidMinimumDeposit,

    /// [6017] Highlight or celebration duration is zero.
    #[msg("Effect durations must be greater than zero")]
    InvalidEffectDuration,

    /// [6018] Configuration document could not be parsed.
    #[msg("Configuration could not be parsed")]
    InvalidConfig,
}

impl FlowError {
    /// True when `err` carries this error code.
    pub fn is(self, err: &anchor_lang::error::Error) -> bool {
        match err {
            anchor_lang::error::Error::AnchorError(e) => e.error_code_number == u32::from(self),
            _ => false,
        }
    }
}
