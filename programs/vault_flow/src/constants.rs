//! Crate constants for the vault flow engine.
//!
//! This module defines the default values used throughout the deposit and
//! withdraw workflows, including time periods, latency bounds, and the
//! simulated ledger's success rate.

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Number of days in a year for simple interest (365 days)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Seconds in a year, used for accrual over partial days
pub const SECONDS_PER_YEAR: f64 = DAYS_PER_YEAR * SECONDS_PER_DAY as f64;

/// Percent denominator (12.5 means 12.5%)
pub const PERCENT_DENOMINATOR: f64 = 100.0;

/// Position value below which a position is treated as empty (one cent)
pub const DUST_THRESHOLD: f64 = 0.01;

/// Longest lockup a catalog may offer (ten years)
pub const MAX_LOCKUP_DAYS: u32 = 3_650;

/// Upper bound for any simulated latency in milliseconds
pub const MAX_LATENCY_MS: u64 = 60_000;

/// Upper bound for celebration and highlight durations in milliseconds
pub const MAX_EFFECT_MS: u64 = 60_000;

/// Default minimum deposit in currency units
pub const DEFAULT_MIN_DEPOSIT: f64 = 50.0;

/// Default probability that a simulated commit succeeds (95%)
pub const DEFAULT_SUCCESS_RATE: f64 = 0.95;

/// Lower bound of the simulated commit latency in milliseconds
pub const DEFAULT_COMMIT_LATENCY_MIN_MS: u64 = 1_500;

/// Upper bound of the simulated commit latency in milliseconds
pub const DEFAULT_COMMIT_LATENCY_MAX_MS: u64 = 2_000;

/// Simulated latency for read calls in milliseconds
pub const DEFAULT_READ_LATENCY_MS: u64 = 300;

/// Length of the success celebration in milliseconds
pub const DEFAULT_CELEBRATION_MS: u64 = 3_000;

/// How long a freshly funded position stays highlighted in milliseconds
pub const DEFAULT_HIGHLIGHT_MS: u64 = 2_500;

/// Seed for the default mock randomness
pub const MOCK_RANDOM_SEED: &[u8] = b"vault_flow_mock";

/// Seed for deriving the mock wallet address
pub const MOCK_WALLET_SEED: &[u8] = b"mock_wallet";

/// Starting primary balance of the mock wallet
pub const MOCK_PRIMARY_BALANCE: f64 = 12_450.0;

/// Starting secondary balance of the mock wallet
pub const MOCK_SECONDARY_BALANCE: f64 = 3.2;

/// Performance series lengths
pub mod series {
    /// Daily points (last 30 days)
    pub const DAILY_POINTS: usize = 30;
    /// Weekly points (last 12 weeks)
    pub const WEEKLY_POINTS: usize = 12;
    /// Monthly points (last 12 months)
    pub const MONTHLY_POINTS: usize = 12;
    /// Maximum relative drift per step of the APY random walk
    pub const MAX_STEP_DRIFT: f64 = 0.04;
}
