use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::projection;

/// A user's stake in one vault.
///
/// Current value is never stored: it is always `principal + profit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInvestment {
    pub id: String,
    pub vault_id: String,
    pub vault_name: String,

    pub principal: f64,
    pub profit: f64,
    /// Base APR plus lockup boost at deposit time, in percent.
    pub effective_apr: f64,

    pub lockup_days: u32,
    pub deposited_at: DateTime<Utc>,
    pub unlock_at: DateTime<Utc>,
    pub last_accrual_at: DateTime<Utc>,
}

impl UserInvestment {
    pub fn position_id(vault_id: &str) -> String {
        format!("pos_{vault_id}")
    }

    pub fn current_value(&self) -> f64 {
        self.principal + self.profit
    }

    pub fn is_withdrawable(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_at
    }

    /// Profit as a percentage of principal.
    pub fn profit_percent(&self) -> f64 {
        if self.principal > 0.0 {
            self.profit / self.principal * PERCENT_DENOMINATOR
        } else {
            0.0
        }
    }

    /// Linear accrual since the last accrual point.
    ///
    /// rewards = principal * apr / 100 * elapsed_seconds / seconds_per_year
    pub fn pending_profit(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.last_accrual_at).num_seconds().max(0) as f64;
        if elapsed == 0.0 {
            return 0.0;
        }
        projection::simple_interest(self.principal, self.effective_apr, elapsed / SECONDS_PER_YEAR)
    }

    pub fn accrue(&mut self, now: DateTime<Utc>) {
        if now <= self.last_accrual_at {
            return;
        }
        self.profit += self.pending_profit(now);
        self.last_accrual_at = now;
    }

    /// Adds principal to an existing position. The lock extends to the later
    /// unlock date, and `lockup_days` then counts from the first deposit to it.
    pub fn top_up(&mut self, amount: f64, unlock_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.accrue(now);
        self.principal += amount;
        if unlock_at > self.unlock_at {
            self.unlock_at = unlock_at;
            self.lockup_days = self.locked_days();
        }
    }

    /// Whole days from `deposited_at` to `unlock_at`, rounded to the nearest day.
    fn locked_days(&self) -> u32 {
        let seconds = (self.unlock_at - self.deposited_at).num_seconds().max(0);
        let days = seconds.saturating_add(SECONDS_PER_DAY / 2) / SECONDS_PER_DAY;
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Removes `amount` from the position, drawing profit before principal.
    /// Returns the value left in the position; less than a cent counts as empty.
    pub fn draw(&mut self, amount: f64) -> f64 {
        let from_profit = amount.min(self.profit.max(0.0));
        self.profit -= from_profit;
        let from_principal = (amount - from_profit).min(self.principal);
        self.principal -= from_principal;
        if self.current_value() < DUST_THRESHOLD {
            self.principal = 0.0;
            self.profit = 0.0;
        }
        self.current_value()
    }
}
