//! Aggregate figures for the portfolio dashboard.

use chrono::{DateTime, Utc};

use crate::constants::*;
use crate::state::UserInvestment;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_principal: f64,
    pub total_value: f64,
    pub total_profit: f64,
    /// Profit over principal, in percent. Zero for an empty portfolio.
    pub profit_percent: f64,
    pub positions: usize,
    pub withdrawable: usize,
    /// Earliest unlock among still-locked positions.
    pub next_unlock: Option<DateTime<Utc>>,
}

impl PortfolioSummary {
    /// Totals over `positions`, each accrued to `now` first.
    pub fn from_positions(positions: &[UserInvestment], now: DateTime<Utc>) -> Self {
        let mut total_principal = 0.0;
        let mut total_profit = 0.0;
        let mut withdrawable = 0;
        let mut next_unlock: Option<DateTime<Utc>> = None;

        for position in positions {
            let profit = position.profit + position.pending_profit(now);
            total_principal += position.principal;
            total_profit += profit;

            if position.is_withdrawable(now) {
                withdrawable += 1;
            } else {
                next_unlock = Some(match next_unlock {
                    Some(at) => at.min(position.unlock_at),
                    None => position.unlock_at,
                });
            }
        }

        let profit_percent = if total_principal > 0.0 {
            total_profit / total_principal * PERCENT_DENOMINATOR
        } else {
            0.0
        };

        Self {
            total_principal,
            total_value: total_principal + total_profit,
            total_profit,
            profit_percent,
            positions: positions.len(),
            withdrawable,
            next_unlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn position(vault_id: &str, principal: f64, profit: f64, unlock_in_days: i64) -> UserInvestment {
        UserInvestment {
            id: UserInvestment::position_id(vault_id),
            vault_id: vault_id.to_string(),
            vault_name: vault_id.to_string(),
            principal,
            profit,
            effective_apr: 10.0,
            lockup_days: 30,
            deposited_at: now() - Duration::days(30),
            unlock_at: now() + Duration::days(unlock_in_days),
            last_accrual_at: now(),
        }
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = PortfolioSummary::from_positions(&[], now());
        assert_eq!(summary.positions, 0);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.profit_percent, 0.0);
        assert_eq!(summary.next_unlock, None);
    }

    #[test]
    fn test_totals_and_unlocks() {
        let positions = vec![
            position("stable-usdc", 1_000.0, 50.0, -1),
            position("growth-eth", 3_000.0, 150.0, 10),
            position("degen-lp", 1_000.0, 0.0, 3),
        ];
        let summary = PortfolioSummary::from_positions(&positions, now());

        assert_eq!(summary.positions, 3);
        assert_eq!(summary.withdrawable, 1);
        assert!((summary.total_principal - 5_000.0).abs() < 1e-9);
        assert!((summary.total_profit - 200.0).abs() < 1e-9);
        assert!((summary.total_value - 5_200.0).abs() < 1e-9);
        assert!((summary.profit_percent - 4.0).abs() < 1e-9);
        assert_eq!(summary.next_unlock, Some(now() + Duration::days(3)));
    }

    #[test]
    fn test_includes_unaccrued_profit() {
        let mut stale = position("stable-usdc", 3_650.0, 0.0, 0);
        stale.last_accrual_at = now() - Duration::days(1);
        let summary = PortfolioSummary::from_positions(&[stale], now());
        // 3650 * 10% / 365 = 1.0 per day
        assert!((summary.total_profit - 1.0).abs() < 1e-9);
    }
}
