//! Return projection calculator.
//!
//! Simple (non-compounding) interest over a lockup:
//!
//! `projected_return = amount * (base_apr + apr_boost) / 100 * lockup_days / 365`
//!
//! Every function here is pure. A missing, negative, or non-finite amount
//! projects to zero instead of leaking `NaN` or a negative figure.

use chrono::{DateTime, Duration, Utc};

use crate::constants::*;
use crate::state::LockupPeriod;

/// Figures shown for a prospective deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub effective_apr: f64,
    pub projected_return: f64,
    pub total_value: f64,
    pub unlock_date: DateTime<Utc>,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn effective_apr(base_apr: f64, apr_boost: f64) -> f64 {
    finite_or_zero(base_apr) + finite_or_zero(apr_boost)
}

/// Simple interest on `principal` at `apr` percent over `years`.
pub fn simple_interest(principal: f64, apr: f64, years: f64) -> f64 {
    if !principal.is_finite() || principal <= 0.0 || !years.is_finite() || years <= 0.0 {
        return 0.0;
    }
    let interest = principal * (finite_or_zero(apr) / PERCENT_DENOMINATOR) * years;
    interest.max(0.0)
}

pub fn projected_return(amount: f64, base_apr: f64, apr_boost: f64, lockup_days: u32) -> f64 {
    simple_interest(
        amount,
        effective_apr(base_apr, apr_boost),
        lockup_days as f64 / DAYS_PER_YEAR,
    )
}

pub fn total_value(amount: f64, projected_return: f64) -> f64 {
    let principal = if amount.is_finite() && amount > 0.0 { amount } else { 0.0 };
    principal + projected_return
}

/// `now` plus `lockup_days` calendar days. Saturates instead of overflowing.
pub fn unlock_date(now: DateTime<Utc>, lockup_days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(lockup_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Full projection for `amount` in a vault with `base_apr` under `lockup`.
pub fn project(amount: f64, base_apr: f64, lockup: &LockupPeriod, now: DateTime<Utc>) -> Projection {
    let projected_return = projected_return(amount, base_apr, lockup.apr_boost, lockup.days);
    Projection {
        effective_apr: effective_apr(base_apr, lockup.apr_boost),
        projected_return,
        total_value: total_value(amount, projected_return),
        unlock_date: unlock_date(now, lockup.days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_thirty_day_projection() {
        let lockup = LockupPeriod { days: 30, apr_boost: 0.0 };
        let p = project(1000.0, 12.5, &lockup, now());
        let expected = 1000.0 * 0.125 * 30.0 / 365.0;
        assert!((p.projected_return - expected).abs() < 1e-6);
        assert!((p.projected_return - 10.27).abs() < 0.01);
        assert!((p.total_value - 1010.27).abs() < 0.01);
        assert_eq!(p.effective_apr, 12.5);
    }

    #[test]
    fn test_boost_is_additive() {
        let r = projected_return(5000.0, 10.0, 2.5, 90);
        let expected = 5000.0 * (12.5 / 100.0) * (90.0 / 365.0);
        assert!((r - expected).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_amounts_project_to_zero() {
        for amount in [0.0, -250.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(projected_return(amount, 12.5, 1.0, 30), 0.0, "amount {amount}");
        }
        let lockup = LockupPeriod { days: 30, apr_boost: 0.0 };
        let p = project(f64::NAN, 12.5, &lockup, now());
        assert_eq!(p.projected_return, 0.0);
        assert_eq!(p.total_value, 0.0);
    }

    #[test]
    fn test_unlock_date_is_calendar_days() {
        let lockup = LockupPeriod { days: 30, apr_boost: 0.0 };
        let p = project(100.0, 5.0, &lockup, now());
        assert_eq!(p.unlock_date, Utc.with_ymd_and_hms(2026, 11, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_oversized_lockup_does_not_panic() {
        let lockup = LockupPeriod { days: u32::MAX, apr_boost: 0.0 };
        let p = project(1000.0, 12.5, &lockup, now());
        assert_eq!(p.unlock_date, DateTime::<Utc>::MAX_UTC);
        assert!(p.projected_return.is_finite());
        assert!(p.projected_return > 0.0);
    }

    #[test]
    fn test_projection_is_reproducible() {
        let lockup = LockupPeriod { days: 180, apr_boost: 3.0 };
        assert_eq!(project(777.77, 9.1, &lockup, now()), project(777.77, 9.1, &lockup, now()));
    }
}
