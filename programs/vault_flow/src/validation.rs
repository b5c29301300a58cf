//! Amount validation for the deposit and withdraw flows.
//!
//! Validation is a pure function of the entered text and the balance it is
//! checked against, so re-running it on every keystroke or slider move is
//! always consistent.

use crate::error::FlowError;

/// Parses user input into a finite amount. Grouping commas are accepted.
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Checks a deposit amount in order: valid number, within balance, at least the minimum.
pub fn validate_deposit(
    input: &str,
    balance: f64,
    min_deposit: f64,
) -> std::result::Result<f64, FlowError> {
    let amount = parse_amount(input).ok_or(FlowError::InvalidAmount)?;
    if amount <= 0.0 {
        return Err(FlowError::InvalidAmount);
    }
    if amount > balance {
        return Err(FlowError::InsufficientBalance);
    }
    if amount < min_deposit {
        return Err(FlowError::BelowMinimum);
    }
    Ok(amount)
}

/// Checks a withdrawal against the position's current value.
pub fn validate_withdrawal(input: &str, available: f64) -> std::result::Result<f64, FlowError> {
    let amount = parse_amount(input).ok_or(FlowError::InvalidAmount)?;
    if amount <= 0.0 {
        return Err(FlowError::InvalidAmount);
    }
    if amount > available {
        return Err(FlowError::InsufficientBalance);
    }
    Ok(amount)
}
