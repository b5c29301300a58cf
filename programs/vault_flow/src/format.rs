//! Display formatting for currency, percentages, and dates.
//!
//! Currency always has two decimals with comma grouping, percentages one
//! decimal. Non-finite inputs render as zero.

use chrono::{DateTime, Utc};

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn group_thousands(whole: u128) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Splits into (is_negative, grouped whole part, cents).
fn split_cents(value: f64) -> (bool, String, u128) {
    let value = finite_or_zero(value);
    let cents = (value.abs() * 100.0).round() as u128;
    (value < 0.0 && cents > 0, group_thousands(cents / 100), cents % 100)
}

/// `1234.5` -> `"1,234.50"`
pub fn format_amount(value: f64) -> String {
    let (negative, whole, cents) = split_cents(value);
    format!("{}{whole}.{cents:02}", if negative { "-" } else { "" })
}

/// `1234.5` -> `"$1,234.50"`, `-5.0` -> `"-$5.00"`
pub fn format_currency(value: f64) -> String {
    let (negative, whole, cents) = split_cents(value);
    format!("{}${whole}.{cents:02}", if negative { "-" } else { "" })
}

/// `12.46` -> `"12.5%"`
pub fn format_percent(value: f64) -> String {
    let tenths = (finite_or_zero(value) * 10.0).round();
    if tenths == 0.0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", tenths / 10.0)
}

/// Compact currency for large figures such as TVL: `"$12.5M"`.
pub fn format_compact(value: f64) -> String {
    let value = finite_or_zero(value);
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if magnitude >= 1e9 {
        format!("{sign}${:.1}B", magnitude / 1e9)
    } else if magnitude >= 1e6 {
        format!("{sign}${:.1}M", magnitude / 1e6)
    } else if magnitude >= 1e3 {
        format!("{sign}${:.1}K", magnitude / 1e3)
    } else {
        format_currency(value)
    }
}

/// `"Nov 15, 2026"`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
