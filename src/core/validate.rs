//! Small validation and arithmetic helpers used by the business modules.

use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Rounds a monetary value to cents.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trims `value` and rejects it when empty.
pub fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text, mapping blank strings to `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts an optional email with a minimal shape check (`local@domain`).
pub fn optional_email(value: Option<String>) -> Result<Option<String>> {
    match optional_text(value) {
        Some(email) => {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
            if valid {
                Ok(Some(email))
            } else {
                Err(Error::validation(format!("Invalid email address '{email}'")))
            }
        }
        None => Ok(None),
    }
}

/// Requires a finite amount strictly greater than zero.
pub fn positive_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Requires a finite amount greater than or equal to zero.
pub fn non_negative_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Requires a percentage in `[0, 100]`.
pub fn percentage(value: f64, field: &str) -> Result<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(Error::validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(value)
}

/// Rejects ranges whose end precedes their start. Open ends are always valid.
pub fn date_order(from: Option<NaiveDate>, to: Option<NaiveDate>, what: &str) -> Result<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(Error::validation(format!(
                "{what}: end date {to} is before start date {from}"
            )));
        }
    }
    Ok(())
}
