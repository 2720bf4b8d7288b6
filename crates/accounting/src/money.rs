//! Sign rules for monetary fields.

use rust_decimal::Decimal;

use coopledger_core::{DomainError, DomainResult};

/// `amount > 0`
pub(crate) fn ensure_positive(field: &str, amount: Decimal) -> DomainResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    Ok(amount)
}

/// `amount >= 0`
pub(crate) fn ensure_non_negative(field: &str, amount: Decimal) -> DomainResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(amount)
}
