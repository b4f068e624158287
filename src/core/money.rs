//! Limits on the money values the ledger will persist.
//!
//! `SQLite` holds decimal columns as REAL, so a value is only stored exactly
//! when it survives the trip through `f64`. Amounts and balances that would
//! be rounded on write are refused instead.

use crate::errors::{Error, Result};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

/// Whether `value` reads back unchanged after being stored.
#[must_use]
pub fn is_storable(value: Decimal) -> bool {
    value.to_f64().and_then(Decimal::from_f64) == Some(value)
}

/// Fails with [`Error::Validation`] on `field` if `value` cannot be stored exactly.
pub fn ensure_storable(field: &'static str, value: Decimal) -> Result<()> {
    if is_storable(value) {
        Ok(())
    } else {
        Err(Error::validation(
            field,
            format!("{value} has too many significant digits to be stored exactly"),
        ))
    }
}
