//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per ticket
const MAX_PRICE: f64 = 1_000_000_000.0;

/// Convert an f64 into a Decimal (lossless for the ranges we accept)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert a Decimal back to f64, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp(DECIMAL_PLACES)
        .to_f64()
        .unwrap_or(0.0)
}

/// Round an f64 amount to 2 decimal places via Decimal
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Tax amount for a subtotal at the given percentage
pub fn tax_amount(subtotal: f64, tax_percent: f64) -> f64 {
    let tax = to_decimal(subtotal) * to_decimal(tax_percent) / Decimal::from(100);
    to_f64(tax)
}

/// Validate that a price is finite, non-negative and within range.
/// Enforced before any catalog price is persisted.
pub fn validate_price(value: f64, field: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field} must be a finite number, got {value}"));
    }
    if value < 0.0 {
        return Err(format!("{field} must be non-negative, got {value}"));
    }
    if value > MAX_PRICE {
        return Err(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_computed_with_decimal_precision() {
        // 0.1 + 0.2 style drift must not leak into totals
        assert_eq!(tax_amount(100000.0, 10.0), 10000.0);
        assert_eq!(tax_amount(0.30, 10.0), 0.03);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn price_validation_bounds() {
        assert!(validate_price(100000.0, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(f64::INFINITY, "price").is_err());
        assert!(validate_price(MAX_PRICE + 1.0, "price").is_err());
    }
}
