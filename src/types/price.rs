//! Fixed-point prices and their tree keys.
//!
//! Prices are `u64` scaled by 10^8, so `50000.12345678` is stored as
//! `5_000_012_345_678`. The price tree orders by signed `i64` keys; every
//! price up to [`MAX_PRICE`] maps to the key with the same numeric value.
//!
//! ```
//! use ordertree::types::price::{from_fixed, price_key, to_fixed};
//!
//! let price = to_fixed("50000.12345678").unwrap();
//! assert_eq!(price, 5_000_012_345_678);
//! assert_eq!(price_key(price), Some(5_000_012_345_678));
//! assert_eq!(from_fixed(price), "50000.12345678");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor: 10^8, eight decimal places
pub const SCALE: u64 = 100_000_000;

/// Largest price that still fits a price-tree key
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// Parse a decimal string into a fixed-point price.
///
/// Returns `None` for unparsable, negative, or out-of-range input.
///
/// ```
/// use ordertree::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-3"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a `Decimal` into a fixed-point price, rounding to 8 places
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }
    d.checked_mul(Decimal::from(SCALE))?.round_dp(0).to_u64()
}

/// Convert a fixed-point price into a `Decimal`
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Render a fixed-point price with all 8 decimal places
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Render a fixed-point price without trailing zeros
pub fn from_fixed_trimmed(value: u64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}

/// Price-tree key for a fixed-point price, `None` above [`MAX_PRICE`]
#[inline]
pub fn price_key(price: u64) -> Option<i64> {
    i64::try_from(price).ok()
}

// ============================================================================
// Unit Tests
// ============================================================================
