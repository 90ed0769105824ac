//! Order payload indexed by the book's trees.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs, giving a fixed 41-byte
//! little-endian encoding. The book hashes these encodings into its state
//! root, so the layout must stay stable.
//!
//! ## Tree Keys
//!
//! An order exposes two keys:
//! - [`Order::price_key`]: fixed-point price as a signed key, if it fits
//! - [`Order::id_key`]: the id reinterpreted as `i64`; the mapping is
//!   bijective, so distinct ids always get distinct keys

use std::fmt;

use ssz_rs::prelude::*;

use crate::types::price;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Stored as u8 for SSZ: Buy = 0, Sell = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Bid, extracted highest price first
    #[default]
    Buy,
    /// Ask, extracted lowest price first
    Sell,
}

impl Side {
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A resting limit order.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8 + 8 + 1 + 8 + 8 + 8 = 41 bytes.
///
/// ## Example
///
/// ```
/// use ordertree::types::{Order, Side};
///
/// let order = Order::new(
///     7,                      // id
///     100,                    // user_id
///     Side::Sell,             // side
///     5_000_000_000_000,      // price: 50000.00000000
///     100_000_000,            // quantity: 1.00000000
///     1703577600000,          // timestamp (ms)
/// );
///
/// assert_eq!(order.price_key(), Some(5_000_000_000_000));
/// assert_eq!(order.id_key(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier
    pub id: u64,

    /// User/account identifier
    pub user_id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Price in fixed-point (scaled by 10^8)
    pub price: u64,

    /// Quantity in fixed-point (scaled by 10^8)
    pub quantity: u64,

    /// Unix timestamp in milliseconds
    pub timestamp: u64,
}

impl Order {
    pub fn new(id: u64, user_id: u64, side: Side, price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            id,
            user_id,
            side_raw: side.to_u8(),
            price,
            quantity,
            timestamp,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Key for the price tree, `None` above [`price::MAX_PRICE`]
    #[inline]
    pub fn price_key(&self) -> Option<i64> {
        price::price_key(self.price)
    }

    /// Key for the identity tree
    #[inline]
    pub fn id_key(&self) -> i64 {
        self.id as i64
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} @ {}",
            self.id,
            self.side(),
            price::from_fixed_trimmed(self.quantity),
            price::from_fixed_trimmed(self.price),
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
