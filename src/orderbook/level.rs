//! Aggregated price levels for depth snapshots.
//!
//! The trees keep orders at one price in a FIFO ring; a `PriceLevel` is the
//! summary of one such ring, produced by [`OrderBook::depth`].
//!
//! [`OrderBook::depth`]: crate::orderbook::OrderBook::depth

use crate::types::Order;

/// Totals for all resting orders at a single price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price for this level (fixed-point, scaled by 10^8)
    pub price: u64,

    /// Sum of order quantities at this level
    pub total_quantity: u64,

    /// Number of orders at this level
    pub order_count: usize,
}

impl PriceLevel {
    /// Create an empty level
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Count an order resting at this level.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the order's price differs from the level's.
    pub fn add(&mut self, order: &Order) {
        debug_assert_eq!(order.price, self.price, "order priced off its level");
        self.total_quantity = self.total_quantity.saturating_add(order.quantity);
        self.order_count += 1;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
