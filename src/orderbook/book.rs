//! Order book indexed by price and by order id.
//!
//! ## Architecture
//!
//! - **Slab**: one `OrderNode` per resting order, O(1) insert/remove
//! - **Bid tree**: price-keyed, extracted from the maximum
//! - **Ask tree**: price-keyed, extracted from the minimum
//! - **Id tree**: identity-keyed over every resting order, for cancels
//!
//! Every order sits in exactly two trees at once: its side's price tree and
//! the id tree. Each mutating method updates both before returning, and
//! `&mut self` keeps any other caller from observing the half-way state.
//! Wrap the book in a `Mutex` to share it between threads.
//!
//! Order ids key an unbalanced tree: spread them over the `u64` range rather
//! than counting up from 1 (see the module docs of [`crate::orderbook`]).
//!
//! ## Example
//!
//! ```
//! use ordertree::orderbook::OrderBook;
//! use ordertree::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(10_000);
//!
//! book.add_order(Order::new(1, 100, Side::Buy, 5_000_000_000_000, 100_000_000, 0)).unwrap();
//! book.add_order(Order::new(2, 101, Side::Sell, 5_100_000_000_000, 100_000_000, 0)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(5_000_000_000_000));
//! assert_eq!(book.best_ask(), Some(5_100_000_000_000));
//! assert_eq!(book.spread(), Some(100_000_000_000));
//!
//! let cancelled = book.cancel_order(1).unwrap();
//! assert_eq!(cancelled.id, 1);
//! assert!(book.best_bid().is_none());
//! ```

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::{debug, trace};

use crate::orderbook::{BookError, IdLink, OrderNode, PriceLevel, PriceLink};
use crate::tree::{StructureError, Tree};
use crate::types::{Order, Side};

/// Price-time priority order book over intrusive trees
#[derive(Debug)]
pub struct OrderBook {
    /// Pre-allocated order storage
    orders: Slab<OrderNode>,

    /// Buy orders by price
    bids: Tree<PriceLink>,

    /// Sell orders by price
    asks: Tree<PriceLink>,

    /// All resting orders by id
    ids: Tree<IdLink>,

    bid_count: usize,

    ask_count: usize,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with pre-allocated order storage
    ///
    /// ```
    /// use ordertree::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(100_000);
    /// assert!(book.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bids: Tree::new(),
            asks: Tree::new(),
            ids: Tree::new(),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order in the book.
    ///
    /// # Errors
    ///
    /// - [`BookError::DuplicateOrderId`] if an order with the same id rests
    /// - [`BookError::PriceOutOfRange`] if the price exceeds
    ///   [`MAX_PRICE`](crate::types::price::MAX_PRICE)
    ///
    /// # Returns
    ///
    /// The slab key of the stored order
    pub fn add_order(&mut self, order: Order) -> Result<usize, BookError> {
        let (id, price) = (order.id, order.price);
        let node = OrderNode::try_new(order).map_err(|err| {
            debug!(id, price, "rejecting order: price out of range");
            err
        })?;
        if self.ids.has(&self.orders, node.order.id_key()) {
            debug!(id, "rejecting order: duplicate id");
            return Err(BookError::DuplicateOrderId(id));
        }

        trace!("add_order: {}", node.order);
        let side = node.order.side();
        let key = self.orders.insert(node);

        match side {
            Side::Buy => {
                self.bids.push(&mut self.orders, key);
                self.bid_count += 1;
            }
            Side::Sell => {
                self.asks.push(&mut self.orders, key);
                self.ask_count += 1;
            }
        }
        self.ids.push(&mut self.orders, key);

        Ok(key)
    }

    /// Cancel an order by id.
    ///
    /// The id tree finds the entry; its price node is then unlinked where it
    /// sits, with no second key search.
    pub fn cancel_order(&mut self, order_id: u64) -> Option<Order> {
        let key = self.ids.pop(&mut self.orders, order_id as i64)?;

        let side = self.orders[key].order.side();
        let unlinked = match side {
            Side::Buy => self.bids.remove(&mut self.orders, key),
            Side::Sell => self.asks.remove(&mut self.orders, key),
        };
        debug_assert!(unlinked, "order {order_id} missing from its price tree");

        trace!(order_id, ?side, "cancel_order");
        Some(self.release(key, side))
    }

    /// Remove and return the oldest order at the highest bid
    pub fn pop_best_bid(&mut self) -> Option<Order> {
        let key = self.bids.pop_max(&mut self.orders)?;
        self.unlink_id(key);
        trace!(key, "pop_best_bid");
        Some(self.release(key, Side::Buy))
    }

    /// Remove and return the oldest order at the lowest ask
    pub fn pop_best_ask(&mut self) -> Option<Order> {
        let key = self.asks.pop_min(&mut self.orders)?;
        self.unlink_id(key);
        trace!(key, "pop_best_ask");
        Some(self.release(key, Side::Sell))
    }

    /// Pop the order's identity entry after its price entry is gone
    fn unlink_id(&mut self, key: usize) {
        let id_key = self.orders[key].order.id_key();
        let popped = self.ids.pop(&mut self.orders, id_key);
        debug_assert_eq!(popped, Some(key), "id tree out of sync with price tree");
    }

    /// Drop a fully unlinked entry from the slab
    fn release(&mut self, key: usize, side: Side) -> Order {
        match side {
            Side::Buy => self.bid_count -= 1,
            Side::Sell => self.ask_count -= 1,
        }
        let node = self.orders.remove(key);
        debug_assert!(node.is_unlinked(), "released order still linked");
        node.order
    }

    /// Remove every order
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids = Tree::new();
        self.asks = Tree::new();
        self.ids = Tree::new();
        self.bid_count = 0;
        self.ask_count = 0;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a resting order by id
    pub fn get_order(&self, order_id: u64) -> Option<&Order> {
        self.ids
            .get(&self.orders, order_id as i64)
            .map(|key| &self.orders[key].order)
    }

    /// Check if an order with this id rests in the book
    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.ids.has(&self.orders, order_id as i64)
    }

    /// Get the slab key of a resting order
    #[inline]
    pub fn get_key(&self, order_id: u64) -> Option<usize> {
        self.ids.get(&self.orders, order_id as i64)
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest buy price
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.best_bid_order().map(|order| order.price)
    }

    /// Lowest sell price
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.best_ask_order().map(|order| order.price)
    }

    /// Order next in line on the bid side
    pub fn best_bid_order(&self) -> Option<&Order> {
        self.bids
            .peek_max(&self.orders)
            .map(|key| &self.orders[key].order)
    }

    /// Order next in line on the ask side
    pub fn best_ask_order(&self) -> Option<&Order> {
        self.asks
            .peek_min(&self.orders)
            .map(|key| &self.orders[key].order)
    }

    /// best_ask - best_bid, `None` if a side is empty or the book is crossed
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Orders of one side in extraction order: best price first, oldest
    /// first within a price
    pub fn iter_side(&self, side: Side) -> impl Iterator<Item = &Order> + '_ {
        let keys = match side {
            Side::Buy => self.bids.iter_rev(&self.orders),
            Side::Sell => self.asks.iter(&self.orders),
        };
        keys.map(move |key| &self.orders[key].order)
    }

    /// Up to `max_levels` aggregated price levels, best first
    pub fn depth(&self, side: Side, max_levels: usize) -> Vec<PriceLevel> {
        let mut levels: Vec<PriceLevel> = Vec::new();
        for order in self.iter_side(side) {
            if let Some(level) = levels.last_mut() {
                if level.price == order.price {
                    level.add(order);
                    continue;
                }
            }
            if levels.len() == max_levels {
                break;
            }
            let mut level = PriceLevel::new(order.price);
            level.add(order);
            levels.push(level);
        }
        levels
    }

    /// SHA-256 over the SSZ encoding of every resting order in extraction
    /// order, bids then asks.
    ///
    /// Identical operation sequences produce identical roots; slab key reuse
    /// does not affect the result.
    pub fn compute_state_root(&self) -> Result<[u8; 32], BookError> {
        let mut hasher = Sha256::new();
        hasher.update((self.bid_count as u64).to_le_bytes());
        hasher.update((self.ask_count as u64).to_le_bytes());

        for order in self.iter_side(Side::Buy).chain(self.iter_side(Side::Sell)) {
            let bytes = ssz_rs::serialize(order).map_err(|err| BookError::Encoding(format!("{err:?}")))?;
            hasher.update(&bytes);
        }

        Ok(hasher.finalize().into())
    }

    /// Check every tree invariant and that the three trees agree with the
    /// slab on how many orders rest.
    pub fn validate(&self) -> Result<(), StructureError> {
        let bids = self.bids.validate(&self.orders)?;
        let asks = self.asks.validate(&self.orders)?;
        let ids = self.ids.validate(&self.orders)?;

        let checks = [
            ("bid tree size", bids, self.bid_count),
            ("ask tree size", asks, self.ask_count),
            ("id tree size", ids, self.orders.len()),
            ("price tree total", bids + asks, self.orders.len()),
        ];
        for (what, found, expected) in checks {
            if found != expected {
                return Err(StructureError::CountMismatch {
                    what,
                    found,
                    expected,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
