//! Order node stored in the book's slab.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` together with the two intrusive tree nodes
//! that index it:
//!
//! ```text
//! OrderNode {
//!     order:      Order
//!     price_node: Node   -> bid or ask price tree
//!     id_node:    Node   -> identity tree
//! }
//! ```
//!
//! Both trees address the entry by its slab key, so an order is found by
//! best price and by id without any per-tree allocation.
//!
//! ## Slab Integration
//!
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`, which is only legal once both
//!   embedded nodes are free

use crate::orderbook::BookError;
use crate::tree::{Adapter, Node};
use crate::types::Order;

/// Order plus its price-tree and identity-tree links.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The actual order data
    pub order: Order,

    /// Link into the bid or ask tree, keyed by price
    pub(crate) price_node: Node,

    /// Link into the identity tree, keyed by order id
    pub(crate) id_node: Node,
}

impl OrderNode {
    /// Create a node with both keys set from the order, not yet linked
    ///
    /// # Panics
    ///
    /// Panics if the price has no tree key (above
    /// [`MAX_PRICE`](crate::types::price::MAX_PRICE)). Use
    /// [`OrderNode::try_new`] for unvalidated input.
    ///
    /// # Example
    ///
    /// ```
    /// use ordertree::orderbook::OrderNode;
    /// use ordertree::types::{Order, Side};
    ///
    /// let order = Order::new(1, 100, Side::Buy, 5_000_000_000_000, 100_000_000, 0);
    /// let node = OrderNode::new(order);
    ///
    /// assert!(node.is_unlinked());
    /// assert_eq!(node.price_node().key(), 5_000_000_000_000);
    /// assert_eq!(node.id_node().key(), 1);
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        match Self::try_new(order) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a node, rejecting prices outside the price-tree key range
    ///
    /// # Errors
    ///
    /// [`BookError::PriceOutOfRange`] if the price has no tree key
    pub fn try_new(order: Order) -> Result<Self, BookError> {
        let price_key = order.price_key().ok_or(BookError::PriceOutOfRange(order.price))?;
        Ok(Self {
            price_node: Node::new(price_key),
            id_node: Node::new(order.id_key()),
            order,
        })
    }

    /// Check if neither tree references this node
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.price_node.is_free() && self.id_node.is_free()
    }

    #[inline]
    pub fn price_node(&self) -> &Node {
        &self.price_node
    }

    #[inline]
    pub fn id_node(&self) -> &Node {
        &self.id_node
    }

}

/// Selects [`OrderNode::price_node`]
#[derive(Debug)]
pub struct PriceLink;

impl Adapter for PriceLink {
    type Entity = OrderNode;

    #[inline]
    fn node(entity: &OrderNode) -> &Node {
        &entity.price_node
    }

    #[inline]
    fn node_mut(entity: &mut OrderNode) -> &mut Node {
        &mut entity.price_node
    }
}

/// Selects [`OrderNode::id_node`]
#[derive(Debug)]
pub struct IdLink;

impl Adapter for IdLink {
    type Entity = OrderNode;

    #[inline]
    fn node(entity: &OrderNode) -> &Node {
        &entity.id_node
    }

    #[inline]
    fn node_mut(entity: &mut OrderNode) -> &mut Node {
        &mut entity.id_node
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
