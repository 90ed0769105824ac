//! # ordertree
//!
//! Dual-indexed intrusive order tree for limit order books.
//!
//! ## Architecture
//!
//! - **Tree**: intrusive BST keyed by `i64`, one FIFO ring per key, nodes
//!   embedded in slab entries and addressed by slab key
//! - **Types**: the `Order` payload and fixed-point price helpers
//! - **OrderBook**: bid/ask price trees plus an id tree over the same orders
//!
//! ## Design Principles
//!
//! 1. **No per-node allocation**: tree links live inside the slab entry
//! 2. **Price-time priority**: equal keys extract in arrival order
//! 3. **Slot bookkeeping**: each head knows the field that holds it, so
//!    unlinking never searches from the root
//! 4. **Single-threaded core**: exclusive borrows, no internal locking

/// Intrusive ordered index: Node, Adapter, Tree
pub mod tree;

/// Payload types: Order, Side, fixed-point prices
pub mod types;

/// Order book over a price tree per side and an id tree
pub mod orderbook;

pub use orderbook::{BookError, OrderBook, OrderNode, PriceLevel};
pub use tree::{Adapter, Node, Slot, StructureError, Tree, TreeError};
pub use types::{Order, Side};
