//! Order book over the intrusive trees.
//!
//! ## Components
//!
//! - [`OrderNode`]: slab entry holding an `Order` and its two tree nodes
//! - [`PriceLink`] / [`IdLink`]: adapters selecting each embedded node
//! - [`OrderBook`]: bid and ask price trees plus an id tree over one slab
//! - [`PriceLevel`]: aggregated depth at one price
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(depth) per tree |
//! | Cancel by id | O(depth) id search, O(ring + depth) price unlink |
//! | Best bid/ask | O(depth) |
//! | Pop best bid/ask | O(depth) per tree |
//!
//! ## Order Ids
//!
//! The trees are not balanced, so depth follows the arrival pattern. Ids
//! handed out sequentially arrive in sorted order and turn the id tree into
//! a linked list, making every add, cancel and pop O(n). Spread ids over the
//! key space before they reach the book, for example by multiplying a
//! sequence number with an odd constant (a bijection on `u64`, so ids stay
//! unique):
//!
//! ```
//! use ordertree::orderbook::OrderBook;
//! use ordertree::types::{Order, Side};
//!
//! const ID_SCRAMBLE: u64 = 0x9E37_79B9_7F4A_7C15;
//!
//! let mut book = OrderBook::new();
//! for sequence in 1..=1_000u64 {
//!     let id = sequence.wrapping_mul(ID_SCRAMBLE);
//!     book.add_order(Order::new(id, 1, Side::Buy, 100 + sequence % 7, 1, sequence)).unwrap();
//! }
//!
//! assert_eq!(book.order_count(), 1_000);
//! assert!(book.contains_order(500u64.wrapping_mul(ID_SCRAMBLE)));
//! book.validate().unwrap();
//! ```

mod book;
mod error;
mod level;
mod node;

pub use book::OrderBook;
pub use error::BookError;
pub use level::PriceLevel;
pub use node::{IdLink, OrderNode, PriceLink};
