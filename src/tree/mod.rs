//! Intrusive ordered index for the order book.
//!
//! ## Architecture
//!
//! - [`Node`]: links embedded in a slab entity; one per tree the entity joins
//! - [`Adapter`]: picks which embedded node a tree uses
//! - [`Tree`]: BST of heads keyed by `i64` with a FIFO ring per key
//!
//! Orders embed two nodes (price and identity), so the same slab entry can
//! be found by best price and by order id without any second allocation.
//!
//! ## Threading
//!
//! Nothing here synchronizes. Callers pairing two trees over the same
//! entities must keep both mutations under one exclusive borrow (or lock)
//! so no observer sees an entry attached to only one tree.

mod error;
mod index;
mod node;

pub use error::{StructureError, TreeError};
pub use index::{Iter, Tree};
pub use node::{Adapter, Node, Slot};
