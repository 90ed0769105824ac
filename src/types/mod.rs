//! Payload types carried by the book's trees.
//!
//! - [`Order`]: the entity every tree entry points back to
//! - [`Side`]: Buy or Sell
//! - [`price`]: fixed-point price helpers (10^8 scale) and price-tree keys

mod order;
pub mod price;

pub use order::{Order, Side};
