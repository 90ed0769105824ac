//! Order book error types

use thiserror::Error;

/// Reasons the book refuses an operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// An order with this id is already resting
    #[error("order id {0} is already in the book")]
    DuplicateOrderId(u64),

    /// The price does not fit a price-tree key
    #[error("price {0} exceeds the largest indexable price")]
    PriceOutOfRange(u64),

    /// SSZ encoding of an order failed
    #[error("failed to encode order: {0}")]
    Encoding(String),
}
