//! Shared helpers for integration tests: a seeded order factory and a
//! reference priority queue to check tree extraction order against.

#![allow(dead_code)]

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ordertree::{Order, Side};

/// Odd multiplier: scrambling a sequence number with it is a bijection on
/// u64, so ids stay unique while landing all over the key space.
const ID_SCRAMBLE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic random order factory.
pub struct OrderMaker {
    rng: ChaCha8Rng,
    sequence: u64,
}

impl OrderMaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sequence: 0,
        }
    }

    /// Uniform value in `low..=high`
    pub fn between(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    /// Fair coin flip
    pub fn flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Uniform index in `0..len`
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// New order with a fresh unique id at `price`
    pub fn priced_order(&mut self, price: u64, side: Side) -> Order {
        self.sequence += 1;
        let id = self.sequence.wrapping_mul(ID_SCRAMBLE);
        let quantity = self.rng.gen_range(1..=1_000);
        Order::new(id, self.rng.gen_range(1..=100), side, price, quantity, self.sequence)
    }

    /// New order with a price drawn from `low..=high`
    pub fn order_between(&mut self, low: u64, high: u64, side: Side) -> Order {
        let price = self.between(low, high);
        self.priced_order(price, side)
    }
}

/// Which end of the price range a side extracts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Buy side: highest price first
    Max,
    /// Sell side: lowest price first
    Min,
}

impl Priority {
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Buy => Priority::Max,
            Side::Sell => Priority::Min,
        }
    }
}

/// Bucket-per-price FIFO queue, the obviously-correct model the trees are
/// checked against.
pub struct RefQueue<T> {
    buckets: Vec<VecDeque<T>>,
    low: u64,
    len: usize,
}

impl<T> RefQueue<T> {
    pub fn new(low: u64, high: u64) -> Self {
        let width = (high - low + 1) as usize;
        Self {
            buckets: (0..width).map(|_| VecDeque::new()).collect(),
            low,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, price: u64, item: T) {
        self.buckets[(price - self.low) as usize].push_back(item);
        self.len += 1;
    }

    pub fn pop(&mut self, priority: Priority) -> Option<T> {
        let bucket = match priority {
            Priority::Max => self.buckets.iter_mut().rev().find(|b| !b.is_empty())?,
            Priority::Min => self.buckets.iter_mut().find(|b| !b.is_empty())?,
        };
        self.len -= 1;
        bucket.pop_front()
    }
}
