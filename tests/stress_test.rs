//! Stress tests for the ordertree order book.
//!
//! These tests verify:
//! 1. Adds, cancels and best-price pops stay fast under load
//! 2. The book agrees with a reference model across random operations
//! 3. Determinism is preserved across runs
//! 4. Slab storage is reused rather than grown
//! 5. A mutex-guarded book survives concurrent writers
//!
//! ## Running Stress Tests
//!
//! ```bash
//! # Run all stress tests (release mode recommended)
//! cargo test --release --test stress_test -- --nocapture
//!
//! # Run specific test
//! cargo test --release --test stress_test stress_cancellations -- --nocapture
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use ordertree::{Order, OrderBook, Side};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Number of orders for the bulk load test
const STRESS_ORDER_COUNT: usize = 200_000;

/// Lower bound on mixed operations per second, loose enough for debug builds
const MIN_THROUGHPUT: f64 = 10_000.0;

/// Base price: 50000.00000000 (in fixed-point, 10^8 scale)
const BASE_PRICE: u64 = 5_000_000_000_000;

/// Tick size: 0.01 (in fixed-point)
const TICK: u64 = 1_000_000;

/// Prices land within ±TICK_RANGE ticks of BASE_PRICE
const TICK_RANGE: i64 = 1_000;

/// Odd multiplier spreading sequential ids across the id key space
const ID_SCRAMBLE: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Order id for the `n`th generated order. Unique per `n`.
fn scrambled_id(n: u64) -> u64 {
    n.wrapping_mul(ID_SCRAMBLE)
}

/// Generate one order on the tick grid around BASE_PRICE.
fn random_order(rng: &mut ChaCha8Rng, n: u64) -> Order {
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    let ticks = rng.gen_range(-TICK_RANGE..=TICK_RANGE);
    let price = (BASE_PRICE as i64 + ticks * TICK as i64) as u64;
    // Quantity: 0.001 to 1.0 (in fixed-point)
    let quantity = rng.gen_range(100_000..=100_000_000);
    let user_id = rng.gen_range(1..=10_000);

    Order::new(scrambled_id(n), user_id, side, price, quantity, n)
}

/// Generate deterministic orders for stress testing.
///
/// Uses a seeded RNG for reproducibility. Same seed = same orders.
fn generate_deterministic_orders(count: usize, seed: u64) -> Vec<Order> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (1..=count as u64).map(|n| random_order(&mut rng, n)).collect()
}

/// Run a deterministic mix of adds, cancels and pops and return the final
/// state root.
fn run_deterministic_sequence(seed: u64, count: usize) -> [u8; 32] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::with_capacity(count);
    let mut resting: Vec<u64> = Vec::new();

    for n in 1..=count as u64 {
        match rng.gen_range(0..10) {
            0..=5 => {
                let order = random_order(&mut rng, n);
                resting.push(order.id);
                book.add_order(order).expect("unique id in range");
            }
            6 | 7 if !resting.is_empty() => {
                let idx = rng.gen_range(0..resting.len());
                book.cancel_order(resting.swap_remove(idx));
            }
            8 => {
                book.pop_best_bid();
            }
            _ => {
                book.pop_best_ask();
            }
        }
    }

    book.validate().expect("book invariants");
    book.compute_state_root().expect("encodable orders")
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Bulk load then drain both sides completely.
///
/// # Verification
/// - No panics during execution
/// - Every order is extracted exactly once
/// - Extraction follows price-time priority on both sides
#[test]
fn stress_load_and_drain() {
    println!("\n=== STRESS TEST: {} Orders ===\n", STRESS_ORDER_COUNT);

    println!("Generating {} deterministic orders (seed=42)...", STRESS_ORDER_COUNT);
    let gen_start = Instant::now();
    let orders = generate_deterministic_orders(STRESS_ORDER_COUNT, 42);
    println!("  Generated in {:.2?}", gen_start.elapsed());

    let mut book = OrderBook::with_capacity(STRESS_ORDER_COUNT);

    println!("\nAdding orders...");
    let start = Instant::now();
    for order in orders {
        book.add_order(order).expect("unique id in range");
    }
    let add_elapsed = start.elapsed();

    assert_eq!(book.order_count(), STRESS_ORDER_COUNT);
    book.validate().expect("book invariants after load");
    println!("  Bid count:         {:>12}", book.bid_count());
    println!("  Ask count:         {:>12}", book.ask_count());
    println!("  State root:        {}", hex::encode(book.compute_state_root().unwrap()));

    println!("\nDraining both sides...");
    let start = Instant::now();
    let mut drained = 0;

    let mut last: Option<(u64, u64)> = None;
    while let Some(order) = book.pop_best_bid() {
        if let Some((price, timestamp)) = last {
            assert!(order.price < price || (order.price == price && order.timestamp > timestamp));
        }
        last = Some((order.price, order.timestamp));
        drained += 1;
    }

    let mut last: Option<(u64, u64)> = None;
    while let Some(order) = book.pop_best_ask() {
        if let Some((price, timestamp)) = last {
            assert!(order.price > price || (order.price == price && order.timestamp > timestamp));
        }
        last = Some((order.price, order.timestamp));
        drained += 1;
    }
    let drain_elapsed = start.elapsed();

    println!("\n=== RESULTS ===");
    println!("  Orders added:      {:>12}", STRESS_ORDER_COUNT);
    println!("  Orders drained:    {:>12}", drained);
    println!("  Add time:          {:>12.2?}", add_elapsed);
    println!("  Drain time:        {:>12.2?}", drain_elapsed);
    println!(
        "  Add throughput:    {:>12.0} orders/sec",
        STRESS_ORDER_COUNT as f64 / add_elapsed.as_secs_f64()
    );

    assert_eq!(drained, STRESS_ORDER_COUNT);
    assert!(book.is_empty());
    book.validate().expect("book invariants after drain");

    println!("\n=== STRESS TEST PASSED ===\n");
}

/// Verify determinism: Same sequence produces identical state root.
#[test]
fn verify_determinism() {
    println!("\n=== DETERMINISM TEST ===\n");

    const TEST_COUNT: usize = 20_000;
    const SEED: u64 = 12345;

    println!("Running sequence with {} operations (seed={})...", TEST_COUNT, SEED);

    let root1 = run_deterministic_sequence(SEED, TEST_COUNT);
    let root2 = run_deterministic_sequence(SEED, TEST_COUNT);

    println!("  Run 1 state root: {}", hex::encode(root1));
    println!("  Run 2 state root: {}", hex::encode(root2));

    assert_eq!(root1, root2, "State roots must match for determinism");

    let root3 = run_deterministic_sequence(SEED + 1, TEST_COUNT);
    println!("  Different seed:   {}", hex::encode(root3));
    assert_ne!(root1, root3, "Different seeds should produce different roots");

    println!("\n=== DETERMINISM VERIFIED ===\n");
}

/// Random operations checked step by step against a BTreeMap model.
#[test]
fn stress_matches_reference_model() {
    println!("\n=== REFERENCE MODEL TEST ===\n");

    const OPERATIONS: usize = 20_000;

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut book = OrderBook::new();

    // (price, timestamp) -> id; timestamps are unique so keys never collide
    let mut bids: BTreeMap<(u64, u64), u64> = BTreeMap::new();
    let mut asks: BTreeMap<(u64, u64), u64> = BTreeMap::new();
    let mut by_id: HashMap<u64, Order> = HashMap::new();
    let mut ids: Vec<u64> = Vec::new();

    for n in 1..=OPERATIONS as u64 {
        match rng.gen_range(0..8) {
            0..=3 => {
                let order = random_order(&mut rng, n);
                let entry = (order.price, order.timestamp);
                match order.side() {
                    Side::Buy => bids.insert(entry, order.id),
                    Side::Sell => asks.insert(entry, order.id),
                };
                ids.push(order.id);
                by_id.insert(order.id, order.clone());
                book.add_order(order).unwrap();
            }
            4 | 5 if !ids.is_empty() => {
                let id = ids.swap_remove(rng.gen_range(0..ids.len()));
                let expected = by_id.remove(&id);
                // Ids popped by best-price extraction may still be listed
                let cancelled = book.cancel_order(id);
                assert_eq!(cancelled, expected);
                if let Some(order) = cancelled {
                    let entry = (order.price, order.timestamp);
                    match order.side() {
                        Side::Buy => bids.remove(&entry),
                        Side::Sell => asks.remove(&entry),
                    };
                }
            }
            6 => {
                // Best bid is the highest price, oldest first within it
                let best = bids.keys().next_back().map(|&(price, _)| price);
                let expected = best.and_then(|price| {
                    let entry = *bids.range((price, 0)..=(price, u64::MAX)).next()?.0;
                    bids.remove(&entry)
                });
                let popped = book.pop_best_bid().map(|o| o.id);
                assert_eq!(popped, expected);
                if let Some(id) = popped {
                    by_id.remove(&id);
                }
            }
            _ => {
                let expected = asks.pop_first().map(|(_, id)| id);
                let popped = book.pop_best_ask().map(|o| o.id);
                assert_eq!(popped, expected);
                if let Some(id) = popped {
                    by_id.remove(&id);
                }
            }
        }

        assert_eq!(book.bid_count(), bids.len());
        assert_eq!(book.ask_count(), asks.len());
        if n % 1_000 == 0 {
            book.validate().expect("book invariants");
        }
    }

    println!("  Operations:        {:>12}", OPERATIONS);
    println!("  Final book size:   {:>12}", book.order_count());
    book.validate().expect("book invariants");

    println!("\n=== REFERENCE MODEL PASSED ===\n");
}

/// Test cancel operations under load.
#[test]
fn stress_cancellations() {
    println!("\n=== CANCELLATION STRESS TEST ===\n");

    const ORDER_COUNT: usize = 100_000;
    const CANCEL_RATE: f64 = 0.3; // 30% of iterations also cancel

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut book = OrderBook::with_capacity(ORDER_COUNT);

    let mut orders_placed = 0;
    let mut orders_cancelled = 0;
    let mut resting_order_ids: Vec<u64> = Vec::new();

    let start = Instant::now();

    for n in 1..=ORDER_COUNT as u64 {
        if !resting_order_ids.is_empty() && rng.gen_bool(CANCEL_RATE) {
            let idx = rng.gen_range(0..resting_order_ids.len());
            let order_id = resting_order_ids.swap_remove(idx);
            assert!(book.cancel_order(order_id).is_some(), "resting order {order_id} not found");
            orders_cancelled += 1;
        }

        let order = random_order(&mut rng, n);
        resting_order_ids.push(order.id);
        book.add_order(order).unwrap();
        orders_placed += 1;
    }

    let elapsed = start.elapsed();
    let ops_count = orders_placed + orders_cancelled;
    let throughput = ops_count as f64 / elapsed.as_secs_f64();

    println!("  Orders placed:     {:>12}", orders_placed);
    println!("  Orders cancelled:  {:>12}", orders_cancelled);
    println!("  Total operations:  {:>12}", ops_count);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("  Throughput:        {:>12.0} ops/sec", throughput);

    assert_eq!(book.order_count(), resting_order_ids.len());
    book.validate().expect("book invariants after cancellations");
    assert!(
        throughput >= MIN_THROUGHPUT,
        "Mixed operations throughput too low: {:.0}",
        throughput
    );

    println!("\n=== CANCELLATION TEST PASSED ===\n");
}

/// Check that slab slots freed by pops are reused instead of growing storage.
#[test]
fn stress_memory_stability() {
    println!("\n=== MEMORY STABILITY TEST ===\n");

    const ITERATIONS: usize = 100_000;
    const MAX_BOOK_SIZE: usize = 5_000;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut book = OrderBook::with_capacity(MAX_BOOK_SIZE);
    let initial_capacity = book.capacity();

    let mut max_size_seen = 0;

    for n in 1..=ITERATIONS as u64 {
        book.add_order(random_order(&mut rng, n)).unwrap();

        if book.order_count() == MAX_BOOK_SIZE {
            let popped = if rng.gen_bool(0.5) {
                book.pop_best_bid().or_else(|| book.pop_best_ask())
            } else {
                book.pop_best_ask().or_else(|| book.pop_best_bid())
            };
            assert!(popped.is_some());
        }

        max_size_seen = max_size_seen.max(book.order_count());
    }

    println!("  Iterations:        {:>12}", ITERATIONS);
    println!("  Max book size:     {:>12}", max_size_seen);
    println!("  Initial capacity:  {:>12}", initial_capacity);
    println!("  Final capacity:    {:>12}", book.capacity());

    assert!(max_size_seen < MAX_BOOK_SIZE);
    assert_eq!(book.capacity(), initial_capacity, "slab storage grew");
    book.validate().expect("book invariants");

    println!("\n=== MEMORY STABILITY PASSED ===\n");
}

/// Several threads share one book behind a mutex.
#[test]
fn stress_concurrent_writers() {
    println!("\n=== CONCURRENT WRITERS TEST ===\n");

    const THREADS: u64 = 4;
    const ORDERS_PER_THREAD: u64 = 10_000;

    let book = Arc::new(Mutex::new(OrderBook::with_capacity(
        (THREADS * ORDERS_PER_THREAD) as usize,
    )));

    let start = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(t);
                let mut mine: Vec<u64> = Vec::new();
                let mut cancelled = 0;

                for i in 0..ORDERS_PER_THREAD {
                    // Disjoint sequence ranges keep ids unique across threads
                    let order = random_order(&mut rng, t * ORDERS_PER_THREAD + i + 1);
                    mine.push(order.id);
                    book.lock().unwrap().add_order(order).unwrap();

                    if rng.gen_bool(0.25) {
                        let id = mine.swap_remove(rng.gen_range(0..mine.len()));
                        // Only this thread cancels its own ids
                        assert!(book.lock().unwrap().cancel_order(id).is_some());
                        cancelled += 1;
                    }
                }
                cancelled
            })
        })
        .collect();

    let cancelled: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let elapsed = start.elapsed();

    let book = book.lock().unwrap();
    println!("  Threads:           {:>12}", THREADS);
    println!("  Orders placed:     {:>12}", THREADS * ORDERS_PER_THREAD);
    println!("  Orders cancelled:  {:>12}", cancelled);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Elapsed time:      {:>12.2?}", elapsed);

    assert_eq!(
        book.order_count() as u64,
        THREADS * ORDERS_PER_THREAD - cancelled
    );
    book.validate().expect("book invariants after concurrent writes");

    println!("\n=== CONCURRENT WRITERS PASSED ===\n");
}
