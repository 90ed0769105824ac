//! ordertree - demo binary
//!
//! Builds a small book, shows depth on both sides, cancels by id and drains
//! the best orders. Run with `RUST_LOG=trace` to see every book mutation.

use std::error::Error;

use ordertree::types::price::{from_fixed, to_fixed};
use ordertree::{Order, OrderBook, Side};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("===========================================");
    println!("  ordertree - dual-indexed order book");
    println!("===========================================");
    println!();

    let quotes = [
        (1, Side::Buy, "49990.50", "0.25"),
        (2, Side::Buy, "50000.00", "1.00"),
        (3, Side::Sell, "50010.00", "0.50"),
        (4, Side::Buy, "50000.00", "0.40"),
        (5, Side::Sell, "50005.25", "2.00"),
        (6, Side::Sell, "50010.00", "0.10"),
    ];

    let mut book = OrderBook::with_capacity(64);
    for (id, side, price, quantity) in quotes {
        let price = to_fixed(price).ok_or("invalid price")?;
        let quantity = to_fixed(quantity).ok_or("invalid quantity")?;
        book.add_order(Order::new(id, 100 + id, side, price, quantity, id))?;
    }
    book.validate()?;

    println!("Resting orders: {} ({} bids, {} asks)", book.order_count(), book.bid_count(), book.ask_count());
    print_depth(&book);

    println!("Cancelling order #2 (front of the 50000 bid level)...");
    if let Some(order) = book.cancel_order(2) {
        println!("  cancelled {order}");
    }
    println!("  next bid in line: {}", book.best_bid_order().map_or("-".to_string(), Order::to_string));
    println!();

    println!("Draining best asks...");
    while let Some(order) = book.pop_best_ask() {
        println!("  popped {order}");
    }
    book.validate()?;
    println!();

    println!("State root: {}", hex::encode(book.compute_state_root()?));
    Ok(())
}

fn print_depth(book: &OrderBook) {
    println!();
    println!("{:>6} {:>18} {:>14} {:>7}", "side", "price", "quantity", "orders");
    for side in [Side::Sell, Side::Buy] {
        for level in book.depth(side, 5) {
            println!(
                "{:>6} {:>18} {:>14} {:>7}",
                side.to_string(),
                from_fixed(level.price),
                from_fixed(level.total_quantity),
                level.order_count,
            );
        }
    }
    println!();
    if let Some(spread) = book.spread() {
        println!("Spread: {}", from_fixed(spread));
    }
    println!();
}
