//! Demo of self-referential pairs: how they print and how they are reclaimed
//!
//! Run with: cargo run --example cycles_demo
//! Set RUST_LOG=trace to also see atom interning and eviction.

use conscell::{AtomKind, NIL, Value, cons, is_interned, list, pair, setcdr, symbol};
use flexi_logger::Logger;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str("debug")?.start()?;

    println!("=== Cycles Demo ===\n");

    let proper = list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    println!("proper list:   {proper}");
    println!("structural:    {proper:?}\n");

    let improper = pair(Value::Int(1), Value::Int(2));
    println!("improper pair: {improper}");
    println!("structural:    {improper:?}\n");

    let ring = cons(
        vec![
            Value::Atom(symbol("demo-a")),
            Value::Atom(symbol("demo-b")),
            Value::Atom(symbol("demo-c")),
        ],
        true,
    );
    println!("ring:          {ring}");
    println!("structural:    {ring:?}\n");

    // a two-element prefix leading into a loop
    let lasso = pair(Value::Int(0), pair(Value::Int(1), ring.clone()));
    println!("lasso:         {lasso}");
    println!("structural:    {lasso:?}\n");

    drop(lasso);
    drop(ring);
    println!(
        "after dropping every handle, 'demo-a' still interned: {}",
        is_interned(AtomKind::Symbol, "demo-a")
    );

    let report = conscell::collect();
    println!(
        "collected {} of {} tracked pairs in {:.6}s",
        report.collected, report.tracked, report.elapsed_sec
    );
    println!(
        "after collection, 'demo-a' still interned: {}",
        is_interned(AtomKind::Symbol, "demo-a")
    );

    // breaking a ring by hand needs no collector
    let manual = cons(vec![Value::Int(1)], true);
    setcdr(&manual, NIL)?;
    println!("\nunlinked ring: {manual}");

    Ok(())
}
