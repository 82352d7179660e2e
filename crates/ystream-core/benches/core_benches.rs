//! Criterion benchmarks for ystream-core critical operations.
//!
//! Covers: ledger range queries over long histories and day/time splitting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ystream_core::ledger::BalanceLedger;
use ystream_core::time::day_and_time;
use ystream_core::types::{Address, Amount};

fn populated_ledger(days: u16) -> (BalanceLedger, Address) {
    let holder = Address::repeat_byte(0xA1);
    let sink = Address::repeat_byte(0xB2);
    let mut ledger = BalanceLedger::new(0);
    ledger
        .after_transfer(&Address::ZERO, &holder, Amount::from(u64::MAX), 0)
        .unwrap();
    // One change every other day keeps the record set sparse.
    for day in (2..days).step_by(2) {
        ledger
            .after_transfer(&holder, &sink, Amount::from(1_000u64), day)
            .unwrap();
    }
    (ledger, holder)
}

fn bench_query(c: &mut Criterion) {
    let (ledger, holder) = populated_ledger(2_000);

    c.bench_function("ledger_query_365_days", |b| {
        b.iter(|| ledger.query(black_box(&holder), black_box(1_000), black_box(1_364)))
    });
}

fn bench_day_and_time(c: &mut Criterion) {
    c.bench_function("day_and_time", |b| {
        b.iter(|| day_and_time(black_box(1_700_000_000)))
    });
}

criterion_group!(benches, bench_query, bench_day_and_time);
criterion_main!(benches);
