//! Adversarial property-based test suite for ystream.
//!
//! These tests try to break ledger and claim invariants under randomized
//! inputs.
//!
//! Attack vectors tested:
//! - Forward fill for accounts that never recorded anything
//! - Query output length over arbitrary valid ranges
//! - Zero-amount, self and mint/burn transfers sneaking in records
//! - Preview idempotence
//! - Claim-day monotonicity over random claim sequences
//! - Double payment or lost precision across partial claims

use proptest::prelude::*;
use ystream_core::constants::{MIN_CLAIM_AMOUNT, ROUNDING_COEF, SECONDS_PER_DAY};
use ystream_core::time::timestamp_at;
use ystream_core::traits::Clock;
use ystream_core::types::{Address, Amount};
use ystream_engine::StreamerConfig;
use ystream_tests::helpers::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BALANCE: u128 = 100_000_000_000;

/// 1% daily on a flat balance, compounding neutralized by the ceiling.
fn neutral_holder(clock_start: u64) -> Harness {
    let mut h = Harness::with_config(StreamerConfig {
        token: token(),
        initialization_day: Some(0),
        daily_balance_ceiling: Some(amt(BALANCE)),
        ..StreamerConfig::default()
    });
    h.mint(addr(0xAA), BALANCE);
    h.set_rate(0, 1);
    h.clock.set(clock_start);
    h
}

fn rounded(v: Amount) -> Amount {
    v - v % Amount::from(ROUNDING_COEF)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// An account without records resolves every day to its live balance.
    #[test]
    fn zero_records_forward_fill(balance in 0u128..1u128 << 100, day in 100u16..2_000) {
        let mut h = Harness::new(100);
        h.mint(addr(0xA0), balance);
        h.at(day, 0);
        let out = h.streamer.get_daily_balances(&addr(0xA0), day, day).unwrap();
        prop_assert_eq!(out, vec![amt(balance)]);
    }

    #[test]
    fn query_length_matches_range(from in 100u16..1_000, span in 0u16..400, moves in 0usize..20) {
        let mut h = Harness::new(100);
        h.mint(addr(0xA0), 1_000_000);
        for i in 0..moves {
            h.at(100 + 3 * i as u16, 0);
            h.transfer(addr(0xA0), addr(0xB0), 1);
        }
        let out = h.streamer.get_daily_balances(&addr(0xA0), from, from + span).unwrap();
        prop_assert_eq!(out.len(), span as usize + 1);
    }

    /// Zero amounts, self transfers and the null side never create records.
    #[test]
    fn degenerate_transfers_never_record(day in 101u16..500, amount in 1u128..1_000) {
        let mut h = Harness::new(100);
        let a = addr(0xA0);
        h.mint(a, 1_000_000);
        h.at(day, 0);

        h.transfer(a, addr(0xB0), 0);
        h.transfer(a, a, amount);
        prop_assert!(h.streamer.ledger().records(&a).is_empty());
        prop_assert!(h.streamer.ledger().records(&addr(0xB0)).is_empty());

        h.transfer(a, Address::ZERO, amount);
        h.mint(a, amount);
        prop_assert_eq!(h.streamer.ledger().records(&a).len(), 1);
        prop_assert!(h.streamer.ledger().records(&Address::ZERO).is_empty());
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn preview_is_idempotent(
        secs in SECONDS_PER_DAY..40 * SECONDS_PER_DAY,
        request in 0u128..50_000_000_000
    ) {
        let h = neutral_holder(secs);
        let holder = addr(0xAA);
        let a = h.streamer.claim_preview(&holder, amt(request)).unwrap();
        let b = h.streamer.claim_preview(&holder, amt(request)).unwrap();
        prop_assert_eq!(a, b);
        let c = h.streamer.claim_all_preview(&holder).unwrap();
        let d = h.streamer.claim_all_preview(&holder).unwrap();
        prop_assert_eq!(c, d);
    }

    /// Random claims over time: the claim day never moves back, and what was
    /// paid plus what is left always equals what a never-claimed account
    /// would see.
    #[test]
    fn claims_never_double_pay(
        steps in proptest::collection::vec((0u64..2 * SECONDS_PER_DAY, 1u128..=100), 1..20)
    ) {
        let holder = addr(0xAA);
        let mut h = neutral_holder(timestamp_at(1, 0));
        let mut paid = Amount::zero();
        let mut last_day = h.streamer.get_last_claim_details(&holder).day;

        for (advance, percent_of_available) in steps {
            h.clock.advance(advance);
            let available = h.streamer.claim_all_preview(&holder).unwrap().total_yield;
            let request = rounded(available * Amount::from(percent_of_available) / Amount::from(100u64));
            if request < Amount::from(MIN_CLAIM_AMOUNT) {
                continue;
            }
            let receipt = h.streamer.claim(&holder, request).unwrap();
            prop_assert!(receipt.next_state.day >= last_day);
            last_day = receipt.next_state.day;
            paid += receipt.net_yield();
        }

        let left = h.streamer.claim_all_preview(&holder).unwrap().total_yield;
        let untouched = neutral_holder(h.clock.now());
        let whole = untouched.streamer.claim_all_preview(&holder).unwrap().total_yield;
        prop_assert_eq!(left + paid, whole);
        prop_assert_eq!(h.streamer.treasury().paid_to(&holder), paid);
    }

    /// An exact request above what is available reports the precise gap.
    #[test]
    fn shortfall_is_request_minus_available(
        secs in SECONDS_PER_DAY..20 * SECONDS_PER_DAY,
        extra in 1u128..1_000_000_000
    ) {
        let h = neutral_holder(secs);
        let holder = addr(0xAA);
        let all = h.streamer.claim_all_preview(&holder).unwrap();
        let available = all.primary_yield + all.stream_yield;
        let r = h.streamer.claim_preview(&holder, available + amt(extra)).unwrap();
        prop_assert_eq!(r.shortfall, amt(extra));
        prop_assert_eq!(r.total_yield, Amount::zero());
    }
}
