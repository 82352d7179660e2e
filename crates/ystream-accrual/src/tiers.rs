//! Graduated (tiered) yield rates.
//!
//! Tiers are applied in order, each consuming the next `cap` units of the
//! balance. A tier with `cap == 0`, or the last tier, takes whatever is left.
//! Each tier's contribution is truncated on its own:
//!
//! `yield = Σ floor(portion_i * rate_i / RATE_FACTOR)`

use ystream_core::constants::RATE_FACTOR;
use ystream_core::error::AccrualError;
use ystream_core::types::{Amount, RateTier};

/// Daily yield of `balance` under `tiers`.
///
/// An empty tier list is the "not configured yet" sentinel and yields zero.
pub fn tiered_yield(balance: Amount, tiers: &[RateTier]) -> Result<Amount, AccrualError> {
    let factor = Amount::from(RATE_FACTOR);
    let mut remaining = balance;
    let mut total = Amount::zero();

    for (i, tier) in tiers.iter().enumerate() {
        if remaining.is_zero() {
            break;
        }
        let unbounded = tier.cap.is_zero() || i + 1 == tiers.len();
        let portion = if unbounded { remaining } else { remaining.min(tier.cap) };

        let part = portion
            .checked_mul(tier.rate)
            .ok_or(AccrualError::ArithmeticOverflow)?
            / factor;
        total = total
            .checked_add(part)
            .ok_or(AccrualError::ArithmeticOverflow)?;
        remaining -= portion;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amt(v: u128) -> Amount {
        Amount::from(v)
    }

    fn percent(p: u64) -> Amount {
        Amount::from(RATE_FACTOR / 100 * p)
    }

    fn tier(rate: Amount, cap: u128) -> RateTier {
        RateTier { rate, cap: amt(cap) }
    }

    #[test]
    fn no_tiers_is_zero() {
        assert_eq!(tiered_yield(amt(1_000_000), &[]).unwrap(), Amount::zero());
    }

    #[test]
    fn single_flat_tier() {
        let y = tiered_yield(amt(100_000_000_000), &[RateTier::flat(percent(1))]).unwrap();
        assert_eq!(y, amt(1_000_000_000));
    }

    #[test]
    fn single_tier_cap_is_ignored() {
        // The last tier is unbounded even when it carries a cap.
        let y = tiered_yield(amt(1_000), &[tier(percent(10), 10)]).unwrap();
        assert_eq!(y, amt(100));
    }

    #[test]
    fn two_tiers_split_balance() {
        let tiers = [tier(percent(2), 1_000), tier(percent(1), 0)];
        // 1000 * 2% + 500 * 1%
        assert_eq!(tiered_yield(amt(1_500), &tiers).unwrap(), amt(25));
        // Below the first cap only the first tier applies.
        assert_eq!(tiered_yield(amt(500), &tiers).unwrap(), amt(10));
    }

    #[test]
    fn zero_cap_tier_swallows_rest() {
        let tiers = [tier(percent(2), 0), tier(percent(50), 0)];
        assert_eq!(tiered_yield(amt(1_000), &tiers).unwrap(), amt(20));
    }

    #[test]
    fn each_tier_truncates_independently() {
        // 99 * 1% = 0.99 -> 0 and again for the second tier.
        let tiers = [tier(percent(1), 99), tier(percent(1), 0)];
        assert_eq!(tiered_yield(amt(198), &tiers).unwrap(), Amount::zero());
        assert_eq!(tiered_yield(amt(198), &[RateTier::flat(percent(1))]).unwrap(), amt(1));
    }

    #[test]
    fn zero_balance_is_zero() {
        assert_eq!(
            tiered_yield(Amount::zero(), &[RateTier::flat(percent(5))]).unwrap(),
            Amount::zero()
        );
    }

    #[test]
    fn overflow_is_reported() {
        let err = tiered_yield(Amount::MAX, &[RateTier::flat(Amount::MAX)]).unwrap_err();
        assert_eq!(err, AccrualError::ArithmeticOverflow);
    }

    proptest! {
        #[test]
        fn flat_tier_matches_formula(
            balance in 0u128..=u64::MAX as u128,
            rate in 0u64..=RATE_FACTOR
        ) {
            let y = tiered_yield(amt(balance), &[RateTier::flat(Amount::from(rate))]).unwrap();
            prop_assert_eq!(y, amt(balance) * Amount::from(rate) / Amount::from(RATE_FACTOR));
        }

        #[test]
        fn yield_monotonic_in_balance(
            lo in 0u128..1u128 << 80, extra in 0u128..1u128 << 80, cap in 0u128..1u128 << 60
        ) {
            let tiers = [tier(percent(3), cap), tier(percent(1), 0)];
            let a = tiered_yield(amt(lo), &tiers).unwrap();
            let b = tiered_yield(amt(lo + extra), &tiers).unwrap();
            prop_assert!(a <= b);
        }
    }
}
