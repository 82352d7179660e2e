//! Protocol constants. All monetary values are in the token's smallest unit.

use crate::types::GroupId;

/// Denominator for yield rates and the fee rate.
///
/// A rate of `RATE_FACTOR / 100` is 1% per day.
///
/// # Examples
///
/// ```
/// use ystream_core::constants::RATE_FACTOR;
/// let one_percent = (RATE_FACTOR / 100) as u128;
/// assert_eq!(100_000_000_000u128 * one_percent / RATE_FACTOR as u128, 1_000_000_000);
/// ```
pub const RATE_FACTOR: u64 = 1_000_000_000_000;

/// Granularity of claimed amounts and fees.
///
/// Requested claims must be a multiple of this value; claim-all totals are
/// rounded down to it and fees are rounded up to it.
pub const ROUNDING_COEF: u64 = 10_000;

/// Smallest amount accepted by an explicit claim.
pub const MIN_CLAIM_AMOUNT: u64 = 1_000_000;

/// Shift subtracted from the wall clock before any day/time computation.
///
/// Moves the day boundary from midnight UTC to 03:00 UTC.
pub const NEGATIVE_TIME_SHIFT: u64 = 3 * 60 * 60;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Fee rate used when the configuration does not set one.
pub const DEFAULT_FEE_RATE: u64 = 0;

/// Hard cap on the number of look-back period records.
pub const LOOK_BACK_PERIOD_COUNT_LIMIT: usize = 10;

/// Group of every account that was never explicitly assigned.
pub const DEFAULT_GROUP: GroupId = 0;

/// Number of value bits persisted in ledger, schedule and claim records.
pub const STORED_VALUE_BITS: usize = 240;
