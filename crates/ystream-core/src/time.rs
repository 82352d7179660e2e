//! Day and time arithmetic.
//!
//! Every accessor subtracts [`NEGATIVE_TIME_SHIFT`] from the wall clock before
//! splitting it into a day index and seconds within that day, so a day runs
//! from 03:00 UTC to 03:00 UTC.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::{NEGATIVE_TIME_SHIFT, SECONDS_PER_DAY};
use crate::error::SafeCastError;
use crate::safe_cast::to_u16;
use crate::traits::Clock;
use crate::types::DayIndex;

/// Apply the negative time shift to a Unix timestamp.
pub fn shifted(timestamp: u64) -> u64 {
    timestamp.saturating_sub(NEGATIVE_TIME_SHIFT)
}

/// Split an already shifted timestamp into `(day, seconds since day start)`.
pub fn split_shifted(shifted_timestamp: u64) -> Result<(DayIndex, u64), SafeCastError> {
    let day = to_u16(shifted_timestamp / SECONDS_PER_DAY)?;
    Ok((day, shifted_timestamp % SECONDS_PER_DAY))
}

/// Day index and seconds elapsed in that day for a Unix timestamp.
///
/// # Examples
///
/// ```
/// use ystream_core::time::day_and_time;
/// // 1970-01-02 02:59:59 UTC still belongs to day 0.
/// assert_eq!(day_and_time(86_400 + 3 * 3600 - 1).unwrap(), (0, 86_399));
/// assert_eq!(day_and_time(86_400 + 3 * 3600).unwrap(), (1, 0));
/// ```
pub fn day_and_time(timestamp: u64) -> Result<(DayIndex, u64), SafeCastError> {
    split_shifted(shifted(timestamp))
}

/// Unix timestamp of `seconds` into shifted day `day`.
pub fn timestamp_at(day: DayIndex, seconds: u64) -> u64 {
    day as u64 * SECONDS_PER_DAY + seconds + NEGATIVE_TIME_SHIFT
}

/// Wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Settable clock for tests and scenario replay.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// while the streamer owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(timestamp: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    /// Clock positioned `seconds` into shifted day `day`.
    pub fn at_day(day: DayIndex, seconds: u64) -> Self {
        Self::new(timestamp_at(day, seconds))
    }

    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    pub fn set_day(&self, day: DayIndex, seconds: u64) {
        self.set(timestamp_at(day, seconds));
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shift_moves_day_boundary() {
        assert_eq!(day_and_time(NEGATIVE_TIME_SHIFT).unwrap(), (0, 0));
        assert_eq!(day_and_time(SECONDS_PER_DAY).unwrap(), (0, SECONDS_PER_DAY - NEGATIVE_TIME_SHIFT));
    }

    #[test]
    fn before_shift_saturates_to_zero() {
        assert_eq!(day_and_time(0).unwrap(), (0, 0));
        assert_eq!(shifted(100), 0);
    }

    #[test]
    fn far_future_overflows_day_index() {
        let ts = timestamp_at(u16::MAX, 0) + SECONDS_PER_DAY;
        assert!(matches!(
            day_and_time(ts),
            Err(SafeCastError::Uint16Overflow { .. })
        ));
    }

    #[test]
    fn manual_clock_shares_state() {
        let clock = ManualClock::at_day(10, 0);
        let handle = clock.clone();
        handle.advance(SECONDS_PER_DAY / 2);
        assert_eq!(day_and_time(clock.now()).unwrap(), (10, SECONDS_PER_DAY / 2));
        handle.set_day(12, 5);
        assert_eq!(day_and_time(clock.now()).unwrap(), (12, 5));
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }

    proptest! {
        #[test]
        fn timestamp_at_inverts_day_and_time(day in 0u16..u16::MAX, secs in 0u64..SECONDS_PER_DAY) {
            prop_assert_eq!(day_and_time(timestamp_at(day, secs)).unwrap(), (day, secs));
        }
    }
}
