//! Effective-day indexed configuration tables.
//!
//! Both schedules keep their records sorted by strictly increasing
//! `effective_day`. A record applies from its effective day up to (not
//! including) the next record's effective day. Appends must land after the
//! last record; in-place updates must stay strictly between the neighbours.

use serde::{Deserialize, Serialize};
use tracing::info;

use ystream_core::constants::LOOK_BACK_PERIOD_COUNT_LIMIT;
use ystream_core::error::ScheduleError;
use ystream_core::safe_cast::to_u240;
use ystream_core::types::{DayIndex, LookBackPeriodRecord, RateTier, YieldRateRecord};

/// Window length used on days before the first look-back record.
pub const DEFAULT_LOOK_BACK_LENGTH: u16 = 1;

/// Whether `day` fits strictly between the neighbours of slot `index`.
fn fits_between(days: &[DayIndex], index: usize, day: DayIndex) -> bool {
    let after_prev = index == 0 || days[index - 1] < day;
    let before_next = index + 1 >= days.len() || day < days[index + 1];
    after_prev && before_next
}

/// Index of the last record effective on or before `day`.
fn effective_index(days: impl Iterator<Item = DayIndex>, day: DayIndex) -> Option<usize> {
    let count = days.take_while(|d| *d <= day).count();
    count.checked_sub(1)
}

// ------------------------------------------------------------------
// Yield rates
// ------------------------------------------------------------------

/// Tiered yield rates of one group.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct YieldRateSchedule {
    records: Vec<YieldRateRecord>,
}

fn validate_tiers(tiers: &[RateTier]) -> Result<(), ScheduleError> {
    if tiers.is_empty() {
        return Err(ScheduleError::YieldRateTiersEmpty);
    }
    for tier in tiers {
        to_u240(tier.rate)?;
        to_u240(tier.cap)?;
    }
    Ok(())
}

impl YieldRateSchedule {
    pub const fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn records(&self) -> &[YieldRateRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn days(&self) -> Vec<DayIndex> {
        self.records.iter().map(|r| r.effective_day).collect()
    }

    /// Append a record effective from `effective_day`.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::YieldRateInvalidEffectiveDay`] unless `effective_day` is after the last record
    /// - [`ScheduleError::YieldRateValueAlreadyConfigured`] if `tiers` equal the last record's tiers
    /// - [`ScheduleError::YieldRateTiersEmpty`] if `tiers` is empty
    pub fn add(
        &mut self,
        effective_day: DayIndex,
        tiers: Vec<RateTier>,
    ) -> Result<(), ScheduleError> {
        if let Some(last) = self.records.last() {
            if effective_day <= last.effective_day {
                return Err(ScheduleError::YieldRateInvalidEffectiveDay);
            }
            if last.tiers == tiers {
                return Err(ScheduleError::YieldRateValueAlreadyConfigured);
            }
        }
        validate_tiers(&tiers)?;

        info!(effective_day, tiers = tiers.len(), "schedule: yield rate added");
        self.records.push(YieldRateRecord { effective_day, tiers });
        Ok(())
    }

    /// Replace the record at `index`.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::YieldRateWrongIndex`] if `index` is out of bounds
    /// - [`ScheduleError::YieldRateInvalidEffectiveDay`] if the new day leaves the neighbour interval
    pub fn update(
        &mut self,
        index: usize,
        effective_day: DayIndex,
        tiers: Vec<RateTier>,
    ) -> Result<(), ScheduleError> {
        let len = self.records.len();
        if index >= len {
            return Err(ScheduleError::YieldRateWrongIndex { index, len });
        }
        if !fits_between(&self.days(), index, effective_day) {
            return Err(ScheduleError::YieldRateInvalidEffectiveDay);
        }
        validate_tiers(&tiers)?;

        info!(index, effective_day, "schedule: yield rate updated");
        self.records[index] = YieldRateRecord { effective_day, tiers };
        Ok(())
    }

    /// Remove every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        info!(removed, "schedule: yield rates deleted");
        removed
    }

    /// Tiers in effect on `day`; empty before the first record.
    pub fn tiers_at(&self, day: DayIndex) -> &[RateTier] {
        effective_index(self.records.iter().map(|r| r.effective_day), day)
            .map(|i| self.records[i].tiers.as_slice())
            .unwrap_or(&[])
    }
}

// ------------------------------------------------------------------
// Look-back periods
// ------------------------------------------------------------------

/// Global schedule of look-back window lengths.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LookBackSchedule {
    records: Vec<LookBackPeriodRecord>,
    limit: usize,
}

impl Default for LookBackSchedule {
    fn default() -> Self {
        Self::with_limit(LOOK_BACK_PERIOD_COUNT_LIMIT)
    }
}

/// A window of `length` days ending on `effective_day` must not reach before day 0.
fn check_combination(effective_day: DayIndex, length: u16) -> Result<(), ScheduleError> {
    if length == 0 {
        return Err(ScheduleError::LookBackPeriodLengthZero);
    }
    if effective_day < length - 1 {
        return Err(ScheduleError::LookBackPeriodInvalidParametersCombination {
            effective_day,
            length,
        });
    }
    Ok(())
}

impl LookBackSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit,
        }
    }

    pub fn records(&self) -> &[LookBackPeriodRecord] {
        &self.records
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Append a record effective from `effective_day`.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::LookBackPeriodInvalidEffectiveDay`] unless after the last record
    /// - [`ScheduleError::LookBackPeriodAlreadyConfigured`] if `length` equals the last length
    /// - [`ScheduleError::LookBackPeriodLengthZero`] if `length == 0`
    /// - [`ScheduleError::LookBackPeriodInvalidParametersCombination`] if the window would start before day 0
    /// - [`ScheduleError::LookBackPeriodCountLimit`] once the record limit is reached
    pub fn configure(&mut self, effective_day: DayIndex, length: u16) -> Result<(), ScheduleError> {
        if let Some(last) = self.records.last() {
            if effective_day <= last.effective_day {
                return Err(ScheduleError::LookBackPeriodInvalidEffectiveDay);
            }
            if last.length == length {
                return Err(ScheduleError::LookBackPeriodAlreadyConfigured);
            }
        }
        check_combination(effective_day, length)?;
        if self.records.len() >= self.limit {
            return Err(ScheduleError::LookBackPeriodCountLimit { limit: self.limit });
        }

        info!(effective_day, length, "schedule: look-back period configured");
        self.records.push(LookBackPeriodRecord { effective_day, length });
        Ok(())
    }

    /// Replace the record at `index`.
    pub fn update(
        &mut self,
        index: usize,
        effective_day: DayIndex,
        length: u16,
    ) -> Result<(), ScheduleError> {
        let len = self.records.len();
        if index >= len {
            return Err(ScheduleError::LookBackPeriodWrongIndex { index, len });
        }
        let days: Vec<DayIndex> = self.records.iter().map(|r| r.effective_day).collect();
        if !fits_between(&days, index, effective_day) {
            return Err(ScheduleError::LookBackPeriodInvalidEffectiveDay);
        }
        check_combination(effective_day, length)?;

        info!(index, effective_day, length, "schedule: look-back period updated");
        self.records[index] = LookBackPeriodRecord { effective_day, length };
        Ok(())
    }

    /// Window length in effect on `day`.
    pub fn length_at(&self, day: DayIndex) -> u16 {
        effective_index(self.records.iter().map(|r| r.effective_day), day)
            .map_or(DEFAULT_LOOK_BACK_LENGTH, |i| self.records[i].length)
    }

    /// Longest window in effect on any day of `[from_day, to_day]`.
    pub fn max_length_in(&self, from_day: DayIndex, to_day: DayIndex) -> u16 {
        self.records
            .iter()
            .filter(|r| r.effective_day > from_day && r.effective_day <= to_day)
            .map(|r| r.length)
            .fold(self.length_at(from_day), u16::max)
    }
}
