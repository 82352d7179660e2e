//! Daily yield accrual.
//!
//! For every day `d` of a range the calculator takes the minimum balance over
//! the trailing look-back window `[d - L(d) + 1, d]`, clamps it to the daily
//! balance ceiling and applies the tiered rate in effect on `d`.
//!
//! Unclaimed yield is re-invested: once day `d` is computed, the running sum
//! of yield since the start of the range is added to the balance of day
//! `d + 1` before its window is evaluated, so earlier days compound into
//! later windows within the same call.
//!
//! Days before the ledger's initialization day have no tracked history and
//! count as a zero balance. A window reaching back past initialization
//! therefore yields nothing until enough tracked days exist.

use tracing::debug;

use ystream_core::error::AccrualError;
use ystream_core::traits::DailyBalances;
use ystream_core::types::{Address, Amount, DayIndex};

use crate::schedule::{LookBackSchedule, YieldRateSchedule};
use crate::tiers::tiered_yield;

/// Per-day yield for a day range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyYield {
    /// Yield of each day of the range, first day already net of the claim debit.
    pub yields: Vec<Amount>,
    /// The claim debit was larger than the first day's gross yield.
    pub claim_debit_exceeds_first_day_yield: bool,
}

impl DailyYield {
    /// Sum of every day's yield.
    pub fn total(&self) -> Result<Amount, AccrualError> {
        sum(&self.yields)
    }
}

/// Checked sum of a slice of amounts.
pub fn sum(values: &[Amount]) -> Result<Amount, AccrualError> {
    values.iter().try_fold(Amount::zero(), |acc, v| {
        acc.checked_add(*v).ok_or(AccrualError::ArithmeticOverflow)
    })
}

/// Yield calculator over a balance source and the schedules of one group.
///
/// Borrowed views only; nothing is mutated.
pub struct AccrualCalculator<'a> {
    balances: &'a dyn DailyBalances,
    rates: &'a YieldRateSchedule,
    look_back: &'a LookBackSchedule,
    balance_ceiling: Option<Amount>,
}

impl<'a> AccrualCalculator<'a> {
    pub fn new(
        balances: &'a dyn DailyBalances,
        rates: &'a YieldRateSchedule,
        look_back: &'a LookBackSchedule,
    ) -> Self {
        Self {
            balances,
            rates,
            look_back,
            balance_ceiling: None,
        }
    }

    /// Cap the balance any single day can earn on.
    pub fn with_balance_ceiling(mut self, ceiling: Option<Amount>) -> Self {
        self.balance_ceiling = ceiling;
        self
    }

    /// Balances for days `[start, to_day]`, zero before initialization.
    fn padded_balances(
        &self,
        account: &Address,
        start: i64,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, AccrualError> {
        let init = self.balances.initialization_day();
        let len = (to_day as i64 - start + 1) as usize;
        if to_day < init {
            return Ok(vec![Amount::zero(); len]);
        }
        let fetch_from = start.max(init as i64);
        let padding = (fetch_from - start) as usize;
        // fetch_from lies in [init, to_day], so it fits a day index.
        let fetched = self
            .balances
            .daily_balances(account, fetch_from as DayIndex, to_day)?;

        let mut out = Vec::with_capacity(len);
        out.resize(padding, Amount::zero());
        out.extend(fetched);
        Ok(out)
    }

    /// Yield of each day in `[from_day, to_day]`.
    ///
    /// `claim_debit` is subtracted from the first day's yield. When it
    /// exceeds that yield the day counts as zero and the result is flagged.
    ///
    /// # Errors
    ///
    /// - [`AccrualError::ToDayPriorFromDay`] if `to_day < from_day`
    /// - [`AccrualError::ArithmeticOverflow`] if a product or running sum overflows
    pub fn calculate_yield_by_days(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
        claim_debit: Amount,
    ) -> Result<DailyYield, AccrualError> {
        if to_day < from_day {
            return Err(AccrualError::ToDayPriorFromDay { from: from_day, to: to_day });
        }

        let max_length = self.look_back.max_length_in(from_day, to_day) as i64;
        let start = from_day as i64 - max_length + 1;
        let mut balances = self.padded_balances(account, start, to_day)?;

        let days = (to_day - from_day) as usize + 1;
        let mut yields = Vec::with_capacity(days);
        let mut running = Amount::zero();
        let mut debit_exceeds = false;

        for (i, day) in (from_day..=to_day).enumerate() {
            let idx = (day as i64 - start) as usize;
            let length = self.look_back.length_at(day) as usize;
            let window = &balances[idx + 1 - length..=idx];
            let mut min_balance = window.iter().copied().min().unwrap_or_default();
            if let Some(ceiling) = self.balance_ceiling {
                min_balance = min_balance.min(ceiling);
            }

            let mut day_yield = tiered_yield(min_balance, self.rates.tiers_at(day))?;
            if i == 0 {
                if day_yield > claim_debit {
                    day_yield -= claim_debit;
                } else {
                    day_yield = Amount::zero();
                    debit_exceeds = true;
                }
            }

            running = running
                .checked_add(day_yield)
                .ok_or(AccrualError::ArithmeticOverflow)?;
            if let Some(next) = balances.get_mut(idx + 1) {
                *next = next
                    .checked_add(running)
                    .ok_or(AccrualError::ArithmeticOverflow)?;
            }
            yields.push(day_yield);
        }

        debug!(%account, from_day, to_day, total = %running, "accrual: yield calculated");
        Ok(DailyYield {
            yields,
            claim_debit_exceeds_first_day_yield: debit_exceeds,
        })
    }
}
