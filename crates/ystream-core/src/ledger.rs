//! Daily balance ledger.
//!
//! Keeps, per account, a sparse append-only sequence of [`BalanceRecord`]s
//! plus the live balance mirrored from token transfers. A record
//! `{day, value}` says the account held `value` through the end of `day`;
//! any day after the last record resolves to the live balance.
//!
//! Records are only ever appended in day order. A second balance change on
//! the same day appends nothing: the earlier record already captured the
//! balance that was in effect before the day began changing.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LedgerError, SafeCastError};
use crate::safe_cast::to_u240;
use crate::traits::DailyBalances;
use crate::types::{Address, Amount, BalanceRecord, DayIndex};

/// In-memory daily balance ledger.
#[derive(Debug, Clone)]
pub struct BalanceLedger {
    /// First day with tracked history. Queries may not start earlier.
    initialization_day: DayIndex,
    /// Account → records, strictly increasing by day.
    records: HashMap<Address, Vec<BalanceRecord>>,
    /// Account → live balance.
    balances: HashMap<Address, Amount>,
}

impl BalanceLedger {
    pub fn new(initialization_day: DayIndex) -> Self {
        Self {
            initialization_day,
            records: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    /// Stored records for `account`, oldest first.
    pub fn records(&self, account: &Address) -> &[BalanceRecord] {
        self.records.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Work out which record, if any, a balance change on `day` would append.
    fn plan_record(
        &self,
        account: &Address,
        day: DayIndex,
        balance_before: Amount,
    ) -> Result<Option<BalanceRecord>, LedgerError> {
        if account.is_zero() || day <= self.initialization_day {
            return Ok(None);
        }
        let record_day = day - 1;
        if let Some(last) = self.records(account).last() {
            if last.day == record_day {
                return Ok(None);
            }
            if last.day > record_day {
                return Err(LedgerError::DayOutOfOrder { day: record_day, last: last.day });
            }
        }
        Ok(Some(BalanceRecord {
            day: record_day,
            value: to_u240(balance_before)?,
        }))
    }

    fn push_record(&mut self, account: Address, record: BalanceRecord) {
        debug!(%account, day = record.day, value = %record.value, "ledger: record created");
        self.records.entry(account).or_default().push(record);
    }

    /// Note that `account` held `balance_before` until a change on `day`.
    ///
    /// Appends `{day - 1, balance_before}` unless the account is the null
    /// address, `day` is not after the initialization day, or a record for
    /// `day - 1` already exists. Returns the appended record.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DayOutOfOrder`] if the last record is later than `day - 1`
    /// - [`LedgerError::SafeCast`] if `balance_before` exceeds 240 bits
    pub fn record(
        &mut self,
        account: &Address,
        day: DayIndex,
        balance_before: Amount,
    ) -> Result<Option<BalanceRecord>, LedgerError> {
        let planned = self.plan_record(account, day, balance_before)?;
        if let Some(record) = planned {
            self.push_record(*account, record);
        }
        Ok(planned)
    }

    /// Apply a completed token transfer observed on `day`.
    ///
    /// Records the pre-transfer balance of each non-null party and moves
    /// `amount` between the mirrored live balances. The null address is the
    /// mint/burn side and is neither recorded nor mirrored. Either everything
    /// applies or nothing does.
    pub fn after_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        day: DayIndex,
    ) -> Result<Vec<(Address, BalanceRecord)>, LedgerError> {
        if amount.is_zero() || from == to {
            return Ok(Vec::new());
        }

        let from_before = self.current_balance(from);
        let to_before = self.current_balance(to);
        if !from.is_zero() && from_before < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                have: from_before,
                need: amount,
            });
        }
        let to_after = if to.is_zero() {
            to_before
        } else {
            to_u240(to_before.checked_add(amount).ok_or(SafeCastError::Uint240Overflow)?)?
        };

        let mut appended = Vec::with_capacity(2);
        if let Some(record) = self.plan_record(from, day, from_before)? {
            appended.push((*from, record));
        }
        if let Some(record) = self.plan_record(to, day, to_before)? {
            appended.push((*to, record));
        }

        for (account, record) in &appended {
            self.push_record(*account, *record);
        }
        if !from.is_zero() {
            self.balances.insert(*from, from_before - amount);
        }
        if !to.is_zero() {
            self.balances.insert(*to, to_after);
        }
        Ok(appended)
    }

    /// One balance per day in `[from_day, to_day]`.
    ///
    /// Each day takes the value of the first record at or after it; days past
    /// the last record take the live balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::FromDayPriorInitDay`] if `from_day` precedes the initialization day
    /// - [`LedgerError::ToDayPriorFromDay`] if `to_day < from_day`
    pub fn query(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, LedgerError> {
        if from_day < self.initialization_day {
            return Err(LedgerError::FromDayPriorInitDay {
                from: from_day,
                init: self.initialization_day,
            });
        }
        if to_day < from_day {
            return Err(LedgerError::ToDayPriorFromDay { from: from_day, to: to_day });
        }

        let records = self.records(account);
        let live = self.current_balance(account);
        let mut index = records.partition_point(|r| r.day < from_day);
        let mut out = Vec::with_capacity((to_day - from_day) as usize + 1);
        for day in from_day..=to_day {
            while index < records.len() && records[index].day < day {
                index += 1;
            }
            out.push(records.get(index).map_or(live, |r| r.value));
        }
        Ok(out)
    }

    /// Drop every record of `account`. Its history collapses to the live balance.
    pub fn clear_records(&mut self, account: &Address) -> usize {
        let removed = self.records.remove(account).map_or(0, |r| r.len());
        debug!(%account, removed, "ledger: records cleared");
        removed
    }
}

impl DailyBalances for BalanceLedger {
    fn initialization_day(&self) -> DayIndex {
        self.initialization_day
    }

    fn daily_balances(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, LedgerError> {
        self.query(account, from_day, to_day)
    }

    fn current_balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_cast::max_u240;
    use proptest::prelude::*;

    const INIT: DayIndex = 100;

    fn a() -> Address {
        Address::repeat_byte(0xA0)
    }

    fn b() -> Address {
        Address::repeat_byte(0xB0)
    }

    fn amt(v: u128) -> Amount {
        Amount::from(v)
    }

    fn funded(balance: u128) -> BalanceLedger {
        let mut ledger = BalanceLedger::new(INIT);
        ledger.after_transfer(&Address::ZERO, &a(), amt(balance), INIT).unwrap();
        ledger
    }

    // --- record ---

    #[test]
    fn record_appends_previous_day() {
        let mut ledger = BalanceLedger::new(INIT);
        let rec = ledger.record(&a(), INIT + 2, amt(5)).unwrap();
        assert_eq!(rec, Some(BalanceRecord { day: INIT + 1, value: amt(5) }));
        assert_eq!(ledger.records(&a()), &[BalanceRecord { day: INIT + 1, value: amt(5) }]);
    }

    #[test]
    fn record_on_init_day_is_noop() {
        let mut ledger = BalanceLedger::new(INIT);
        assert_eq!(ledger.record(&a(), INIT, amt(5)).unwrap(), None);
        assert!(ledger.records(&a()).is_empty());
    }

    #[test]
    fn record_same_day_twice_is_noop() {
        let mut ledger = BalanceLedger::new(INIT);
        ledger.record(&a(), INIT + 3, amt(5)).unwrap();
        assert_eq!(ledger.record(&a(), INIT + 3, amt(9)).unwrap(), None);
        assert_eq!(ledger.records(&a()).len(), 1);
        assert_eq!(ledger.records(&a())[0].value, amt(5));
    }

    #[test]
    fn record_null_address_is_noop() {
        let mut ledger = BalanceLedger::new(INIT);
        assert_eq!(ledger.record(&Address::ZERO, INIT + 3, amt(5)).unwrap(), None);
        assert!(ledger.records(&Address::ZERO).is_empty());
    }

    #[test]
    fn record_out_of_order_rejected() {
        let mut ledger = BalanceLedger::new(INIT);
        ledger.record(&a(), INIT + 5, amt(5)).unwrap();
        assert_eq!(
            ledger.record(&a(), INIT + 3, amt(5)),
            Err(LedgerError::DayOutOfOrder { day: INIT + 2, last: INIT + 4 })
        );
    }

    #[test]
    fn record_value_over_240_bits_rejected() {
        let mut ledger = BalanceLedger::new(INIT);
        assert_eq!(
            ledger.record(&a(), INIT + 1, max_u240() + 1),
            Err(LedgerError::SafeCast(SafeCastError::Uint240Overflow))
        );
        assert!(ledger.records(&a()).is_empty());
    }

    // --- after_transfer ---

    #[test]
    fn transfer_records_both_parties() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&Address::ZERO, &b(), amt(50), INIT).unwrap();
        let appended = ledger.after_transfer(&a(), &b(), amt(100), INIT + 1).unwrap();
        assert_eq!(
            appended,
            vec![
                (a(), BalanceRecord { day: INIT, value: amt(1_000) }),
                (b(), BalanceRecord { day: INIT, value: amt(50) }),
            ]
        );
        assert_eq!(ledger.current_balance(&a()), amt(900));
        assert_eq!(ledger.current_balance(&b()), amt(150));
    }

    #[test]
    fn zero_amount_transfer_records_nothing() {
        let mut ledger = funded(1_000);
        let appended = ledger.after_transfer(&a(), &b(), Amount::zero(), INIT + 3).unwrap();
        assert!(appended.is_empty());
        assert!(ledger.records(&a()).is_empty());
        assert!(ledger.records(&b()).is_empty());
    }

    #[test]
    fn mint_records_only_recipient() {
        let mut ledger = BalanceLedger::new(INIT);
        let appended = ledger.after_transfer(&Address::ZERO, &a(), amt(10), INIT + 2).unwrap();
        assert_eq!(appended, vec![(a(), BalanceRecord { day: INIT + 1, value: amt(0) })]);
        assert!(ledger.records(&Address::ZERO).is_empty());
        assert_eq!(ledger.current_balance(&Address::ZERO), Amount::zero());
    }

    #[test]
    fn burn_records_only_sender() {
        let mut ledger = funded(1_000);
        let appended = ledger.after_transfer(&a(), &Address::ZERO, amt(10), INIT + 2).unwrap();
        assert_eq!(appended, vec![(a(), BalanceRecord { day: INIT + 1, value: amt(1_000) })]);
        assert_eq!(ledger.current_balance(&a()), amt(990));
    }

    #[test]
    fn overdraw_rejected_without_side_effects() {
        let mut ledger = funded(10);
        let err = ledger.after_transfer(&a(), &b(), amt(11), INIT + 2).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance { account: a(), have: amt(10), need: amt(11) }
        );
        assert!(ledger.records(&a()).is_empty());
        assert_eq!(ledger.current_balance(&a()), amt(10));
    }

    #[test]
    fn out_of_order_transfer_is_atomic() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&a(), &b(), amt(1), INIT + 5).unwrap();
        let err = ledger.after_transfer(&b(), &a(), amt(1), INIT + 2).unwrap_err();
        assert!(matches!(err, LedgerError::DayOutOfOrder { .. }));
        assert_eq!(ledger.current_balance(&a()), amt(999));
        assert_eq!(ledger.current_balance(&b()), amt(1));
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut ledger = funded(1_000);
        assert!(ledger.after_transfer(&a(), &a(), amt(5), INIT + 2).unwrap().is_empty());
        assert_eq!(ledger.current_balance(&a()), amt(1_000));
    }

    // --- query ---

    #[test]
    fn query_without_records_is_live_balance() {
        let ledger = funded(777);
        assert_eq!(ledger.query(&a(), INIT, INIT + 3).unwrap(), vec![amt(777); 4]);
    }

    #[test]
    fn query_forward_fills_between_records() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&a(), &b(), amt(100), INIT + 3).unwrap(); // {102: 1000}
        ledger.after_transfer(&a(), &b(), amt(100), INIT + 6).unwrap(); // {105: 900}
        let out = ledger.query(&a(), INIT, INIT + 7).unwrap();
        assert_eq!(
            out,
            vec![
                amt(1_000), amt(1_000), amt(1_000), // 100..=102
                amt(900), amt(900), amt(900),       // 103..=105
                amt(800), amt(800),                 // 106..=107 live
            ]
        );
    }

    #[test]
    fn query_range_after_last_record() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&a(), &b(), amt(100), INIT + 2).unwrap();
        assert_eq!(ledger.query(&a(), INIT + 4, INIT + 5).unwrap(), vec![amt(900); 2]);
    }

    #[test]
    fn query_single_day() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&a(), &b(), amt(100), INIT + 2).unwrap();
        assert_eq!(ledger.query(&a(), INIT + 1, INIT + 1).unwrap(), vec![amt(1_000)]);
    }

    #[test]
    fn query_before_init_rejected() {
        let ledger = BalanceLedger::new(INIT);
        assert_eq!(
            ledger.query(&a(), INIT - 1, INIT),
            Err(LedgerError::FromDayPriorInitDay { from: INIT - 1, init: INIT })
        );
    }

    #[test]
    fn query_inverted_range_rejected() {
        let ledger = BalanceLedger::new(INIT);
        assert_eq!(
            ledger.query(&a(), INIT + 2, INIT + 1),
            Err(LedgerError::ToDayPriorFromDay { from: INIT + 2, to: INIT + 1 })
        );
    }

    #[test]
    fn clear_records_collapses_history() {
        let mut ledger = funded(1_000);
        ledger.after_transfer(&a(), &b(), amt(100), INIT + 2).unwrap();
        assert_eq!(ledger.clear_records(&a()), 1);
        assert_eq!(ledger.query(&a(), INIT, INIT + 1).unwrap(), vec![amt(900); 2]);
    }

    proptest! {
        #[test]
        fn query_length_matches_range(from in INIT..INIT + 200, span in 0u16..200) {
            let ledger = funded(5);
            let out = ledger.query(&a(), from, from + span).unwrap();
            prop_assert_eq!(out.len(), span as usize + 1);
        }

        #[test]
        fn records_stay_strictly_increasing(days in proptest::collection::vec(1u16..50, 1..30)) {
            let mut ledger = funded(1_000_000);
            let mut day = INIT;
            for step in days {
                day += step % 3; // repeats the same day now and then
                ledger.after_transfer(&a(), &b(), amt(1), day).unwrap();
            }
            let records = ledger.records(&a());
            prop_assert!(records.windows(2).all(|w| w[0].day < w[1].day));
            prop_assert!(records.iter().all(|r| r.day < day.max(INIT + 1)));
        }
    }
}
