//! The yield streamer.
//!
//! [`YieldStreamer`] owns the balance ledger, the schedules and the
//! per-account claim state, and talks to three collaborators: access control,
//! the payout treasury and the clock. Every mutating entry point validates
//! everything first and only then mutates, so a failed call leaves no trace.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use ystream_accrual::{AccrualCalculator, DailyYield, LookBackSchedule, YieldRateSchedule};
use ystream_core::constants::{DEFAULT_GROUP, MIN_CLAIM_AMOUNT};
use ystream_core::error::{
    AccessError, AccrualError, ClaimError, ScheduleError, StreamerError, TreasuryError,
};
use ystream_core::ledger::BalanceLedger;
use ystream_core::safe_cast::to_u240;
use ystream_core::time::{day_and_time, shifted, split_shifted};
use ystream_core::traits::{AccessControl, Capability, Clock, DailyBalances, YieldTreasury};
use ystream_core::types::{
    Address, Amount, BalanceRecord, ClaimAmount, ClaimState, DayIndex, GroupId,
    LookBackPeriodRecord, RateTier, YieldRateRecord,
};

use crate::claim::{self, is_rounded, ClaimReceipt, ClaimResult, PreviewParams};
use crate::config::StreamerConfig;

static NO_RATES: YieldRateSchedule = YieldRateSchedule::new();

/// Yield streamer over a single tracked token.
pub struct YieldStreamer<A, T, C> {
    config: StreamerConfig,
    ledger: BalanceLedger,
    look_back: LookBackSchedule,
    /// Group → tiered rate schedule.
    rates: HashMap<GroupId, YieldRateSchedule>,
    /// Account → group. Absent means [`DEFAULT_GROUP`].
    groups: HashMap<Address, GroupId>,
    claims: HashMap<Address, ClaimState>,
    /// Account → shifted timestamp at which its stream stopped.
    stop_times: HashMap<Address, u64>,
    archived: bool,
    access: A,
    treasury: T,
    clock: C,
}

impl<A, T, C> YieldStreamer<A, T, C>
where
    A: AccessControl,
    T: YieldTreasury,
    C: Clock,
{
    /// Create a streamer. The ledger starts on `config.initialization_day`,
    /// or on the clock's current day when unset.
    pub fn new(
        config: StreamerConfig,
        access: A,
        treasury: T,
        clock: C,
    ) -> Result<Self, StreamerError> {
        let init_day = match config.initialization_day {
            Some(day) => day,
            None => day_and_time(clock.now())?.0,
        };
        info!(init_day, token = %config.token, "streamer: initialized");
        Ok(Self {
            ledger: BalanceLedger::new(init_day),
            look_back: LookBackSchedule::with_limit(config.look_back_count_limit),
            rates: HashMap::new(),
            groups: HashMap::new(),
            claims: HashMap::new(),
            stop_times: HashMap::new(),
            archived: false,
            config,
            access,
            treasury,
            clock,
        })
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut A {
        &mut self.access
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    // ------------------------------------------------------------------
    // Gates
    // ------------------------------------------------------------------

    fn require(&self, caller: &Address, capability: Capability) -> Result<(), AccessError> {
        if self.access.has_capability(caller, capability) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { caller: *caller, capability })
        }
    }

    fn require_token(&self, caller: &Address) -> Result<(), AccessError> {
        if *caller == self.config.token {
            Ok(())
        } else {
            Err(AccessError::UnauthorizedToken(*caller))
        }
    }

    fn require_claimable(&self, caller: &Address) -> Result<(), AccessError> {
        if self.access.is_paused() {
            return Err(AccessError::Paused);
        }
        if self.archived {
            return Err(AccessError::Archived);
        }
        if self.access.is_blocklisted(caller) {
            return Err(AccessError::Blocklisted(*caller));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Day and time
    // ------------------------------------------------------------------

    /// Current shifted day and seconds elapsed in it.
    pub fn day_and_time(&self) -> Result<(DayIndex, u64), StreamerError> {
        Ok(day_and_time(self.clock.now())?)
    }

    fn current_day(&self) -> Result<DayIndex, StreamerError> {
        Ok(self.day_and_time()?.0)
    }

    // ------------------------------------------------------------------
    // Transfer hooks
    // ------------------------------------------------------------------

    /// Hook run before a token transfer. Only the tracked token may call it.
    pub fn before_token_transfer(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), StreamerError> {
        self.require_token(caller)?;
        debug!(%from, %to, %amount, "streamer: before transfer");
        Ok(())
    }

    /// Hook run after a token transfer. Records pre-transfer balances and
    /// mirrors the move into the ledger.
    pub fn after_token_transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Vec<(Address, BalanceRecord)>, StreamerError> {
        self.require_token(caller)?;
        let day = self.current_day()?;
        Ok(self.ledger.after_transfer(from, to, amount, day)?)
    }

    // ------------------------------------------------------------------
    // Accrual
    // ------------------------------------------------------------------

    fn rates_for_group(&self, group: GroupId) -> &YieldRateSchedule {
        self.rates.get(&group).unwrap_or(&NO_RATES)
    }

    fn calculator_for(&self, account: &Address) -> AccrualCalculator<'_> {
        AccrualCalculator::new(
            &self.ledger,
            self.rates_for_group(self.get_account_group(account)),
            &self.look_back,
        )
        .with_balance_ceiling(self.config.daily_balance_ceiling)
    }

    /// Yield of each day in `[from_day, to_day]` under the account's group rates.
    pub fn calculate_yield_by_days(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
        claim_debit: Amount,
    ) -> Result<DailyYield, StreamerError> {
        Ok(self
            .calculator_for(account)
            .calculate_yield_by_days(account, from_day, to_day, claim_debit)?)
    }

    /// Ledger balances for `[from_day, to_day]`.
    pub fn get_daily_balances(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, StreamerError> {
        Ok(self.ledger.query(account, from_day, to_day)?)
    }

    /// Ledger balances for `[from_day, to_day]`, each plus the yield accrued
    /// and unclaimed on the days before it.
    pub fn get_daily_balances_with_yield(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, StreamerError> {
        let mut out = self.ledger.query(account, from_day, to_day)?;
        let state = self.get_last_claim_details(account);
        if to_day <= state.day {
            return Ok(out);
        }

        let daily = self.calculate_yield_by_days(account, state.day, to_day - 1, state.debit)?;
        let mut accrued = Amount::zero();
        for (day, day_yield) in (state.day..to_day).zip(daily.yields) {
            accrued = accrued
                .checked_add(day_yield)
                .ok_or(AccrualError::ArithmeticOverflow)?;
            if day + 1 >= from_day {
                let slot = &mut out[(day + 1 - from_day) as usize];
                *slot = slot
                    .checked_add(accrued)
                    .ok_or(AccrualError::ArithmeticOverflow)?;
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    pub fn get_last_claim_details(&self, account: &Address) -> ClaimState {
        self.claims.get(account).copied().unwrap_or(ClaimState {
            day: self.ledger.initialization_day(),
            debit: Amount::zero(),
        })
    }

    fn preview(
        &self,
        account: &Address,
        amount: ClaimAmount,
    ) -> Result<ClaimResult, StreamerError> {
        let state = self.get_last_claim_details(account);
        if self.archived {
            return Ok(ClaimResult::unchanged(state, ClaimAmount::All));
        }

        let mut now = shifted(self.clock.now());
        if let Some(stop) = self.stop_times.get(account) {
            now = now.min(*stop);
        }
        let (day, elapsed) = split_shifted(now)?;
        let last_full_day = match day.checked_sub(1) {
            Some(last) if last >= state.day => last,
            _ => return Ok(ClaimResult::unchanged(state, amount)),
        };

        let params = PreviewParams {
            state,
            last_full_day,
            elapsed,
            amount,
            fee_rate: self.config.fee_rate,
        };
        claim::preview(&self.calculator_for(account), account, &params)
    }

    /// Preview claiming exactly `amount` for `account`.
    pub fn claim_preview(
        &self,
        account: &Address,
        amount: Amount,
    ) -> Result<ClaimResult, StreamerError> {
        self.preview(account, ClaimAmount::Exact(amount))
    }

    /// Preview claiming everything available, rounded down.
    pub fn claim_all_preview(&self, account: &Address) -> Result<ClaimResult, StreamerError> {
        self.preview(account, ClaimAmount::All)
    }

    /// Claim exactly `amount` of accrued yield for `caller`.
    ///
    /// # Errors
    ///
    /// - [`AccessError::Paused`] / [`AccessError::Archived`] / [`AccessError::Blocklisted`]
    /// - [`ClaimError::AmountBelowMinimum`] if `amount < MIN_CLAIM_AMOUNT`
    /// - [`ClaimError::AmountNonRounded`] if `amount` is not a multiple of the rounding unit
    /// - [`ClaimError::RejectionDueToShortfall`] if less than `amount` is available
    pub fn claim(
        &mut self,
        caller: &Address,
        amount: Amount,
    ) -> Result<ClaimReceipt, StreamerError> {
        self.require_claimable(caller)?;
        if amount < Amount::from(MIN_CLAIM_AMOUNT) {
            return Err(ClaimError::AmountBelowMinimum { amount }.into());
        }
        if !is_rounded(amount) {
            return Err(ClaimError::AmountNonRounded { amount }.into());
        }

        let result = self.claim_preview(caller, amount)?;
        if !result.shortfall.is_zero() {
            return Err(ClaimError::RejectionDueToShortfall { shortfall: result.shortfall }.into());
        }
        self.settle(caller, &result)
    }

    /// Claim everything available for `caller`, rounded down.
    pub fn claim_all(&mut self, caller: &Address) -> Result<ClaimReceipt, StreamerError> {
        self.require_claimable(caller)?;
        let result = self.claim_all_preview(caller)?;
        if result.total_yield < Amount::from(MIN_CLAIM_AMOUNT) {
            return Err(ClaimError::AmountBelowMinimum { amount: result.total_yield }.into());
        }
        self.settle(caller, &result)
    }

    /// Pay out `result` and advance the claim state.
    fn settle(
        &mut self,
        account: &Address,
        result: &ClaimResult,
    ) -> Result<ClaimReceipt, StreamerError> {
        let previous_state = self.get_last_claim_details(account);
        let next_state = ClaimState {
            day: result.next_claim_day,
            debit: to_u240(result.next_claim_debit)?,
        };

        let fee_receiver = self.config.fee_receiver.filter(|_| !result.fee.is_zero());
        let net = result.net_yield();
        let outflow = if fee_receiver.is_some() { result.total_yield } else { net };
        let available = self.treasury.available();
        if available < outflow {
            return Err(TreasuryError::InsufficientFunds { have: available, need: outflow }.into());
        }

        self.treasury.transfer(account, net)?;
        if let Some(receiver) = fee_receiver {
            self.treasury.transfer(&receiver, result.fee)?;
        }
        self.claims.insert(*account, next_state);

        info!(
            %account,
            total = %result.total_yield,
            fee = %result.fee,
            next_day = next_state.day,
            next_debit = %next_state.debit,
            "streamer: claim"
        );
        Ok(ClaimReceipt {
            account: *account,
            total_yield: result.total_yield,
            fee: result.fee,
            fee_receiver,
            previous_state,
            next_state,
        })
    }

    // ------------------------------------------------------------------
    // Stop streaming and groups (Blocklister)
    // ------------------------------------------------------------------

    /// Freeze accrual for `accounts` at the current time.
    pub fn stop_streaming_for(
        &mut self,
        caller: &Address,
        accounts: &[Address],
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Blocklister)?;
        let mut seen = HashSet::new();
        for account in accounts {
            if self.stop_times.contains_key(account) || !seen.insert(*account) {
                return Err(AccessError::StreamingAlreadyStopped(*account).into());
            }
        }

        let stop = shifted(self.clock.now());
        for account in accounts {
            self.stop_times.insert(*account, stop);
            info!(%account, stop, "streamer: streaming stopped");
        }
        Ok(())
    }

    /// Shifted timestamp at which streaming stopped for `account`.
    pub fn get_stop_streaming_time(&self, account: &Address) -> Option<u64> {
        self.stop_times.get(account).copied()
    }

    /// Move `accounts` into `group`.
    pub fn assign_account_group(
        &mut self,
        caller: &Address,
        group: GroupId,
        accounts: &[Address],
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Blocklister)?;
        let mut seen = HashSet::new();
        for account in accounts {
            if self.get_account_group(account) == group || !seen.insert(*account) {
                return Err(ScheduleError::GroupAlreadyAssigned { account: *account, group }.into());
            }
        }

        for account in accounts {
            self.groups.insert(*account, group);
            info!(%account, group, "streamer: group assigned");
        }
        Ok(())
    }

    pub fn get_account_group(&self, account: &Address) -> GroupId {
        self.groups.get(account).copied().unwrap_or(DEFAULT_GROUP)
    }

    // ------------------------------------------------------------------
    // Schedules (Owner)
    // ------------------------------------------------------------------

    pub fn configure_yield_rate(
        &mut self,
        caller: &Address,
        group: GroupId,
        effective_day: DayIndex,
        tiers: Vec<RateTier>,
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        self.rates.entry(group).or_default().add(effective_day, tiers)?;
        Ok(())
    }

    pub fn update_yield_rate(
        &mut self,
        caller: &Address,
        group: GroupId,
        index: usize,
        effective_day: DayIndex,
        tiers: Vec<RateTier>,
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        match self.rates.get_mut(&group) {
            Some(schedule) => schedule.update(index, effective_day, tiers)?,
            None => return Err(ScheduleError::YieldRateWrongIndex { index, len: 0 }.into()),
        }
        Ok(())
    }

    /// Remove every rate record of `group`. Returns how many were removed.
    pub fn delete_yield_rates(
        &mut self,
        caller: &Address,
        group: GroupId,
    ) -> Result<usize, StreamerError> {
        self.require(caller, Capability::Owner)?;
        Ok(self.rates.get_mut(&group).map_or(0, YieldRateSchedule::clear))
    }

    pub fn get_group_yield_rates(&self, group: GroupId) -> &[YieldRateRecord] {
        self.rates_for_group(group).records()
    }

    pub fn get_account_yield_rates(&self, account: &Address) -> &[YieldRateRecord] {
        self.get_group_yield_rates(self.get_account_group(account))
    }

    pub fn configure_look_back_period(
        &mut self,
        caller: &Address,
        effective_day: DayIndex,
        length: u16,
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        self.look_back.configure(effective_day, length)?;
        Ok(())
    }

    pub fn update_look_back_period(
        &mut self,
        caller: &Address,
        index: usize,
        effective_day: DayIndex,
        length: u16,
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        self.look_back.update(index, effective_day, length)?;
        Ok(())
    }

    pub fn get_look_back_periods(&self) -> &[LookBackPeriodRecord] {
        self.look_back.records()
    }

    // ------------------------------------------------------------------
    // Administration (Owner)
    // ------------------------------------------------------------------

    pub fn set_fee_receiver(
        &mut self,
        caller: &Address,
        receiver: Option<Address>,
    ) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        if self.config.fee_receiver == receiver {
            return Err(AccessError::FeeReceiverUnchanged.into());
        }
        self.config.fee_receiver = receiver;
        info!(?receiver, "streamer: fee receiver set");
        Ok(())
    }

    /// Stop all accrual. Previews return zero until unarchived.
    pub fn archive(&mut self, caller: &Address) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        if self.archived {
            return Err(AccessError::AlreadyArchived.into());
        }
        self.archived = true;
        info!("streamer: archived");
        Ok(())
    }

    pub fn unarchive(&mut self, caller: &Address) -> Result<(), StreamerError> {
        self.require(caller, Capability::Owner)?;
        if !self.archived {
            return Err(AccessError::NotArchived.into());
        }
        self.archived = false;
        info!("streamer: unarchived");
        Ok(())
    }

    /// Drop the balance history of `account`. Returns the number of records removed.
    pub fn reset_daily_balances(
        &mut self,
        caller: &Address,
        account: &Address,
    ) -> Result<usize, StreamerError> {
        self.require(caller, Capability::Owner)?;
        let removed = self.ledger.clear_records(account);
        info!(%account, removed, "streamer: daily balances reset");
        Ok(removed)
    }
}
