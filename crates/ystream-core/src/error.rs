//! Error types for the yield streamer.
use thiserror::Error;

use crate::types::{Address, Amount, DayIndex, GroupId};
use crate::traits::Capability;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafeCastError {
    #[error("value {value} does not fit in 16 bits")] Uint16Overflow { value: u64 },
    #[error("value does not fit in 240 bits")] Uint240Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("from day {from} is prior to initialization day {init}")] FromDayPriorInitDay { from: DayIndex, init: DayIndex },
    #[error("to day {to} is prior to from day {from}")] ToDayPriorFromDay { from: DayIndex, to: DayIndex },
    #[error("record day {day} is prior to last recorded day {last}")] DayOutOfOrder { day: DayIndex, last: DayIndex },
    #[error("insufficient balance for {account}: have {have}, need {need}")] InsufficientBalance { account: Address, have: Amount, need: Amount },
    #[error(transparent)] SafeCast(#[from] SafeCastError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("yield rate effective day is invalid")] YieldRateInvalidEffectiveDay,
    #[error("yield rate value is already configured")] YieldRateValueAlreadyConfigured,
    #[error("yield rate index {index} out of bounds ({len})")] YieldRateWrongIndex { index: usize, len: usize },
    #[error("yield rate record has no tiers")] YieldRateTiersEmpty,
    #[error("look-back period length is zero")] LookBackPeriodLengthZero,
    #[error("look-back period count limit {limit} reached")] LookBackPeriodCountLimit { limit: usize },
    #[error("look-back period effective day is invalid")] LookBackPeriodInvalidEffectiveDay,
    #[error("look-back period is already configured")] LookBackPeriodAlreadyConfigured,
    #[error("look-back period index {index} out of bounds ({len})")] LookBackPeriodWrongIndex { index: usize, len: usize },
    #[error("look-back period of {length} days cannot start on day {effective_day}")] LookBackPeriodInvalidParametersCombination { effective_day: DayIndex, length: u16 },
    #[error("account {account} is already in group {group}")] GroupAlreadyAssigned { account: Address, group: GroupId },
    #[error(transparent)] SafeCast(#[from] SafeCastError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccrualError {
    #[error("to day {to} is prior to from day {from}")] ToDayPriorFromDay { from: DayIndex, to: DayIndex },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error(transparent)] Ledger(#[from] LedgerError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("claim amount {amount} is below the minimum")] AmountBelowMinimum { amount: Amount },
    #[error("claim amount {amount} is not rounded")] AmountNonRounded { amount: Amount },
    #[error("claim rejected: shortfall of {shortfall}")] RejectionDueToShortfall { shortfall: Amount },
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("{caller} lacks the {capability:?} capability")] Unauthorized { caller: Address, capability: Capability },
    #[error("account {0} is blocklisted")] Blocklisted(Address),
    #[error("operations are paused")] Paused,
    #[error("caller {0} is not the tracked token")] UnauthorizedToken(Address),
    #[error("already archived")] AlreadyArchived,
    #[error("not archived")] NotArchived,
    #[error("streamer is archived")] Archived,
    #[error("streaming already stopped for {0}")] StreamingAlreadyStopped(Address),
    #[error("fee receiver is unchanged")] FeeReceiverUnchanged,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: Amount, need: Amount },
    #[error("transfer to the null address")] NullRecipient,
}

#[derive(Error, Debug)]
pub enum StreamerError {
    #[error(transparent)] SafeCast(#[from] SafeCastError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Schedule(#[from] ScheduleError),
    #[error(transparent)] Accrual(#[from] AccrualError),
    #[error(transparent)] Claim(#[from] ClaimError),
    #[error(transparent)] Access(#[from] AccessError),
    #[error(transparent)] Treasury(#[from] TreasuryError),
}
