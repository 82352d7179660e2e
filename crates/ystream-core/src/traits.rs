//! Trait interfaces for the yield streamer.
//!
//! These traits define the seams between the streamer and its collaborators:
//! - [`AccessControl`]: capability checks, blocklist and pause state
//! - [`DailyBalances`]: historical balance queries (the ledger implements)
//! - [`YieldTreasury`]: pays out claimed yield and fees
//! - [`Clock`]: current Unix time

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, TreasuryError};
use crate::types::{Address, Amount, DayIndex};

/// Administrative capabilities granted by the access-control collaborator.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Schedules, fee receiver, archive toggle.
    Owner,
    /// Pause and unpause.
    Pauser,
    /// Recovery of stray funds.
    Rescuer,
    /// Blocklist, group assignment, stop-streaming.
    Blocklister,
}

/// Authorization predicate consumed by the streamer.
///
/// Role storage lives with the implementor; the streamer only asks questions.
pub trait AccessControl {
    fn has_capability(&self, caller: &Address, capability: Capability) -> bool;

    fn is_blocklisted(&self, account: &Address) -> bool;

    fn is_paused(&self) -> bool;
}

/// Read-only view of per-account daily balances.
///
/// Implemented by [`BalanceLedger`](crate::ledger::BalanceLedger).
pub trait DailyBalances {
    /// First day the ledger has knowledge of.
    fn initialization_day(&self) -> DayIndex;

    /// One balance per day in `[from_day, to_day]`, forward filled.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::FromDayPriorInitDay`] if `from_day` precedes the initialization day
    /// - [`LedgerError::ToDayPriorFromDay`] if `to_day < from_day`
    fn daily_balances(
        &self,
        account: &Address,
        from_day: DayIndex,
        to_day: DayIndex,
    ) -> Result<Vec<Amount>, LedgerError>;

    /// Live balance right now.
    fn current_balance(&self, account: &Address) -> Amount;
}

/// Source of yield payouts.
pub trait YieldTreasury {
    /// Transfer `amount` of the yield token to `to`.
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), TreasuryError>;

    /// Funds still available for payouts.
    fn available(&self) -> Amount;
}

/// Source of the current Unix timestamp in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}
