//! # ystream-accrual — Rate schedules and daily yield accrual.
//!
//! All calculations use integer arithmetic only, truncating like the stored
//! representation does.
//!
//! - **Schedules**: effective-day indexed tables of tiered yield rates (per
//!   group) and look-back window lengths (global), with append, in-place
//!   update and reset.
//! - **Tiers**: graduated rates, each tier covering the next `cap` units of
//!   balance.
//! - **Calculator**: per-day yield on the minimum balance over the trailing
//!   look-back window, with unclaimed yield re-invested into the balances of
//!   the following days.

pub mod calculator;
pub mod schedule;
pub mod tiers;

pub use calculator::{AccrualCalculator, DailyYield};
pub use schedule::{LookBackSchedule, YieldRateSchedule, DEFAULT_LOOK_BACK_LENGTH};
pub use tiers::tiered_yield;
