//! Core types: addresses, ledger records, schedules and claim state.
//!
//! Day indices are `u16` per storage convention. Values are carried as
//! [`Amount`] (a 256-bit accumulator) and narrowed to 240 bits whenever they
//! are persisted, see [`crate::safe_cast`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

pub use primitive_types::U256;

/// Token amounts, rates, yields and debits.
pub type Amount = U256;

/// Number of days since the Unix epoch, after the negative time shift.
pub type DayIndex = u16;

/// Identifier of a yield rate group.
pub type GroupId = u32;

/// A 20-byte account address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address. Mint and burn counterparty; never tracked.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Address whose bytes are all `seed`. Handy for fixtures.
    pub fn repeat_byte(seed: u8) -> Self {
        Self([seed; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Balance of an account in effect through the end of `day`.
///
/// Recorded only when the balance changes; the ledger keeps these in
/// strictly increasing `day` order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceRecord {
    pub day: DayIndex,
    pub value: Amount,
}

/// One step of a graduated yield rate.
///
/// The tier applies to the next `cap` units of balance. A `cap` of zero,
/// or the last tier of a record, is unbounded.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateTier {
    /// Daily rate, numerator over [`RATE_FACTOR`](crate::constants::RATE_FACTOR).
    pub rate: Amount,
    pub cap: Amount,
}

impl RateTier {
    /// A single unbounded tier.
    pub fn flat(rate: Amount) -> Self {
        Self { rate, cap: Amount::zero() }
    }
}

/// Tiered yield rate effective from `effective_day` until the next record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct YieldRateRecord {
    pub effective_day: DayIndex,
    pub tiers: Vec<RateTier>,
}

/// Look-back window length effective from `effective_day` until the next record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookBackPeriodRecord {
    pub effective_day: DayIndex,
    pub length: u16,
}

/// Per-account claim progress.
///
/// `day` is the first day whose yield is not fully paid out; `debit` is the
/// part of that day's yield already paid.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClaimState {
    pub day: DayIndex,
    pub debit: Amount,
}

/// Amount requested from a claim or claim preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimAmount {
    /// Everything available, rounded down to the rounding unit.
    All,
    Exact(Amount),
}

impl From<Amount> for ClaimAmount {
    fn from(amount: Amount) -> Self {
        Self::Exact(amount)
    }
}
