//! Claim preview math.
//!
//! A preview splits accrued yield since the last claim into:
//!
//! - **primary** yield: every fully elapsed day except the last one computed
//! - **stream** yield: the last computed day, prorated by the seconds already
//!   elapsed in the current day
//!
//! It then walks the primary days to find where a request of `amount` would
//! leave the account: the first day not fully paid (`next_claim_day`) and how
//! much of that day is already paid (`next_claim_debit`).
//!
//! Nothing here mutates state; the streamer applies the result.

use serde::{Deserialize, Serialize};

use ystream_accrual::calculator::{sum, AccrualCalculator};
use ystream_core::constants::{RATE_FACTOR, ROUNDING_COEF, SECONDS_PER_DAY};
use ystream_core::error::{ClaimError, StreamerError};
use ystream_core::types::{Address, Amount, ClaimAmount, ClaimState, DayIndex};

/// Outcome of a claim preview.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimResult {
    pub next_claim_day: DayIndex,
    pub next_claim_debit: Amount,
    pub first_yield_day: DayIndex,
    pub prev_claim_debit: Amount,
    pub primary_yield: Amount,
    pub stream_yield: Amount,
    /// Full, unprorated yield of the last computed day.
    pub last_day_yield: Amount,
    pub shortfall: Amount,
    pub fee: Amount,
    pub total_yield: Amount,
    pub claim_debit_exceeds_first_day_yield: bool,
}

impl ClaimResult {
    /// Result that leaves `state` untouched and pays nothing.
    ///
    /// An exact request is reported as fully short; pass [`ClaimAmount::All`]
    /// for a result with no shortfall.
    pub fn unchanged(state: ClaimState, amount: ClaimAmount) -> Self {
        let shortfall = match amount {
            ClaimAmount::All => Amount::zero(),
            ClaimAmount::Exact(requested) => requested,
        };
        Self {
            next_claim_day: state.day,
            next_claim_debit: state.debit,
            first_yield_day: state.day,
            prev_claim_debit: state.debit,
            primary_yield: Amount::zero(),
            stream_yield: Amount::zero(),
            last_day_yield: Amount::zero(),
            shortfall,
            fee: Amount::zero(),
            total_yield: Amount::zero(),
            claim_debit_exceeds_first_day_yield: false,
        }
    }

    /// Amount the claimant receives after the fee.
    pub fn net_yield(&self) -> Amount {
        self.total_yield.saturating_sub(self.fee)
    }

    /// State the account moves to if this result is applied.
    pub fn next_state(&self) -> ClaimState {
        ClaimState {
            day: self.next_claim_day,
            debit: self.next_claim_debit,
        }
    }
}

/// Record of an executed claim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub account: Address,
    pub total_yield: Amount,
    pub fee: Amount,
    /// `None` when the fee was withheld rather than paid out.
    pub fee_receiver: Option<Address>,
    pub previous_state: ClaimState,
    pub next_state: ClaimState,
}

impl ClaimReceipt {
    pub fn net_yield(&self) -> Amount {
        self.total_yield.saturating_sub(self.fee)
    }
}

/// Inputs of a single preview.
#[derive(Clone, Copy, Debug)]
pub struct PreviewParams {
    pub state: ClaimState,
    /// Last day whose yield is computed. Must not precede `state.day`.
    pub last_full_day: DayIndex,
    /// Seconds elapsed in the day after `last_full_day`.
    pub elapsed: u64,
    pub amount: ClaimAmount,
    pub fee_rate: u64,
}

/// Round down to a multiple of [`ROUNDING_COEF`].
pub fn round_down(amount: Amount) -> Amount {
    amount - amount % Amount::from(ROUNDING_COEF)
}

/// Round up to a multiple of [`ROUNDING_COEF`].
pub fn round_up(amount: Amount) -> Result<Amount, ClaimError> {
    let unit = Amount::from(ROUNDING_COEF);
    let rem = amount % unit;
    if rem.is_zero() {
        return Ok(amount);
    }
    (amount - rem)
        .checked_add(unit)
        .ok_or(ClaimError::ArithmeticOverflow)
}

pub fn is_rounded(amount: Amount) -> bool {
    (amount % Amount::from(ROUNDING_COEF)).is_zero()
}

/// `day_yield * elapsed / SECONDS_PER_DAY`, truncating.
pub fn prorate(day_yield: Amount, elapsed: u64) -> Result<Amount, ClaimError> {
    Ok(day_yield
        .checked_mul(Amount::from(elapsed))
        .ok_or(ClaimError::ArithmeticOverflow)?
        / Amount::from(SECONDS_PER_DAY))
}

/// Fee on `total`, rounded up and never above `total`.
pub fn fee_for(total: Amount, fee_rate: u64) -> Result<Amount, ClaimError> {
    if fee_rate == 0 || total.is_zero() {
        return Ok(Amount::zero());
    }
    let raw = total
        .checked_mul(Amount::from(fee_rate))
        .ok_or(ClaimError::ArithmeticOverflow)?
        / Amount::from(RATE_FACTOR);
    Ok(round_up(raw)?.min(total))
}

/// Find the claim state after paying `amount` out of `primary_days`, then
/// out of the last day.
fn settle(
    primary_days: &[Amount],
    amount: Amount,
    state: ClaimState,
    last_full_day: DayIndex,
) -> Result<(DayIndex, Amount), ClaimError> {
    let mut paid = Amount::zero();
    for (i, day_yield) in primary_days.iter().enumerate() {
        let through = paid
            .checked_add(*day_yield)
            .ok_or(ClaimError::ArithmeticOverflow)?;
        if through > amount {
            let mut debit = amount - paid;
            if i == 0 {
                debit = debit
                    .checked_add(state.debit)
                    .ok_or(ClaimError::ArithmeticOverflow)?;
            }
            return Ok((state.day + i as DayIndex, debit));
        }
        paid = through;
    }

    let mut debit = amount - paid;
    // Same-day claims keep paying down the day already in progress.
    if state.day == last_full_day {
        debit = debit
            .checked_add(state.debit)
            .ok_or(ClaimError::ArithmeticOverflow)?;
    }
    Ok((last_full_day, debit))
}

/// Preview a claim of `params.amount` for `account`.
///
/// # Errors
///
/// - [`AccrualError`](ystream_core::error::AccrualError) from the calculator
/// - [`ClaimError::ArithmeticOverflow`] if any sum or product overflows
pub fn preview(
    calculator: &AccrualCalculator<'_>,
    account: &Address,
    params: &PreviewParams,
) -> Result<ClaimResult, StreamerError> {
    let state = params.state;
    let same_day = state.day == params.last_full_day;
    let first_debit = if same_day { Amount::zero() } else { state.debit };
    let daily =
        calculator.calculate_yield_by_days(account, state.day, params.last_full_day, first_debit)?;

    let mut debit_exceeds = daily.claim_debit_exceeds_first_day_yield;
    let last_day_yield = daily.yields.last().copied().unwrap_or_default();
    let (primary_days, stream_yield) = if same_day {
        let gross = prorate(last_day_yield, params.elapsed)?;
        let stream = if gross >= state.debit {
            gross - state.debit
        } else {
            debit_exceeds = true;
            Amount::zero()
        };
        (&daily.yields[..0], stream)
    } else {
        let split = daily.yields.len() - 1;
        (&daily.yields[..split], prorate(last_day_yield, params.elapsed)?)
    };
    let primary_yield = sum(primary_days)?;
    let available = primary_yield
        .checked_add(stream_yield)
        .ok_or(ClaimError::ArithmeticOverflow)?;

    let mut result = ClaimResult {
        primary_yield,
        stream_yield,
        last_day_yield,
        claim_debit_exceeds_first_day_yield: debit_exceeds,
        ..ClaimResult::unchanged(state, ClaimAmount::All)
    };

    let requested = match params.amount {
        ClaimAmount::All => round_down(available),
        ClaimAmount::Exact(amount) if amount > available => {
            result.shortfall = amount - available;
            return Ok(result);
        }
        ClaimAmount::Exact(amount) => amount,
    };

    let (next_day, next_debit) = settle(primary_days, requested, state, params.last_full_day)?;
    result.next_claim_day = next_day;
    result.next_claim_debit = next_debit;
    result.total_yield = requested;
    result.fee = fee_for(requested, params.fee_rate)?;
    Ok(result)
}
