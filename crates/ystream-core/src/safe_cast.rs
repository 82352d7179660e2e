//! Checked narrowing into the stored representation.
//!
//! Day indices are stored in 16 bits and values in 240 bits. Accumulators are
//! wider, so every value that crosses into storage goes through one of these
//! conversions and fails instead of truncating.

use crate::constants::STORED_VALUE_BITS;
use crate::error::SafeCastError;
use crate::types::{Amount, DayIndex};

/// Narrow a wide day value to a [`DayIndex`].
///
/// # Examples
///
/// ```
/// use ystream_core::safe_cast::to_u16;
/// assert_eq!(to_u16(65_535).unwrap(), u16::MAX);
/// assert!(to_u16(65_536).is_err());
/// ```
pub fn to_u16(value: u64) -> Result<DayIndex, SafeCastError> {
    DayIndex::try_from(value).map_err(|_| SafeCastError::Uint16Overflow { value })
}

/// Check that `value` fits in 240 bits and hand it back unchanged.
pub fn to_u240(value: Amount) -> Result<Amount, SafeCastError> {
    if value.bits() > STORED_VALUE_BITS {
        return Err(SafeCastError::Uint240Overflow);
    }
    Ok(value)
}

/// Largest value representable in storage: `2^240 - 1`.
pub fn max_u240() -> Amount {
    Amount::MAX >> (256 - STORED_VALUE_BITS)
}
