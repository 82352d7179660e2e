//! In-memory yield treasury.

use std::collections::HashMap;

use tracing::debug;

use ystream_core::error::TreasuryError;
use ystream_core::traits::YieldTreasury;
use ystream_core::types::{Address, Amount};

/// Treasury holding a single pool of yield funds.
///
/// Tracks what each recipient has been paid so tests and the replayer can
/// inspect payouts.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreasury {
    funds: Amount,
    paid: HashMap<Address, Amount>,
}

impl MemoryTreasury {
    pub fn new(funds: Amount) -> Self {
        Self {
            funds,
            paid: HashMap::new(),
        }
    }

    /// Add `amount` to the pool.
    pub fn fund(&mut self, amount: Amount) {
        self.funds = self.funds.saturating_add(amount);
    }

    /// Total paid out to `account` so far.
    pub fn paid_to(&self, account: &Address) -> Amount {
        self.paid.get(account).copied().unwrap_or_default()
    }
}

impl YieldTreasury for MemoryTreasury {
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), TreasuryError> {
        if to.is_zero() {
            return Err(TreasuryError::NullRecipient);
        }
        if self.funds < amount {
            return Err(TreasuryError::InsufficientFunds { have: self.funds, need: amount });
        }
        self.funds -= amount;
        let entry = self.paid.entry(*to).or_default();
        *entry = entry.saturating_add(amount);
        debug!(%to, %amount, "treasury: paid");
        Ok(())
    }

    fn available(&self) -> Amount {
        self.funds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(v: u64) -> Amount {
        Amount::from(v)
    }

    #[test]
    fn transfer_moves_funds() {
        let mut t = MemoryTreasury::new(amt(100));
        let to = Address::repeat_byte(1);
        t.transfer(&to, amt(40)).unwrap();
        t.transfer(&to, amt(10)).unwrap();
        assert_eq!(t.available(), amt(50));
        assert_eq!(t.paid_to(&to), amt(50));
    }

    #[test]
    fn transfer_beyond_funds_fails() {
        let mut t = MemoryTreasury::new(amt(5));
        let err = t.transfer(&Address::repeat_byte(1), amt(6)).unwrap_err();
        assert_eq!(err, TreasuryError::InsufficientFunds { have: amt(5), need: amt(6) });
        assert_eq!(t.available(), amt(5));
    }

    #[test]
    fn transfer_to_null_fails() {
        let mut t = MemoryTreasury::new(amt(5));
        assert_eq!(t.transfer(&Address::ZERO, amt(1)), Err(TreasuryError::NullRecipient));
    }

    #[test]
    fn fund_tops_up() {
        let mut t = MemoryTreasury::default();
        t.fund(amt(7));
        assert_eq!(t.available(), amt(7));
    }
}
