//! Shared helpers for scenario and adversarial tests.

use ystream_core::access::RoleRegistry;
use ystream_core::constants::{DEFAULT_GROUP, RATE_FACTOR};
use ystream_core::time::ManualClock;
use ystream_core::types::{Address, Amount, DayIndex, RateTier};
use ystream_engine::{MemoryTreasury, StreamerConfig, YieldStreamer};

pub type TestStreamer = YieldStreamer<RoleRegistry, MemoryTreasury, ManualClock>;

/// Treasury funding large enough that no test runs dry.
pub const TREASURY_FUNDS: u128 = 1_000_000_000_000_000_000;

/// Address whose bytes are all `seed`.
pub fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

/// Holds every capability.
pub fn owner() -> Address {
    addr(0x01)
}

/// The tracked token; the only caller accepted by the transfer hooks.
pub fn token() -> Address {
    addr(0x70)
}

pub fn amt(v: u128) -> Amount {
    Amount::from(v)
}

/// Daily rate of `p` percent over `RATE_FACTOR`.
pub fn percent(p: u64) -> Amount {
    Amount::from(RATE_FACTOR / 100 * p)
}

/// A streamer wired to in-memory collaborators plus a handle on its clock.
pub struct Harness {
    pub streamer: TestStreamer,
    pub clock: ManualClock,
}

impl Harness {
    /// Streamer initialized on `init_day` with the clock at its start.
    pub fn new(init_day: DayIndex) -> Self {
        Self::with_config(StreamerConfig {
            token: token(),
            initialization_day: Some(init_day),
            ..StreamerConfig::default()
        })
    }

    /// Streamer from `config`; the clock starts at the initialization day.
    pub fn with_config(config: StreamerConfig) -> Self {
        let clock = ManualClock::at_day(config.initialization_day.unwrap_or(0), 0);
        let streamer = TestStreamer::new(
            config,
            RoleRegistry::with_owner(owner()),
            MemoryTreasury::new(amt(TREASURY_FUNDS)),
            clock.clone(),
        )
        .unwrap();
        Self { streamer, clock }
    }

    /// Move the clock to `seconds` into shifted day `day`.
    pub fn at(&self, day: DayIndex, seconds: u64) {
        self.clock.set_day(day, seconds);
    }

    pub fn mint(&mut self, to: Address, amount: u128) {
        self.transfer(Address::ZERO, to, amount);
    }

    /// Run a token transfer through both hooks on the current day.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) {
        self.streamer
            .before_token_transfer(&token(), &from, &to, amt(amount))
            .unwrap();
        self.streamer
            .after_token_transfer(&token(), &from, &to, amt(amount))
            .unwrap();
    }

    /// Flat rate of `p` percent for the default group from `effective_day`.
    pub fn set_rate(&mut self, effective_day: DayIndex, p: u64) {
        self.streamer
            .configure_yield_rate(&owner(), DEFAULT_GROUP, effective_day, vec![RateTier::flat(percent(p))])
            .unwrap();
    }

    pub fn set_look_back(&mut self, effective_day: DayIndex, length: u16) {
        self.streamer
            .configure_look_back_period(&owner(), effective_day, length)
            .unwrap();
    }
}
