//! Streamer configuration.
//!
//! [`StreamerConfig`] carries the token address, fee settings and accrual
//! limits. It is built programmatically from [`Default`] or loaded from a
//! TOML file layered with `YSTREAM_`-prefixed environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use ystream_core::constants::{DEFAULT_FEE_RATE, LOOK_BACK_PERIOD_COUNT_LIMIT};
use ystream_core::types::{Address, Amount, DayIndex};

/// Configuration for a yield streamer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// The only caller allowed to invoke the transfer hooks.
    pub token: Address,
    /// Ledger initialization day. `None` uses the clock's day at construction.
    pub initialization_day: Option<DayIndex>,
    /// Fee recipient. Without one the fee is withheld from the claimant.
    pub fee_receiver: Option<Address>,
    /// Fee rate, numerator over `RATE_FACTOR`.
    pub fee_rate: u64,
    /// Yield never accrues on the part of a daily balance above this.
    pub daily_balance_ceiling: Option<Amount>,
    /// Maximum number of look-back period records.
    pub look_back_count_limit: usize,
    /// Log level filter string (e.g. "info", "ystream_engine=debug").
    pub log_level: String,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            token: Address::ZERO,
            initialization_day: None,
            fee_receiver: None,
            fee_rate: DEFAULT_FEE_RATE,
            daily_balance_ceiling: None,
            look_back_count_limit: LOOK_BACK_PERIOD_COUNT_LIMIT,
            log_level: "info".to_string(),
        }
    }
}

impl StreamerConfig {
    /// Load from `path`, then apply `YSTREAM_*` environment overrides.
    ///
    /// Missing keys fall back to [`StreamerConfig::default`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("YSTREAM"))
            .build()?
            .try_deserialize()
    }
}
