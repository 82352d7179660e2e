//! JSON scenario replay.
//!
//! A scenario is a list of timestamped steps applied in order to a fresh
//! streamer backed by in-memory collaborators. Every step yields one report
//! entry; a failing step records its error and the replay carries on.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use ystream_core::access::RoleRegistry;
use ystream_core::error::StreamerError;
use ystream_core::time::ManualClock;
use ystream_core::types::{Address, Amount, DayIndex, GroupId, RateTier};
use ystream_engine::{MemoryTreasury, StreamerConfig, YieldStreamer};

type Streamer = YieldStreamer<RoleRegistry, MemoryTreasury, ManualClock>;

fn default_owner() -> Address {
    Address::repeat_byte(0x01)
}

fn default_funds() -> u128 {
    1_000_000_000_000_000_000_000_000
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<StreamerConfig>,
    /// Holds every capability for administrative steps.
    #[serde(default = "default_owner")]
    pub owner: Address,
    #[serde(default = "default_funds")]
    pub treasury_funds: u128,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub day: DayIndex,
    #[serde(default)]
    pub seconds: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub struct TierSpec {
    pub rate: u128,
    #[serde(default)]
    pub cap: u128,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Mint { to: Address, amount: u128 },
    Burn { from: Address, amount: u128 },
    Transfer { from: Address, to: Address, amount: u128 },
    YieldRate {
        #[serde(default)]
        group: GroupId,
        effective_day: DayIndex,
        tiers: Vec<TierSpec>,
    },
    LookBack { effective_day: DayIndex, length: u16 },
    AssignGroup { group: GroupId, accounts: Vec<Address> },
    StopStreaming { accounts: Vec<Address> },
    Archive,
    Unarchive,
    /// Omitting `amount` previews claiming everything.
    Preview {
        account: Address,
        amount: Option<u128>,
    },
    /// Omitting `amount` claims everything.
    Claim {
        account: Address,
        amount: Option<u128>,
    },
    Balances {
        account: Address,
        from_day: DayIndex,
        to_day: DayIndex,
    },
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub day: DayIndex,
    pub seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Scenario {
    /// Build the streamer and run every step.
    pub fn replay(self) -> Result<Vec<StepReport>> {
        let config = self.config.unwrap_or_default();
        let token = config.token;
        let clock = ManualClock::at_day(config.initialization_day.unwrap_or(0), 0);
        let mut streamer = Streamer::new(
            config,
            RoleRegistry::with_owner(self.owner),
            MemoryTreasury::new(Amount::from(self.treasury_funds)),
            clock.clone(),
        )?;

        let mut reports = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.into_iter().enumerate() {
            clock.set_day(step.day, step.seconds);
            let outcome = apply(&mut streamer, &self.owner, &token, step.action);
            let (result, error) = match outcome {
                Ok(value) => (Some(value), None),
                Err(e) => {
                    warn!(index, error = %e, "scenario: step failed");
                    (None, Some(e.to_string()))
                }
            };
            reports.push(StepReport {
                index,
                day: step.day,
                seconds: step.seconds,
                result,
                error,
            });
        }
        Ok(reports)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn transfer(
    streamer: &mut Streamer,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
) -> Result<Value, StreamerError> {
    let amount = Amount::from(amount);
    streamer.before_token_transfer(token, from, to, amount)?;
    let records = streamer.after_token_transfer(token, from, to, amount)?;
    Ok(Value::from(records.len()))
}

fn apply(
    streamer: &mut Streamer,
    owner: &Address,
    token: &Address,
    action: Action,
) -> Result<Value> {
    let value = match action {
        Action::Mint { to, amount } => transfer(streamer, token, &Address::ZERO, &to, amount)?,
        Action::Burn { from, amount } => transfer(streamer, token, &from, &Address::ZERO, amount)?,
        Action::Transfer { from, to, amount } => transfer(streamer, token, &from, &to, amount)?,
        Action::YieldRate { group, effective_day, tiers } => {
            let tiers = tiers
                .into_iter()
                .map(|t| RateTier { rate: Amount::from(t.rate), cap: Amount::from(t.cap) })
                .collect();
            streamer.configure_yield_rate(owner, group, effective_day, tiers)?;
            to_json(streamer.get_group_yield_rates(group))?
        }
        Action::LookBack { effective_day, length } => {
            streamer.configure_look_back_period(owner, effective_day, length)?;
            to_json(streamer.get_look_back_periods())?
        }
        Action::AssignGroup { group, accounts } => {
            streamer.assign_account_group(owner, group, &accounts)?;
            Value::Null
        }
        Action::StopStreaming { accounts } => {
            streamer.stop_streaming_for(owner, &accounts)?;
            Value::Null
        }
        Action::Archive => {
            streamer.archive(owner)?;
            Value::Null
        }
        Action::Unarchive => {
            streamer.unarchive(owner)?;
            Value::Null
        }
        Action::Preview { account, amount } => match amount {
            Some(amount) => to_json(&streamer.claim_preview(&account, Amount::from(amount))?)?,
            None => to_json(&streamer.claim_all_preview(&account)?)?,
        },
        Action::Claim { account, amount } => match amount {
            Some(amount) => to_json(&streamer.claim(&account, Amount::from(amount))?)?,
            None => to_json(&streamer.claim_all(&account)?)?,
        },
        Action::Balances { account, from_day, to_day } => {
            to_json(&streamer.get_daily_balances(&account, from_day, to_day)?)?
        }
    };
    Ok(value)
}
