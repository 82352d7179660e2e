//! # ystream-engine — Claim engine and streamer composition.
//!
//! Wires the ledger, schedules and accrual calculator into a single
//! [`streamer::YieldStreamer`]:
//! - [`claim`]: preview math (primary/stream split, debit walk, fee)
//! - [`streamer::YieldStreamer`]: per-account claim state, transfer hooks,
//!   administrative setters and the query surface
//! - [`config::StreamerConfig`]: streamer configuration
//! - [`treasury::MemoryTreasury`]: in-memory payout source

pub mod claim;
pub mod config;
pub mod streamer;
pub mod treasury;

pub use claim::{ClaimReceipt, ClaimResult};
pub use config::StreamerConfig;
pub use streamer::YieldStreamer;
pub use treasury::MemoryTreasury;
