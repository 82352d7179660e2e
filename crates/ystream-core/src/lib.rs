//! # ystream-core
//! Foundation types, traits and the daily balance ledger for the yield streamer.

pub mod access;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod safe_cast;
pub mod time;
pub mod traits;
pub mod types;
