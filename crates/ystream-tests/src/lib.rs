//! Scenario and adversarial test suite for ystream.
//!
//! Integration tests drive a full [`YieldStreamer`](ystream_engine::YieldStreamer)
//! through the transfer hooks and the claim surface, the way a token and its
//! holders would, and check the ledger and claim invariants end to end.

pub mod helpers;
