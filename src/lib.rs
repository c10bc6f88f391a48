//! WhaleWatch - concurrent on-chain token anomaly monitor
//!
//! Six independent monitors poll market and chain data for a set of target
//! tokens and raise alerts on:
//! - Price, liquidity and market cap moves against a baseline
//! - Holders with an outsized share of supply
//! - Large transfers and repeat receivers
//! - New tokens launched by watched creators
//!
//! A supervisor restarts crashed monitors and flags stale ones. Read-only: no
//! wallet or trading functionality.

pub mod api;
pub mod config;
pub mod error;
pub mod modules;
pub mod supervisor;
pub mod utils;
