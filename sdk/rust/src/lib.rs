//! Client for services hosted by route-ledger.

pub mod client;

pub use client::{ClientError, LedgerClient, LedgerResponse};
