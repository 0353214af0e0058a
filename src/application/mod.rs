//! Application layer orchestrating loans.
//!
//! `LoanRegistry` is the entry point for every loan operation: it owns the
//! loans and serializes access to each of them. `LedgerProcessor` replays a
//! ledger against a registry using sharded tokio workers connected by
//! channels, one loan always landing on the same worker.

pub mod processor;
pub mod registry;
