//! Input and output adapters for the ledger CLI.

pub mod csv;
