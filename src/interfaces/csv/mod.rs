pub mod ledger_reader;
pub mod loan_writer;
