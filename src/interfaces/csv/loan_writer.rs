use crate::domain::loan::{Loan, LoanId, LoanStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// One line of the loan book.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct LoanRecord {
    pub loan: LoanId,
    pub principal: Decimal,
    pub rate: Decimal,
    pub installments: u32,
    pub installment_amount: Decimal,
    pub outstanding: Decimal,
    pub payments: usize,
    pub status: LoanStatus,
    pub delinquent: bool,
}

impl LoanRecord {
    /// Summarises `loan` as of `now`.
    pub fn new(loan: &Loan, now: DateTime<Utc>) -> Self {
        Self {
            loan: loan.id().clone(),
            principal: loan.principal().normalize(),
            rate: loan.interest_rate().normalize(),
            installments: loan.total_installments(),
            installment_amount: loan.installment_amount().normalize(),
            outstanding: loan.outstanding().normalize(),
            payments: loan.payments().len(),
            status: loan.status_at(now),
            delinquent: loan.is_delinquent_at(now),
        }
    }
}

/// Writes the final loan book as CSV or as a JSON array.
pub struct LoanBookWriter<W: Write> {
    sink: W,
    format: OutputFormat,
}

impl<W: Write> LoanBookWriter<W> {
    pub fn new(sink: W, format: OutputFormat) -> Self {
        Self { sink, format }
    }

    pub fn write_loans(&mut self, loans: &[Loan], now: DateTime<Utc>) -> Result<()> {
        let records: Vec<LoanRecord> = loans.iter().map(|loan| LoanRecord::new(loan, now)).collect();
        match self.format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut self.sink);
                if records.is_empty() {
                    writer.write_record(LOAN_BOOK_HEADER)?;
                }
                for record in &records {
                    writer.serialize(record)?;
                }
                writer.flush()?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.sink, &records)?;
                writeln!(self.sink)?;
            }
        }
        Ok(())
    }
}

const LOAN_BOOK_HEADER: [&str; 9] = [
    "loan",
    "principal",
    "rate",
    "installments",
    "installment_amount",
    "outstanding",
    "payments",
    "status",
    "delinquent",
];
