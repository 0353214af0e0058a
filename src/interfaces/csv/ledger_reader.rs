use crate::domain::loan::{
    DEFAULT_INTEREST_RATE, DEFAULT_PRINCIPAL, DEFAULT_TOTAL_INSTALLMENTS, LoanConfig, LoanId,
    LoanOptions,
};
use crate::error::{LoanError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Open,
    Pay,
}

/// One row of a loan ledger.
///
/// `open` rows may carry loan terms; any term left empty falls back to the
/// default config. `pay` rows need a loan id and an amount.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerEntry {
    pub r#type: EntryType,
    #[serde(default)]
    pub loan: Option<LoanId>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub principal: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub installments: Option<u32>,
}

impl LedgerEntry {
    /// Builds the options for an `open` row.
    pub fn loan_options(&self) -> Result<LoanOptions> {
        let config = LoanConfig::new(
            self.principal.unwrap_or(DEFAULT_PRINCIPAL),
            self.rate.unwrap_or(DEFAULT_INTEREST_RATE),
            self.installments.unwrap_or(DEFAULT_TOTAL_INSTALLMENTS),
        )?;
        let options = LoanOptions::new().with_config(config);
        Ok(match &self.loan {
            Some(id) => options.with_id(id.clone()),
            None => options,
        })
    }

    /// The `(loan, amount)` pair of a `pay` row.
    pub fn payment(&self) -> Result<(&LoanId, Decimal)> {
        let loan = self
            .loan
            .as_ref()
            .ok_or_else(|| LoanError::Validation("payment missing loan id".to_string()))?;
        let amount = self
            .amount
            .ok_or_else(|| LoanError::Validation("payment missing amount".to_string()))?;
        Ok((loan, amount))
    }
}

/// Reads ledger entries from a CSV source.
///
/// Whitespace is trimmed and short records are accepted, so trailing empty
/// columns can be left out.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LedgerReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes entries, one `Result` per row.
    pub fn entries(self) -> impl Iterator<Item = Result<LedgerEntry>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LoanError::from))
    }
}
