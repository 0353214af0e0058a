use crate::domain::loan::LoanId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("loan not found: {0}")]
    NotFound(LoanId),
    #[error("loan with id {0} already exists")]
    Duplicate(LoanId),
    #[error("payment amount must be at least {minimum:.2} for {missed} missed payments")]
    InsufficientPayment { minimum: Decimal, missed: i64 },
    #[error("payment amount {actual} must be equal to the weekly payment {expected:.2}")]
    IncorrectPaymentAmount { expected: Decimal, actual: Decimal },
    #[error("loan is already fully paid")]
    AlreadySettled,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Ledger worker stopped before the entry was delivered")]
    WorkerStopped,
    #[error("Ledger worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LoanError>;
