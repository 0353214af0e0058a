use crate::domain::loan::{Loan, LoanId, LoanOptions, LoanStatus};
use crate::domain::ports::ClockBox;
use crate::error::{LoanError, Result};
use crate::infrastructure::clock::SystemClock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

type LoanCell = Arc<RwLock<Loan>>;

/// Thread-safe book of loans keyed by id.
///
/// The id-to-loan map sits behind one `RwLock` and every loan behind its own,
/// so queries run concurrently, creation is exclusive on the map, and a
/// payment is exclusive only on the loan it touches. Loans are never removed.
pub struct LoanRegistry {
    loans: RwLock<HashMap<LoanId, LoanCell>>,
    clock: ClockBox,
}

impl Default for LoanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanRegistry {
    /// Creates an empty registry driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Creates an empty registry that reads "now" from `clock`.
    pub fn with_clock(clock: ClockBox) -> Self {
        Self {
            loans: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Originates a loan and registers it under its id.
    ///
    /// Fails with [`LoanError::Duplicate`] if the id is taken; the existing
    /// loan is left as it was.
    pub fn create(&self, options: LoanOptions) -> Result<Loan> {
        let loan = Loan::originate(options, self.clock.now());

        let mut loans = self.loans.write().unwrap_or_else(PoisonError::into_inner);
        match loans.entry(loan.id().clone()) {
            Entry::Occupied(entry) => Err(LoanError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(RwLock::new(loan.clone())));
                Ok(loan)
            }
        }
    }

    /// A snapshot of the loan as it is now.
    pub fn get(&self, id: &str) -> Result<Loan> {
        self.read_loan(id, Loan::clone)
    }

    /// Records a payment against the loan at the clock's current time.
    pub fn apply_payment(&self, id: &str, amount: Decimal) -> Result<()> {
        let cell = self.cell(id)?;
        let mut loan = cell.write().unwrap_or_else(PoisonError::into_inner);
        // Read the clock under the lock so payment history stays chronological.
        let now = self.clock.now();
        loan.record_payment_at(amount, now)
    }

    pub fn outstanding_of(&self, id: &str) -> Result<Decimal> {
        self.read_loan(id, Loan::outstanding)
    }

    pub fn is_delinquent(&self, id: &str) -> Result<bool> {
        let now = self.clock.now();
        self.read_loan(id, |loan| loan.is_delinquent_at(now))
    }

    pub fn billing_schedule_of(&self, id: &str) -> Result<Vec<Decimal>> {
        self.read_loan(id, Loan::billing_schedule)
    }

    /// The loan's status re-derived at the clock's current time, so a loan
    /// that has gone quiet reads as delinquent without a new payment.
    pub fn status_of(&self, id: &str) -> Result<LoanStatus> {
        let now = self.clock.now();
        self.read_loan(id, |loan| loan.status_at(now))
    }

    pub fn len(&self) -> usize {
        self.loans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots of every loan, ordered by id.
    pub fn snapshot(&self) -> Vec<Loan> {
        let cells: Vec<LoanCell> = self
            .loans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut loans: Vec<Loan> = cells
            .iter()
            .map(|cell| cell.read().unwrap_or_else(PoisonError::into_inner).clone())
            .collect();
        loans.sort_by(|a, b| a.id().cmp(b.id()));
        loans
    }

    fn cell(&self, id: &str) -> Result<LoanCell> {
        self.loans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| LoanError::NotFound(LoanId::from(id)))
    }

    fn read_loan<T>(&self, id: &str, f: impl FnOnce(&Loan) -> T) -> Result<T> {
        let cell = self.cell(id)?;
        let loan = cell.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&loan))
    }
}
