use super::money::{Amount, Balance};
use crate::error::{LoanError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

pub const DAYS_PER_WEEK: i64 = 7;
/// Days without a payment after which a loan is delinquent (two periods).
pub const DELINQUENCY_THRESHOLD_DAYS: i64 = 2 * DAYS_PER_WEEK;

pub const DEFAULT_PRINCIPAL: Decimal = dec!(5000000);
pub const DEFAULT_INTEREST_RATE: Decimal = dec!(0.10);
pub const DEFAULT_TOTAL_INSTALLMENTS: u32 = 50;
/// Longest supported schedule: twenty years of weekly installments.
pub const MAX_TOTAL_INSTALLMENTS: u32 = 1040;
/// Decimal places installments are rounded (up) to.
pub const INSTALLMENT_SCALE: u32 = 4;

/// Opaque loan identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random (v4) UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoanId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LoanId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for LoanId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Delinquent,
    Closed,
}

/// A single accepted payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub amount: Amount,
    pub paid_at: DateTime<Utc>,
}

/// Terms a loan is originated with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanConfig {
    principal: Amount,
    interest_rate: Decimal,
    total_installments: u32,
}

impl LoanConfig {
    /// Validates the terms: positive principal, non-negative rate and
    /// between one and [`MAX_TOTAL_INSTALLMENTS`] installments.
    pub fn new(principal: Decimal, interest_rate: Decimal, total_installments: u32) -> Result<Self> {
        let principal = Amount::new(principal)?;
        if interest_rate < Decimal::ZERO {
            return Err(LoanError::Validation(format!(
                "interest rate must not be negative, got {interest_rate}"
            )));
        }
        if total_installments == 0 {
            return Err(LoanError::Validation(
                "a loan needs at least one installment".to_string(),
            ));
        }
        if total_installments > MAX_TOTAL_INSTALLMENTS {
            return Err(LoanError::Validation(format!(
                "a loan allows at most {MAX_TOTAL_INSTALLMENTS} installments, got {total_installments}"
            )));
        }
        if principal
            .value()
            .checked_mul(Decimal::ONE + interest_rate)
            .is_none()
        {
            return Err(LoanError::Validation(
                "principal and interest overflow the supported range".to_string(),
            ));
        }
        Ok(Self {
            principal,
            interest_rate,
            total_installments,
        })
    }

    pub fn principal(&self) -> Amount {
        self.principal
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn total_installments(&self) -> u32 {
        self.total_installments
    }

    /// Principal plus flat interest.
    pub fn total_due(&self) -> Decimal {
        (self.principal.value() * (Decimal::ONE + self.interest_rate)).normalize()
    }

    /// Total due split evenly, rounded up to [`INSTALLMENT_SCALE`] places so
    /// the full schedule always settles the loan.
    pub fn installment_amount(&self) -> Decimal {
        (self.total_due() / Decimal::from(self.total_installments))
            .round_dp_with_strategy(INSTALLMENT_SCALE, RoundingStrategy::AwayFromZero)
            .normalize()
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            principal: Amount(DEFAULT_PRINCIPAL),
            interest_rate: DEFAULT_INTEREST_RATE,
            total_installments: DEFAULT_TOTAL_INSTALLMENTS,
        }
    }
}

/// Optional overrides applied once when a loan is built.
///
/// A missing id is replaced by a generated UUID, a missing config by
/// [`LoanConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct LoanOptions {
    pub id: Option<LoanId>,
    pub config: Option<LoanConfig>,
}

impl LoanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<LoanId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_config(mut self, config: LoanConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A flat-rate loan repaid in weekly installments.
///
/// The installment amount and total due are fixed at origination. The
/// outstanding balance only moves through [`Loan::record_payment_at`], and
/// always equals the total due minus the sum of accepted payments.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    id: LoanId,
    config: LoanConfig,
    installment_amount: Decimal,
    originated_at: DateTime<Utc>,
    payments: Vec<Payment>,
    outstanding: Balance,
    status: LoanStatus,
}

impl Loan {
    /// Originates a loan now.
    pub fn new(options: LoanOptions) -> Self {
        Self::originate(options, Utc::now())
    }

    /// Originates a loan at the given instant.
    pub fn originate(options: LoanOptions, now: DateTime<Utc>) -> Self {
        let config = options.config.unwrap_or_default();
        Self {
            id: options.id.unwrap_or_else(LoanId::generate),
            config,
            installment_amount: config.installment_amount(),
            originated_at: now,
            payments: Vec::new(),
            outstanding: Balance::new(config.total_due()),
            status: LoanStatus::Active,
        }
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn principal(&self) -> Decimal {
        self.config.principal().value()
    }

    pub fn interest_rate(&self) -> Decimal {
        self.config.interest_rate()
    }

    pub fn total_installments(&self) -> u32 {
        self.config.total_installments()
    }

    pub fn installment_amount(&self) -> Decimal {
        self.installment_amount
    }

    pub fn total_due(&self) -> Decimal {
        self.config.total_due()
    }

    pub fn originated_at(&self) -> DateTime<Utc> {
        self.originated_at
    }

    pub fn outstanding(&self) -> Decimal {
        self.outstanding.value()
    }

    /// Status as of the last accepted payment (or origination).
    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Accepted payments in the order they were recorded.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn record_payment(&mut self, amount: Decimal) -> Result<()> {
        self.record_payment_at(amount, Utc::now())
    }

    /// Accepts or rejects a payment made at `now`.
    ///
    /// The first installment is due at origination. When installments have
    /// been missed the payment must cover all of them (overpaying is fine);
    /// otherwise it must match the installment amount exactly. A rejected
    /// payment leaves the loan untouched.
    pub fn record_payment_at(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<()> {
        if self.outstanding.is_settled() {
            return Err(LoanError::AlreadySettled);
        }

        let missed = self.missed_installments_at(now);
        if missed > 0 {
            let minimum = Decimal::from(missed)
                .checked_mul(self.installment_amount)
                .unwrap_or(Decimal::MAX);
            if amount < minimum {
                return Err(LoanError::InsufficientPayment { minimum, missed });
            }
        } else if amount != self.installment_amount {
            return Err(LoanError::IncorrectPaymentAmount {
                expected: self.installment_amount,
                actual: amount,
            });
        }

        let amount = Amount::new(amount)?;
        self.payments.push(Payment {
            amount,
            paid_at: now,
        });
        self.outstanding -= amount;
        self.status = self.status_at(now);
        Ok(())
    }

    /// Installments due by `now` that have no matching payment. Negative
    /// when the borrower has paid ahead.
    pub fn missed_installments_at(&self, now: DateTime<Utc>) -> i64 {
        let elapsed_periods = (now - self.originated_at).num_weeks().max(0);
        let expected = elapsed_periods + 1;
        expected - self.payments.len() as i64
    }

    pub fn is_delinquent(&self) -> bool {
        self.is_delinquent_at(Utc::now())
    }

    /// True when more than two installment periods have passed since the
    /// last payment, or since origination if nothing has been paid.
    pub fn is_delinquent_at(&self, now: DateTime<Utc>) -> bool {
        let last_activity = self
            .payments
            .last()
            .map_or(self.originated_at, |payment| payment.paid_at);
        now - last_activity > TimeDelta::days(DELINQUENCY_THRESHOLD_DAYS)
    }

    /// Status derived from the balance and the time elapsed up to `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.outstanding.is_settled() {
            LoanStatus::Closed
        } else if self.is_delinquent_at(now) {
            LoanStatus::Delinquent
        } else {
            LoanStatus::Active
        }
    }

    /// One entry per installment, each the fixed installment amount.
    pub fn billing_schedule(&self) -> Vec<Decimal> {
        vec![self.installment_amount; self.config.total_installments() as usize]
    }
}
