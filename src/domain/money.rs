use crate::error::{LoanError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Sub, SubAssign};

/// A strictly positive monetary amount.
///
/// Used for principals and for payments once they have been accepted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(pub(crate) Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LoanError::Validation(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LoanError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Remaining amount owed on a loan.
///
/// Signed: an overpayment on the final installment drives it below zero,
/// which still counts as settled.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// True once nothing is left to pay.
    pub fn is_settled(&self) -> bool {
        self.0 <= Decimal::ZERO
    }
}

impl Sub<Amount> for Balance {
    type Output = Self;
    fn sub(self, rhs: Amount) -> Self::Output {
        Self((self.0 - rhs.0).normalize())
    }
}

impl SubAssign<Amount> for Balance {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = *self - rhs;
    }
}
