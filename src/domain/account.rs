use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// Represents an account balance with fixed-point precision.
///
/// A wrapper around `rust_decimal::Decimal` so balances stay type-distinct
/// from raw numbers in financial calculations. Never implicitly rounded.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive movement amount.
///
/// Ensures that amounts are at least one minor unit (0.01) and carry at most
/// the currency's minor-unit precision (two decimal places).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Smallest accepted amount: one minor unit.
    pub const MIN: Decimal = dec!(0.01);

    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value < Self::MIN {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be at least {}, got {value}",
                Self::MIN
            )));
        }
        if value.normalize().scale() > 2 {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must have at most two decimal places, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

// Basic arithmetic so Balance behaves as a value object.
impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[serde(alias = "SAVINGS")]
    Savings,
    #[serde(alias = "CHECKING")]
    Checking,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[serde(alias = "ACTIVE")]
    Active,
    #[serde(alias = "INACTIVE")]
    Inactive,
}

/// A customer account holding the current balance.
///
/// The opening balance is fixed at creation; the current balance is mutated
/// exclusively by the ledger engine applying movements, and is always the
/// opening balance plus all signed movement amounts in application order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Unique human-readable account number.
    pub number: String,
    /// Account kind (savings or checking).
    pub kind: AccountKind,
    /// Identifier of the owning customer.
    pub customer_id: Uuid,
    /// Balance the account was opened with; immutable once set.
    pub opening_balance: Balance,
    /// Current balance.
    pub balance: Balance,
    /// Account status; carried as data, not a gate on movements.
    pub status: AccountStatus,
}

impl Account {
    /// Opens an account with the given opening balance.
    ///
    /// The identifier comes from the registration collaborator that owns
    /// account creation. Fails if the opening balance is negative or
    /// carries more than two decimal places.
    pub fn open(
        id: Uuid,
        number: impl Into<String>,
        kind: AccountKind,
        customer_id: Uuid,
        opening_balance: Decimal,
    ) -> Result<Self, LedgerError> {
        if opening_balance < Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "opening balance must not be negative, got {opening_balance}"
            )));
        }
        if opening_balance.normalize().scale() > 2 {
            return Err(LedgerError::Validation(format!(
                "opening balance must have at most two decimal places, got {opening_balance}"
            )));
        }
        Ok(Self {
            id,
            number: number.into(),
            kind,
            customer_id,
            opening_balance: Balance::new(opening_balance),
            balance: Balance::new(opening_balance),
            status: AccountStatus::Active,
        })
    }

    /// Adds the amount to the current balance. Always succeeds.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    /// Subtracts the amount from the current balance if it is covered.
    ///
    /// On insufficient funds the balance is left untouched.
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        let requested: Balance = amount.into();
        if self.balance >= requested {
            self.balance -= requested;
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                account_id: self.id,
                balance: self.balance.0,
                requested: amount.value(),
            })
        }
    }
}
