use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Unique, immutable identifier of an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Lets the directory be queried with a plain `&str`.
impl Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A negative amount was supplied where only amounts `>= 0` are accepted.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("Invalid amount {amount}: amounts must not be negative")]
pub struct InvalidAmount {
    pub amount: Decimal,
}

/// Checks the non-negativity precondition shared by every balance mutation.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, InvalidAmount> {
    if amount < Decimal::ZERO {
        Err(InvalidAmount { amount })
    } else {
        Ok(amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Supports deposits and withdrawals.
    #[default]
    Checking,
    /// Deposit only. Debiting transactions are refused.
    Savings,
}

impl AccountKind {
    /// Capability test made by every debiting transaction before touching the balance.
    pub fn permits_withdrawal(self) -> bool {
        matches!(self, AccountKind::Checking)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Checking => f.write_str("checking"),
            AccountKind::Savings => f.write_str("savings"),
        }
    }
}

/// Crediting an amount would push a balance past the largest representable value.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("Adding {amount} to a balance of {balance} overflows")]
pub struct BalanceOverflow {
    pub balance: Decimal,
    pub amount: Decimal,
}

/// Why a deposit left the balance unchanged.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum DepositError {
    #[error(transparent)]
    InvalidAmount(#[from] InvalidAmount),
    #[error(transparent)]
    Overflow(#[from] BalanceOverflow),
}

/// Result of a debit attempted inside an account's critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debit {
    Applied { new_balance: Decimal },
    Insufficient { available: Decimal },
}

/// A named balance cell that can be shared across threads.
///
/// Every read and write of the balance goes through a per-account mutex, so a
/// reader never observes a half-applied mutation and the
/// check-then-subtract of a withdrawal is a single atomic step.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    kind: AccountKind,
    balance: Mutex<Decimal>,
}

impl Account {
    /// Creates a checking account.
    pub fn new(id: impl Into<AccountId>, opening_balance: Decimal) -> Result<Self, InvalidAmount> {
        Self::with_kind(id, AccountKind::Checking, opening_balance)
    }

    pub fn with_kind(
        id: impl Into<AccountId>,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> Result<Self, InvalidAmount> {
        let opening_balance = validate_amount(opening_balance)?;
        Ok(Self {
            id: id.into(),
            kind,
            balance: Mutex::new(opening_balance),
        })
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Current balance.
    pub fn balance(&self) -> Decimal {
        self.lock().balance()
    }

    /// Adds `amount` and returns the new balance.
    ///
    /// There is no upper limit beyond what `Decimal` can hold. A deposit that
    /// would exceed it fails with [`DepositError::Overflow`] and changes nothing.
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, DepositError> {
        let amount = validate_amount(amount)?;
        Ok(self.lock().credit(amount)?)
    }

    /// Subtracts `amount` if the balance covers it.
    ///
    /// Returns `Ok(false)` and leaves the balance untouched when funds are
    /// insufficient.
    pub fn withdraw(&self, amount: Decimal) -> Result<bool, InvalidAmount> {
        let amount = validate_amount(amount)?;
        Ok(matches!(self.lock().debit(amount), Debit::Applied { .. }))
    }

    /// Enters this account's critical section.
    ///
    /// Callers holding more than one guard must acquire them in the order
    /// defined by [`crate::domain::transaction`].
    pub(crate) fn lock(&self) -> BalanceGuard<'_> {
        BalanceGuard(self.balance.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Exclusive access to one account's balance.
///
/// Amounts passed in must already have been validated as non-negative.
pub(crate) struct BalanceGuard<'a>(MutexGuard<'a, Decimal>);

impl BalanceGuard<'_> {
    pub(crate) fn balance(&self) -> Decimal {
        *self.0
    }

    /// Balance that crediting `amount` would produce, without applying it.
    pub(crate) fn checked_credit(&self, amount: Decimal) -> Result<Decimal, BalanceOverflow> {
        debug_assert!(amount >= Decimal::ZERO);
        self.0.checked_add(amount).ok_or(BalanceOverflow {
            balance: *self.0,
            amount,
        })
    }

    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<Decimal, BalanceOverflow> {
        let new_balance = self.checked_credit(amount)?;
        self.set(new_balance);
        Ok(new_balance)
    }

    /// Stores a balance computed by [`Self::checked_credit`] under this same guard.
    pub(crate) fn set(&mut self, new_balance: Decimal) {
        *self.0 = new_balance;
    }

    pub(crate) fn debit(&mut self, amount: Decimal) -> Debit {
        debug_assert!(amount >= Decimal::ZERO);
        if amount > *self.0 {
            return Debit::Insufficient { available: *self.0 };
        }
        *self.0 -= amount;
        Debit::Applied {
            new_balance: *self.0,
        }
    }
}
