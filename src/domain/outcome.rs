use super::account::{AccountId, InvalidAmount};
use rust_decimal::Decimal;
use serde::Serialize;

/// The other party named in a successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    /// Account credited by a transfer.
    Account(AccountId),
    /// Biller paid by a bill payment.
    Biller(String),
}

/// What executing a transaction produced.
///
/// Every variant is an expected result handed back to the caller as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Success {
        amount: Decimal,
        /// Balance of the acting account after the mutation.
        new_balance: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        counterparty: Option<Counterparty>,
    },
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    TargetNotFound {
        id: AccountId,
    },
    InvalidAmount {
        amount: Decimal,
    },
    WithdrawalNotSupported {
        account: AccountId,
    },
    /// Crediting `account` would exceed the largest representable balance.
    BalanceOverflow {
        account: AccountId,
        amount: Decimal,
    },
}

impl TransactionOutcome {
    pub fn success(amount: Decimal, new_balance: Decimal) -> Self {
        Self::Success {
            amount,
            new_balance,
            counterparty: None,
        }
    }

    pub fn success_with(amount: Decimal, new_balance: Decimal, counterparty: Counterparty) -> Self {
        Self::Success {
            amount,
            new_balance,
            counterparty: Some(counterparty),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<InvalidAmount> for TransactionOutcome {
    fn from(err: InvalidAmount) -> Self {
        Self::InvalidAmount { amount: err.amount }
    }
}
