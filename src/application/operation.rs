use crate::domain::account::AccountId;
use crate::domain::transaction::TransactionKind;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One scripted request against the ledger.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub account: AccountId,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Transfer target id or biller name.
    #[serde(default)]
    pub counterparty: Option<String>,
}

impl Operation {
    pub fn new(kind: TransactionKind, account: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            kind,
            account: account.into(),
            amount,
            counterparty: None,
        }
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }
}
