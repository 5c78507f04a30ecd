//! Contracts between the ledger core and the collaborators that feed it input
//! and render its results.

use super::account::AccountId;
use super::outcome::{Counterparty, TransactionOutcome};
use super::transaction::TransactionKind;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// Supplies the amount of one transaction.
///
/// A transaction owns its source and consumes itself when executed, so the
/// source is asked at most once.
pub trait AmountSource: Send {
    fn request_amount(&mut self) -> Decimal;
}

/// Supplies a transfer target id or a biller name.
pub trait IdentifierSource: Send {
    fn request_identifier(&mut self) -> String;
}

impl AmountSource for Decimal {
    fn request_amount(&mut self) -> Decimal {
        *self
    }
}

impl IdentifierSource for String {
    fn request_identifier(&mut self) -> String {
        std::mem::take(self)
    }
}

impl IdentifierSource for &'static str {
    fn request_identifier(&mut self) -> String {
        (*self).to_string()
    }
}

impl IdentifierSource for AccountId {
    fn request_identifier(&mut self) -> String {
        self.as_str().to_string()
    }
}

pub type AmountSourceBox = Box<dyn AmountSource>;
pub type IdentifierSourceBox = Box<dyn IdentifierSource>;

/// An executed transaction as handed to an [`OutcomeSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub kind: TransactionKind,
    pub account: AccountId,
    pub outcome: TransactionOutcome,
}

/// Receives outcomes and owns any user-facing rendering of them.
///
/// This is the port the teller drives. Consumers that only care about some
/// kinds implement the per-kind sinks below and forward through [`route`].
pub trait OutcomeSink {
    fn inform(&mut self, receipt: &Receipt) -> Result<()>;
}

pub type OutcomeSinkBox = Box<dyn OutcomeSink>;

pub trait DepositSink {
    fn deposited(&mut self, account: &AccountId, amount: Decimal, new_balance: Decimal)
    -> Result<()>;

    fn deposit_declined(&mut self, account: &AccountId, outcome: &TransactionOutcome)
    -> Result<()>;
}

pub trait WithdrawalSink {
    fn withdrew(&mut self, account: &AccountId, amount: Decimal, new_balance: Decimal)
    -> Result<()>;

    fn withdrawal_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()>;
}

pub trait TransferSink {
    fn transferred(
        &mut self,
        account: &AccountId,
        target: &AccountId,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()>;

    fn transfer_declined(&mut self, account: &AccountId, outcome: &TransactionOutcome)
    -> Result<()>;
}

pub trait BillPaymentSink {
    fn bill_paid(
        &mut self,
        account: &AccountId,
        biller: &str,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()>;

    fn bill_payment_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()>;
}

/// Hands a receipt to the sink method for its transaction kind.
///
/// A successful transfer must name the credited account and a successful bill
/// payment must name its biller, otherwise the receipt is refused with
/// [`LedgerError::UnroutableReceipt`].
pub fn route<S>(sink: &mut S, receipt: &Receipt) -> Result<()>
where
    S: DepositSink + WithdrawalSink + TransferSink + BillPaymentSink + ?Sized,
{
    let Receipt {
        kind,
        account,
        outcome,
    } = receipt;

    let TransactionOutcome::Success {
        amount,
        new_balance,
        counterparty,
    } = outcome
    else {
        return match kind {
            TransactionKind::Deposit => sink.deposit_declined(account, outcome),
            TransactionKind::Withdrawal => sink.withdrawal_declined(account, outcome),
            TransactionKind::Transfer => sink.transfer_declined(account, outcome),
            TransactionKind::BillPayment => sink.bill_payment_declined(account, outcome),
        };
    };

    match (kind, counterparty) {
        (TransactionKind::Deposit, None) => sink.deposited(account, *amount, *new_balance),
        (TransactionKind::Withdrawal, None) => sink.withdrew(account, *amount, *new_balance),
        (TransactionKind::Transfer, Some(Counterparty::Account(target))) => {
            sink.transferred(account, target, *amount, *new_balance)
        }
        (TransactionKind::BillPayment, Some(Counterparty::Biller(biller))) => {
            sink.bill_paid(account, biller, *amount, *new_balance)
        }
        _ => Err(LedgerError::UnroutableReceipt { kind: *kind }),
    }
}
