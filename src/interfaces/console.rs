//! Outcome sinks that render receipts for a person or a pipeline.

use crate::domain::account::AccountId;
use crate::domain::outcome::TransactionOutcome;
use crate::domain::ports::{
    BillPaymentSink, DepositSink, OutcomeSink, Receipt, TransferSink, WithdrawalSink, route,
};
use crate::domain::transaction::TransactionKind;
use crate::error::Result;
use rust_decimal::Decimal;
use std::fmt;
use std::io::Write;

fn decline_reason(outcome: &TransactionOutcome) -> String {
    match outcome {
        TransactionOutcome::InsufficientFunds {
            requested,
            available,
        } => format!("insufficient funds, requested {requested}, available {available}"),
        TransactionOutcome::TargetNotFound { id } => format!("target account not found: {id}"),
        TransactionOutcome::InvalidAmount { amount } => format!("invalid amount {amount}"),
        TransactionOutcome::WithdrawalNotSupported { account } => {
            format!("account {account} does not permit withdrawals")
        }
        TransactionOutcome::BalanceOverflow { account, amount } => {
            format!("crediting {amount} would overflow the balance of {account}")
        }
        TransactionOutcome::Success { amount, new_balance, .. } => {
            format!("completed {amount}, new balance {new_balance}")
        }
    }
}

/// Writes one human-readable line per outcome, e.g.
/// `[transfer] A1: transferred 300.00 to A2, new balance 800.00`.
pub struct TextPresenter<W: Write> {
    output: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    fn line(
        &mut self,
        kind: TransactionKind,
        account: &AccountId,
        text: fmt::Arguments<'_>,
    ) -> Result<()> {
        writeln!(self.output, "[{kind}] {account}: {text}")?;
        Ok(())
    }
}

impl<W: Write> DepositSink for TextPresenter<W> {
    fn deposited(
        &mut self,
        account: &AccountId,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()> {
        self.line(
            TransactionKind::Deposit,
            account,
            format_args!("deposited {amount}, new balance {new_balance}"),
        )
    }

    fn deposit_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()> {
        let reason = decline_reason(outcome);
        self.line(TransactionKind::Deposit, account, format_args!("{reason}"))
    }
}

impl<W: Write> WithdrawalSink for TextPresenter<W> {
    fn withdrew(
        &mut self,
        account: &AccountId,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()> {
        self.line(
            TransactionKind::Withdrawal,
            account,
            format_args!("withdrew {amount}, new balance {new_balance}"),
        )
    }

    fn withdrawal_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()> {
        let reason = decline_reason(outcome);
        self.line(TransactionKind::Withdrawal, account, format_args!("{reason}"))
    }
}

impl<W: Write> TransferSink for TextPresenter<W> {
    fn transferred(
        &mut self,
        account: &AccountId,
        target: &AccountId,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()> {
        self.line(
            TransactionKind::Transfer,
            account,
            format_args!("transferred {amount} to {target}, new balance {new_balance}"),
        )
    }

    fn transfer_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()> {
        let reason = decline_reason(outcome);
        self.line(TransactionKind::Transfer, account, format_args!("{reason}"))
    }
}

impl<W: Write> BillPaymentSink for TextPresenter<W> {
    fn bill_paid(
        &mut self,
        account: &AccountId,
        biller: &str,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<()> {
        self.line(
            TransactionKind::BillPayment,
            account,
            format_args!("paid {amount} to {biller}, new balance {new_balance}"),
        )
    }

    fn bill_payment_declined(
        &mut self,
        account: &AccountId,
        outcome: &TransactionOutcome,
    ) -> Result<()> {
        let reason = decline_reason(outcome);
        self.line(TransactionKind::BillPayment, account, format_args!("{reason}"))
    }
}

impl<W: Write> OutcomeSink for TextPresenter<W> {
    fn inform(&mut self, receipt: &Receipt) -> Result<()> {
        route(self, receipt)
    }
}

/// Writes one JSON object per receipt (JSON lines).
pub struct JsonPresenter<W: Write> {
    output: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<W: Write> OutcomeSink for JsonPresenter<W> {
    fn inform(&mut self, receipt: &Receipt) -> Result<()> {
        serde_json::to_writer(&mut self.output, receipt)?;
        writeln!(self.output)?;
        Ok(())
    }
}
