//! The four transaction kinds and the lock discipline for transfers.
//!
//! A transfer holds the critical sections of both accounts while it debits
//! the source and credits the target. The two locks are always taken in
//! ascending `(account id, handle address)` order regardless of which side is
//! the source, so transfers running in opposite directions between the same
//! pair cannot deadlock. A transfer whose target is its own source locks once.

use super::account::{Account, BalanceGuard, BalanceOverflow, Debit, DepositError, validate_amount};
use super::directory::AccountDirectory;
use super::outcome::{Counterparty, TransactionOutcome};
use super::ports::{AmountSource, AmountSourceBox, IdentifierSource, IdentifierSourceBox};
use crate::domain::account::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    BillPayment,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
            TransactionKind::BillPayment => "bill_payment",
        };
        f.write_str(name)
    }
}

pub struct Deposit {
    account: Arc<Account>,
    amount: AmountSourceBox,
}

impl Deposit {
    pub fn new(account: Arc<Account>, amount: impl AmountSource + 'static) -> Self {
        Self {
            account,
            amount: Box::new(amount),
        }
    }

    pub fn execute(mut self) -> TransactionOutcome {
        let requested = self.amount.request_amount();
        match self.account.deposit(requested) {
            Ok(new_balance) => TransactionOutcome::success(requested, new_balance),
            Err(DepositError::InvalidAmount(err)) => err.into(),
            Err(DepositError::Overflow(_)) => TransactionOutcome::BalanceOverflow {
                account: self.account.id().clone(),
                amount: requested,
            },
        }
    }
}

pub struct Withdrawal {
    account: Arc<Account>,
    amount: AmountSourceBox,
}

impl Withdrawal {
    pub fn new(account: Arc<Account>, amount: impl AmountSource + 'static) -> Self {
        Self {
            account,
            amount: Box::new(amount),
        }
    }

    pub fn execute(mut self) -> TransactionOutcome {
        let requested = self.amount.request_amount();
        debit(&self.account, requested, None)
    }
}

pub struct BillPayment {
    account: Arc<Account>,
    amount: AmountSourceBox,
    biller: IdentifierSourceBox,
}

impl BillPayment {
    pub fn new(
        account: Arc<Account>,
        amount: impl AmountSource + 'static,
        biller: impl IdentifierSource + 'static,
    ) -> Self {
        Self {
            account,
            amount: Box::new(amount),
            biller: Box::new(biller),
        }
    }

    pub fn execute(mut self) -> TransactionOutcome {
        let requested = self.amount.request_amount();
        let biller = self.biller.request_identifier();
        debit(&self.account, requested, Some(Counterparty::Biller(biller)))
    }
}

pub struct Transfer {
    source: Arc<Account>,
    directory: Arc<AccountDirectory>,
    amount: AmountSourceBox,
    target: IdentifierSourceBox,
}

impl Transfer {
    pub fn new(
        source: Arc<Account>,
        directory: Arc<AccountDirectory>,
        amount: impl AmountSource + 'static,
        target: impl IdentifierSource + 'static,
    ) -> Self {
        Self {
            source,
            directory,
            amount: Box::new(amount),
            target: Box::new(target),
        }
    }

    pub fn execute(mut self) -> TransactionOutcome {
        let requested = self.amount.request_amount();
        let target_id = self.target.request_identifier();

        let Some(target) = self.directory.get(&target_id) else {
            return TransactionOutcome::TargetNotFound {
                id: AccountId::from(target_id),
            };
        };
        let amount = match validate_amount(requested) {
            Ok(amount) => amount,
            Err(err) => return err.into(),
        };
        if !self.source.kind().permits_withdrawal() {
            return TransactionOutcome::WithdrawalNotSupported {
                account: self.source.id().clone(),
            };
        }

        match move_funds(&self.source, &target, amount) {
            Ok(Debit::Applied { new_balance }) => TransactionOutcome::success_with(
                amount,
                new_balance,
                Counterparty::Account(target.id().clone()),
            ),
            Ok(Debit::Insufficient { available }) => TransactionOutcome::InsufficientFunds {
                requested: amount,
                available,
            },
            Err(_) => TransactionOutcome::BalanceOverflow {
                account: target.id().clone(),
                amount,
            },
        }
    }
}

/// Shared body of withdrawals and bill payments.
fn debit(
    account: &Account,
    requested: Decimal,
    counterparty: Option<Counterparty>,
) -> TransactionOutcome {
    let amount = match validate_amount(requested) {
        Ok(amount) => amount,
        Err(err) => return err.into(),
    };
    if !account.kind().permits_withdrawal() {
        return TransactionOutcome::WithdrawalNotSupported {
            account: account.id().clone(),
        };
    }

    match account.lock().debit(amount) {
        Debit::Applied { new_balance } => TransactionOutcome::Success {
            amount,
            new_balance,
            counterparty,
        },
        Debit::Insufficient { available } => TransactionOutcome::InsufficientFunds {
            requested: amount,
            available,
        },
    }
}

/// Debits `source` and credits `target` while holding both critical sections.
///
/// Returns the source's balance after the move, or the balance that refused
/// the debit. Both failures are detected before either balance changes, so
/// on refusal neither account is touched.
fn move_funds(
    source: &Arc<Account>,
    target: &Arc<Account>,
    amount: Decimal,
) -> Result<Debit, BalanceOverflow> {
    if Arc::ptr_eq(source, target) {
        // Debit and credit of the same cell cancel out.
        let balance = source.lock().balance();
        return Ok(if amount > balance {
            Debit::Insufficient { available: balance }
        } else {
            Debit::Applied {
                new_balance: balance,
            }
        });
    }

    let (mut source_guard, mut target_guard) = lock_pair(source, target);
    let credited = target_guard.checked_credit(amount)?;
    let debit = source_guard.debit(amount);
    if let Debit::Applied { .. } = debit {
        target_guard.set(credited);
    }
    Ok(debit)
}

/// Locks two distinct accounts in rank order and returns `(source, target)` guards.
fn lock_pair<'a>(
    source: &'a Arc<Account>,
    target: &'a Arc<Account>,
) -> (BalanceGuard<'a>, BalanceGuard<'a>) {
    if lock_rank(source) < lock_rank(target) {
        let source_guard = source.lock();
        let target_guard = target.lock();
        (source_guard, target_guard)
    } else {
        let target_guard = target.lock();
        let source_guard = source.lock();
        (source_guard, target_guard)
    }
}

// Ids are unique inside a directory, but a caller-held source may share an id
// with a different handle, so the address breaks ties.
fn lock_rank(account: &Arc<Account>) -> (&AccountId, *const Account) {
    (account.id(), Arc::as_ptr(account))
}

/// Any one of the four transaction kinds, ready to execute.
pub enum Transaction {
    Deposit(Deposit),
    Withdrawal(Withdrawal),
    Transfer(Transfer),
    BillPayment(BillPayment),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Deposit(_) => TransactionKind::Deposit,
            Transaction::Withdrawal(_) => TransactionKind::Withdrawal,
            Transaction::Transfer(_) => TransactionKind::Transfer,
            Transaction::BillPayment(_) => TransactionKind::BillPayment,
        }
    }

    /// The account acting in this transaction (the debited side of a transfer).
    pub fn account(&self) -> &Arc<Account> {
        match self {
            Transaction::Deposit(tx) => &tx.account,
            Transaction::Withdrawal(tx) => &tx.account,
            Transaction::Transfer(tx) => &tx.source,
            Transaction::BillPayment(tx) => &tx.account,
        }
    }

    pub fn execute(self) -> TransactionOutcome {
        let kind = self.kind();
        let account = self.account().id().clone();

        let outcome = match self {
            Transaction::Deposit(tx) => tx.execute(),
            Transaction::Withdrawal(tx) => tx.execute(),
            Transaction::Transfer(tx) => tx.execute(),
            Transaction::BillPayment(tx) => tx.execute(),
        };
        debug!(%kind, %account, ?outcome, "transaction executed");
        outcome
    }
}

impl From<Deposit> for Transaction {
    fn from(tx: Deposit) -> Self {
        Transaction::Deposit(tx)
    }
}

impl From<Withdrawal> for Transaction {
    fn from(tx: Withdrawal) -> Self {
        Transaction::Withdrawal(tx)
    }
}

impl From<Transfer> for Transaction {
    fn from(tx: Transfer) -> Self {
        Transaction::Transfer(tx)
    }
}

impl From<BillPayment> for Transaction {
    fn from(tx: BillPayment) -> Self {
        Transaction::BillPayment(tx)
    }
}
