use super::operation::Operation;
use crate::domain::directory::AccountDirectory;
use crate::domain::ports::{OutcomeSink, Receipt};
use crate::domain::transaction::{
    BillPayment, Deposit, Transaction, TransactionKind, Transfer, Withdrawal,
};
use crate::error::{LedgerError, Result};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, Receiver};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Counts of how a run went.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Transactions whose outcome was a success.
    pub succeeded: usize,
    /// Transactions that executed but were refused (funds, target, amount, capability).
    pub declined: usize,
    /// Operations that could not be read or turned into a transaction.
    pub rejected: usize,
}

impl RunSummary {
    fn record(&mut self, receipt: &Receipt) {
        if receipt.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.declined += 1;
        }
    }
}

/// Executes operations against a shared, read-only account directory.
///
/// Cloning is cheap: clones share the directory.
#[derive(Debug, Clone)]
pub struct Teller {
    directory: Arc<AccountDirectory>,
}

impl Teller {
    pub fn new(directory: Arc<AccountDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    /// Binds an operation to its account and fixed-value input sources.
    pub fn prepare(&self, operation: Operation) -> Result<Transaction> {
        let Operation {
            kind,
            account,
            amount,
            counterparty,
        } = operation;

        let source = self
            .directory
            .get(account.as_str())
            .ok_or(LedgerError::UnknownAccount(account))?;

        let transaction: Transaction = match kind {
            TransactionKind::Deposit => Deposit::new(source, amount).into(),
            TransactionKind::Withdrawal => Withdrawal::new(source, amount).into(),
            TransactionKind::Transfer => {
                let target = counterparty.ok_or(LedgerError::MissingCounterparty { kind })?;
                Transfer::new(source, Arc::clone(&self.directory), amount, target).into()
            }
            TransactionKind::BillPayment => {
                let biller = counterparty.ok_or(LedgerError::MissingCounterparty { kind })?;
                BillPayment::new(source, amount, biller).into()
            }
        };
        Ok(transaction)
    }

    /// Prepares and executes one operation on the calling thread.
    pub fn process(&self, operation: Operation) -> Result<Receipt> {
        let transaction = self.prepare(operation)?;
        let kind = transaction.kind();
        let account = transaction.account().id().clone();
        let outcome = transaction.execute();
        Ok(Receipt {
            kind,
            account,
            outcome,
        })
    }

    /// Runs a stream of operations, handing every receipt to `sink`.
    ///
    /// The operations iterator is drained on the blocking pool and handed over
    /// through a bounded channel, so a file-backed reader never blocks the
    /// runtime. With a single worker operations execute in input order on the
    /// caller. Otherwise each one runs as a blocking task, at most `workers` at
    /// a time, and receipts arrive in completion order. Operations that cannot
    /// be read or prepared go to `on_error` with their 1-based position and the
    /// run continues.
    pub async fn run<I>(
        &self,
        operations: I,
        workers: NonZeroUsize,
        sink: &mut dyn OutcomeSink,
        on_error: &mut dyn FnMut(usize, &LedgerError),
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Operation>>,
        I::IntoIter: Send + 'static,
    {
        let (mut incoming, reader) = read_ahead(operations.into_iter(), workers.get());
        let mut summary = RunSummary::default();
        let mut position = 0;

        if workers.get() == 1 {
            while let Some(operation) = incoming.recv().await {
                position += 1;
                match operation.and_then(|op| self.process(op)) {
                    Ok(receipt) => {
                        summary.record(&receipt);
                        sink.inform(&receipt)?;
                    }
                    Err(err) => self.reject(&mut summary, position, &err, on_error),
                }
            }
            reader.await?;
            info!(?summary, "run finished");
            return Ok(summary);
        }

        let permits = Arc::new(Semaphore::new(workers.get()));
        let mut tasks: JoinSet<(usize, Result<Receipt>)> = JoinSet::new();

        while let Some(operation) = incoming.recv().await {
            position += 1;
            let operation = match operation {
                Ok(operation) => operation,
                Err(err) => {
                    self.reject(&mut summary, position, &err, on_error);
                    continue;
                }
            };

            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|_| LedgerError::WorkerPoolClosed)?;
            let teller = self.clone();
            let task_position = position;
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (task_position, teller.process(operation))
            });

            while let Some(joined) = tasks.try_join_next() {
                self.settle(joined?, &mut summary, sink, on_error)?;
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.settle(joined?, &mut summary, sink, on_error)?;
        }
        reader.await?;

        info!(?summary, "run finished");
        Ok(summary)
    }

    fn settle(
        &self,
        (position, result): (usize, Result<Receipt>),
        summary: &mut RunSummary,
        sink: &mut dyn OutcomeSink,
        on_error: &mut dyn FnMut(usize, &LedgerError),
    ) -> Result<()> {
        match result {
            Ok(receipt) => {
                summary.record(&receipt);
                sink.inform(&receipt)
            }
            Err(err) => {
                self.reject(summary, position, &err, on_error);
                Ok(())
            }
        }
    }

    fn reject(
        &self,
        summary: &mut RunSummary,
        position: usize,
        err: &LedgerError,
        on_error: &mut dyn FnMut(usize, &LedgerError),
    ) {
        warn!(position, error = %err, "operation rejected");
        summary.rejected += 1;
        on_error(position, err);
    }
}

/// Pulls operations on the blocking pool and forwards them in input order.
///
/// The reader stops early once the receiving side is dropped.
fn read_ahead<I>(operations: I, capacity: usize) -> (Receiver<Result<Operation>>, JoinHandle<()>)
where
    I: Iterator<Item = Result<Operation>> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(capacity.max(1) * 2);
    let reader = tokio::task::spawn_blocking(move || {
        for operation in operations {
            if sender.blocking_send(operation).is_err() {
                debug!("run stopped early, no longer reading operations");
                break;
            }
        }
    });
    (receiver, reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountId};
    use crate::domain::outcome::TransactionOutcome;
    use crate::infrastructure::in_memory::RecordingSink;
    use rust_decimal_macros::dec;

    fn teller() -> Teller {
        let directory = AccountDirectory::from_accounts([
            Account::new("A1", dec!(1000.00)).unwrap(),
            Account::new("A2", dec!(200.00)).unwrap(),
        ])
        .unwrap();
        Teller::new(Arc::new(directory))
    }

    fn scenario() -> Vec<Result<Operation>> {
        vec![
            Ok(Operation::new(TransactionKind::Deposit, "A1", dec!(150.00))),
            Ok(Operation::new(TransactionKind::Withdrawal, "A1", dec!(50.00))),
            Ok(Operation::new(TransactionKind::Transfer, "A1", dec!(300.00)).with_counterparty("A2")),
            Ok(Operation::new(TransactionKind::BillPayment, "A1", dec!(200.00))
                .with_counterparty("GasCompany")),
            Ok(Operation::new(TransactionKind::Withdrawal, "A1", dec!(9999.00))),
        ]
    }

    #[test]
    fn test_prepare_unknown_account() {
        let err = teller()
            .prepare(Operation::new(TransactionKind::Deposit, "ZZ", dec!(1)))
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::UnknownAccount(id) if id == AccountId::from("ZZ")));
    }

    #[test]
    fn test_prepare_requires_counterparty() {
        let teller = teller();
        for kind in [TransactionKind::Transfer, TransactionKind::BillPayment] {
            let err = teller
                .prepare(Operation::new(kind, "A1", dec!(1)))
                .err()
                .unwrap();
            assert!(matches!(err, LedgerError::MissingCounterparty { kind: k } if k == kind));
        }
    }

    #[test]
    fn test_process_returns_receipt() {
        let receipt = teller()
            .process(Operation::new(TransactionKind::Transfer, "A1", dec!(5)).with_counterparty("XX"))
            .unwrap();
        assert_eq!(receipt.kind, TransactionKind::Transfer);
        assert_eq!(receipt.account, AccountId::from("A1"));
        assert_eq!(
            receipt.outcome,
            TransactionOutcome::TargetNotFound {
                id: AccountId::from("XX")
            }
        );
    }

    #[tokio::test]
    async fn test_sequential_run_in_order() {
        let teller = teller();
        let mut sink = RecordingSink::new();
        let mut errors = Vec::new();

        let summary = teller
            .run(
                scenario(),
                NonZeroUsize::MIN,
                &mut sink,
                &mut |position, err| errors.push((position, err.to_string())),
            )
            .await
            .unwrap();

        assert_eq!(
            summary,
            RunSummary {
                succeeded: 4,
                declined: 1,
                rejected: 0
            }
        );
        assert!(errors.is_empty());

        let receipts = sink.receipts();
        let kinds: Vec<_> = receipts.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            [
                TransactionKind::Deposit,
                TransactionKind::Withdrawal,
                TransactionKind::Transfer,
                TransactionKind::BillPayment,
                TransactionKind::Withdrawal,
            ]
        );
        assert_eq!(
            receipts[4].outcome,
            TransactionOutcome::InsufficientFunds {
                requested: dec!(9999.00),
                available: dec!(600.00),
            }
        );
        assert_eq!(teller.directory().get("A1").unwrap().balance(), dec!(600.00));
        assert_eq!(teller.directory().get("A2").unwrap().balance(), dec!(500.00));
    }

    #[tokio::test]
    async fn test_operations_are_read_off_the_runtime_thread() {
        let runtime_thread = std::thread::current().id();
        let readers = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&readers);
        let operations = scenario()
            .into_iter()
            .inspect(move |_| log.lock().unwrap().push(std::thread::current().id()));
        let mut sink = RecordingSink::new();

        let summary = teller()
            .run(operations, NonZeroUsize::MIN, &mut sink, &mut |_, _| {})
            .await
            .unwrap();

        assert_eq!(summary.succeeded + summary.declined, 5);
        let readers = readers.lock().unwrap();
        assert_eq!(readers.len(), 5);
        assert!(readers.iter().all(|thread| *thread != runtime_thread));
    }

    #[tokio::test]
    async fn test_run_reports_rejections_and_continues() {
        let teller = teller();
        let mut sink = RecordingSink::new();
        let mut errors = Vec::new();
        let operations = vec![
            Ok(Operation::new(TransactionKind::Deposit, "A1", dec!(1))),
            Err(LedgerError::WorkerPoolClosed),
            Ok(Operation::new(TransactionKind::Deposit, "missing", dec!(1))),
            Ok(Operation::new(TransactionKind::Deposit, "A2", dec!(1))),
        ];

        let summary = teller
            .run(operations, NonZeroUsize::MIN, &mut sink, &mut |position, _| {
                errors.push(position)
            })
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.rejected, 2);
        assert_eq!(errors, [2, 3]);
        assert_eq!(sink.receipts().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_run_preserves_total() {
        let teller = teller();
        let before = teller.directory().total_balance();
        let mut operations = Vec::new();
        for i in 0..400 {
            let (from, to) = if i % 2 == 0 { ("A1", "A2") } else { ("A2", "A1") };
            operations.push(Ok(
                Operation::new(TransactionKind::Transfer, from, dec!(3.25)).with_counterparty(to),
            ));
        }
        let mut sink = RecordingSink::new();

        let summary = teller
            .run(
                operations,
                NonZeroUsize::new(8).unwrap(),
                &mut sink,
                &mut |_, _| {},
            )
            .await
            .unwrap();

        assert_eq!(summary.succeeded + summary.declined, 400);
        assert_eq!(summary.rejected, 0);
        assert_eq!(sink.receipts().len(), 400);
        assert_eq!(teller.directory().total_balance(), before);
    }
}
