use atm_ledger::domain::account::Account;
use atm_ledger::domain::directory::AccountDirectory;
use atm_ledger::domain::outcome::{Counterparty, TransactionOutcome};
use atm_ledger::domain::ports::{AmountSource, IdentifierSource};
use atm_ledger::domain::transaction::{BillPayment, Transaction, Transfer};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts how often the transaction asks for input.
struct CountingAmount {
    amount: Decimal,
    calls: Arc<AtomicUsize>,
}

impl AmountSource for CountingAmount {
    fn request_amount(&mut self) -> Decimal {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.amount
    }
}

struct CountingIdentifier {
    id: &'static str,
    calls: Arc<AtomicUsize>,
}

impl IdentifierSource for CountingIdentifier {
    fn request_identifier(&mut self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.id.to_string()
    }
}

#[test]
fn test_sources_are_consulted_once() {
    let mut directory = AccountDirectory::new();
    let a1 = directory.insert(Account::new("A1", dec!(10)).unwrap()).unwrap();
    directory.insert(Account::new("A2", dec!(0)).unwrap()).unwrap();
    let directory = Arc::new(directory);

    let amount_calls = Arc::new(AtomicUsize::new(0));
    let id_calls = Arc::new(AtomicUsize::new(0));
    let transfer = Transfer::new(
        Arc::clone(&a1),
        directory,
        CountingAmount {
            amount: dec!(4),
            calls: Arc::clone(&amount_calls),
        },
        CountingIdentifier {
            id: "A2",
            calls: Arc::clone(&id_calls),
        },
    );

    assert!(transfer.execute().is_success());
    assert_eq!(amount_calls.load(Ordering::SeqCst), 1);
    assert_eq!(id_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transactions_move_across_threads() {
    let account = Arc::new(Account::new("A1", dec!(10)).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));
    let transaction: Transaction = BillPayment::new(
        Arc::clone(&account),
        CountingAmount {
            amount: dec!(7.50),
            calls: Arc::clone(&calls),
        },
        String::from("Water"),
    )
    .into();

    let outcome = std::thread::spawn(move || transaction.execute())
        .join()
        .unwrap();

    assert_eq!(
        outcome,
        TransactionOutcome::success_with(
            dec!(7.50),
            dec!(2.50),
            Counterparty::Biller("Water".to_string())
        )
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
