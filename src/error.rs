use crate::domain::account::{AccountId, InvalidAmount};
use crate::domain::transaction::TransactionKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidAmount(#[from] InvalidAmount),
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),
    #[error("Duplicate account: {0}")]
    DuplicateAccount(AccountId),
    #[error("A {kind} requires a counterparty")]
    MissingCounterparty { kind: TransactionKind },
    #[error("A successful {kind} receipt does not carry its counterparty")]
    UnroutableReceipt { kind: TransactionKind },
    #[error("Worker task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
    #[error("Worker pool closed")]
    WorkerPoolClosed,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
