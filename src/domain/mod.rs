//! Ledger core: accounts, the directory, transactions and their outcomes.

pub mod account;
pub mod directory;
pub mod outcome;
pub mod ports;
pub mod transaction;
