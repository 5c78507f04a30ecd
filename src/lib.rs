//! In-memory ledger of named accounts supporting deposits, withdrawals,
//! transfers and bill payments under concurrent access.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
