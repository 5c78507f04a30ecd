//! Adapters between the ledger and the outside world: CSV files in and out,
//! console rendering of outcomes.

pub mod console;
pub mod csv;
