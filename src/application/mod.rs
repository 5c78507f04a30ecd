//! Application layer that turns scripted operations into transactions.
//!
//! `Teller` resolves the acting account, binds fixed-value input sources and
//! runs the resulting transactions either in order or on a bounded pool of
//! blocking `tokio` tasks.

pub mod operation;
pub mod teller;
