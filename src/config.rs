use clap::{Args, ValueEnum};
use std::num::NonZeroUsize;

/// How receipts are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Run-time knobs shared by every invocation of the CLI.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Number of operations allowed to execute at the same time.
    #[arg(long, default_value = "1")]
    pub workers: NonZeroUsize,

    /// Rendering of transaction outcomes.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log filter used when `RUST_LOG` is not set (e.g. `info`, `atm_ledger=debug`).
    #[arg(long, default_value = "warn")]
    pub log_filter: String,
}
