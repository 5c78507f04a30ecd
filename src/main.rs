use atm_ledger::application::teller::Teller;
use atm_ledger::config::{OutputFormat, Settings};
use atm_ledger::domain::ports::OutcomeSinkBox;
use atm_ledger::interfaces::console::{JsonPresenter, TextPresenter};
use atm_ledger::interfaces::csv::account_reader::AccountReader;
use atm_ledger::interfaces::csv::balance_writer::BalanceWriter;
use atm_ledger::interfaces::csv::operation_reader::OperationReader;
use atm_ledger::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Operations CSV file (`type, account, amount, counterparty`)
    script: PathBuf,

    /// Opening accounts CSV file (`id, kind, balance`)
    #[arg(long)]
    accounts: PathBuf,

    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.settings.log_filter);

    let accounts = File::open(&cli.accounts).into_diagnostic()?;
    let directory = AccountReader::new(accounts)
        .into_directory()
        .into_diagnostic()?;
    info!(accounts = directory.len(), "ledger opened");
    let teller = Teller::new(Arc::new(directory));

    let script = File::open(&cli.script).into_diagnostic()?;
    let reader = OperationReader::new(script);

    let mut sink: OutcomeSinkBox = match cli.settings.format {
        OutputFormat::Text => Box::new(TextPresenter::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonPresenter::new(io::stdout())),
    };
    teller
        .run(
            reader.operations(),
            cli.settings.workers,
            sink.as_mut(),
            &mut |position, err| eprintln!("Error processing operation {position}: {err}"),
        )
        .await
        .into_diagnostic()?;
    drop(sink);

    // Closing balances
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer
        .write_balances(teller.directory())
        .into_diagnostic()?;

    Ok(())
}
