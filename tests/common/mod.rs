use rand::Rng;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn account_id(index: usize) -> String {
    format!("ACC{index:03}")
}

/// Writes `count` checking accounts, each opening with `balance`.
pub fn generate_accounts(path: &Path, count: usize, balance: &str) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["id", "kind", "balance"])?;
    for i in 0..count {
        wtr.write_record([account_id(i).as_str(), "checking", balance])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `rows` transfers between random pairs of the first `accounts` ids.
///
/// Some targets are deliberately unknown and some transfers go to the source
/// itself.
pub fn generate_transfers(path: &Path, rows: usize, accounts: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["type", "account", "amount", "counterparty"])?;

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let source = account_id(rng.gen_range(0..accounts));
        let target = if rng.gen_range(0..20) == 0 {
            "UNKNOWN".to_string()
        } else {
            account_id(rng.gen_range(0..accounts))
        };
        let amount = Decimal::new(rng.gen_range(0..50_000), 2);
        wtr.write_record(["transfer", &source, &amount.to_string(), &target])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parses the closing `account,kind,balance` block printed after the outcomes.
pub fn closing_balances(stdout: &str) -> Vec<(String, Decimal)> {
    stdout
        .lines()
        .skip_while(|line| *line != "account,kind,balance")
        .skip(1)
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            (fields[0].to_string(), fields[2].parse().unwrap())
        })
        .collect()
}
