use crate::domain::account::{AccountId, AccountKind};
use crate::domain::directory::AccountDirectory;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct BalanceRecord<'a> {
    account: &'a AccountId,
    kind: AccountKind,
    balance: Decimal,
}

/// Writes closing balances as CSV (`account,kind,balance`), sorted by account id.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(output),
        }
    }

    pub fn write_balances(&mut self, directory: &AccountDirectory) -> Result<()> {
        for account in directory.accounts() {
            self.writer.serialize(BalanceRecord {
                account: account.id(),
                kind: account.kind(),
                balance: account.balance(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
