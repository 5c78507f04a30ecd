use crate::domain::account::{Account, AccountId, AccountKind};
use crate::domain::directory::AccountDirectory;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountRecord {
    pub id: AccountId,
    #[serde(default)]
    pub kind: Option<AccountKind>,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

impl TryFrom<AccountRecord> for Account {
    type Error = LedgerError;

    fn try_from(record: AccountRecord) -> Result<Self> {
        let kind = record.kind.unwrap_or_default();
        Ok(Account::with_kind(record.id, kind, record.balance)?)
    }
}

/// Reads the opening state of the ledger (`id, kind, balance`) from CSV.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn records(self) -> impl Iterator<Item = Result<AccountRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }

    /// Builds the directory; any malformed row, negative balance or
    /// duplicate id fails the whole load.
    pub fn into_directory(self) -> Result<AccountDirectory> {
        let mut directory = AccountDirectory::new();
        for record in self.records() {
            directory.insert(Account::try_from(record?)?)?;
        }
        Ok(directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_directory() {
        let data = "id, kind, balance\nA1, checking, 1000.00\nA2, , 200.00\nS1, savings, 50";
        let directory = AccountReader::new(data.as_bytes()).into_directory().unwrap();

        assert_eq!(directory.len(), 3);
        let a2 = directory.get("A2").unwrap();
        assert_eq!(a2.kind(), AccountKind::Checking);
        assert_eq!(a2.balance().to_string(), "200.00");
        assert_eq!(directory.get("S1").unwrap().kind(), AccountKind::Savings);
    }

    #[test]
    fn test_negative_balance_rejected() {
        let data = "id, kind, balance\nA1, checking, -1";
        let err = AccountReader::new(data.as_bytes()).into_directory().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let data = "id, kind, balance\nA1, checking, 1\nA1, savings, 2";
        let err = AccountReader::new(data.as_bytes()).into_directory().unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccount(_)));
    }

    #[test]
    fn test_record_conversion() {
        let record = AccountRecord {
            id: AccountId::from("A9"),
            kind: None,
            balance: dec!(3),
        };
        let account = Account::try_from(record).unwrap();
        assert_eq!(account.kind(), AccountKind::Checking);
        assert_eq!(account.balance(), dec!(3));
    }
}
