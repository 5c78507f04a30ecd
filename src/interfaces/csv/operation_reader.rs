use crate::application::operation::Operation;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads scripted operations from a CSV source.
///
/// Expects a `type, account, amount, counterparty` header. Whitespace is
/// trimmed and short records are accepted, so the trailing counterparty can be
/// left out for deposits and withdrawals.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Wraps a script. Rows may stop after `amount`; a missing or empty
    /// counterparty column reads as `None`.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// One item per script row, in file order.
    ///
    /// A row with an unknown type or an unparseable amount yields an error in
    /// its slot and reading carries on with the next row, so item positions
    /// line up with the row numbers the teller reports. Negative amounts are
    /// passed through; refusing them is the transaction's job.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> + Send + 'static
    where
        R: Send + 'static,
    {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
