use crate::domain::ports::{OutcomeSink, Receipt};
use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError};

/// An outcome sink that keeps every receipt in memory.
///
/// Clones share the same buffer, so one handle can be given to a run while
/// another inspects the results afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    receipts: Arc<Mutex<Vec<Receipt>>>,
}

impl RecordingSink {
    /// Creates a new, empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the receipts recorded so far, in arrival order.
    pub fn receipts(&self) -> Vec<Receipt> {
        self.receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutcomeSink for RecordingSink {
    fn inform(&mut self, receipt: &Receipt) -> Result<()> {
        self.receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(receipt.clone());
        Ok(())
    }
}
