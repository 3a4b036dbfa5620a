//! # Domain Errors
//!
//! Lookups never fail (a miss is `None`), so every error here comes from
//! ingestion or construction.

use lr_01_ledger_window::WindowError;
use shared_types::LedgerReadError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionStoreError {
    #[error("error appending ledgers: {0}")]
    Window(#[from] WindowError),

    #[error("error reading ledger transactions: {0}")]
    Read(#[from] LedgerReadError),
}

impl TransactionStoreError {
    /// True when the caller broke an ingestion precondition.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Window(_) | Self::Read(_))
    }
}
