//! # Error Types
//!
//! Errors raised while interpreting a closed-ledger payload.

use thiserror::Error;

/// Errors raised by [`crate::LedgerTransactionReader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerReadError {
    /// Envelope carries no payload to hash.
    #[error("transaction {index} in ledger {ledger} has an empty envelope payload")]
    EmptyPayload { ledger: u32, index: u32 },

    /// Events reported for operations the envelope does not contain.
    #[error(
        "transaction {index} in ledger {ledger} reports events for {reported} operations but has {operations}"
    )]
    OperationEventsMismatch {
        ledger: u32,
        index: u32,
        reported: usize,
        operations: u32,
    },

    /// Application index beyond what an event id can encode.
    #[error(
        "transaction {index} in ledger {ledger} exceeds the limit of {max} transactions per ledger"
    )]
    TooManyTransactions { ledger: u32, index: u32, max: u32 },

    /// Operation count beyond what an event id can encode.
    #[error(
        "transaction {index} in ledger {ledger} has {operations} operations, more than the limit of {max}"
    )]
    TooManyOperations {
        ledger: u32,
        index: u32,
        operations: u32,
        max: u32,
    },
}
