//! # Domain Errors
//!
//! Error types for the event store.
//!
//! Range errors are client-recoverable and leave the store untouched. Window
//! errors raised during ingestion mean the caller broke ledger ordering.

use lr_01_ledger_window::WindowError;
use shared_types::LedgerReadError;
use thiserror::Error;

/// Malformed cursor string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("invalid event id {0}")]
    InvalidFormat(String),
}

/// Rejected event filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("maximum {max} contract IDs per filter")]
    TooManyContractIds { max: usize },

    #[error("contract ID {position} invalid")]
    InvalidContractId { position: usize },

    #[error("maximum {max} topics per filter")]
    TooManyTopics { max: usize },

    #[error("topic {position} invalid: topic must have between 1 and {max} segments")]
    InvalidTopicLength { position: usize, max: usize },

    #[error("if set, type must be either 'system' or 'contract'")]
    InvalidEventType,
}

/// Errors raised by [`crate::EventStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventStoreError {
    #[error("event store is empty")]
    EmptyStore,

    #[error("start is before oldest ledger")]
    StartBeforeOldest,

    #[error("start is after newest ledger")]
    StartAfterNewest,

    #[error("end is after latest ledger")]
    EndAfterLatest,

    #[error("start is not before end")]
    StartNotBeforeEnd,

    #[error("error appending ledgers: {0}")]
    Window(#[from] WindowError),

    #[error("error reading ledger transactions: {0}")]
    Read(#[from] LedgerReadError),
}

impl EventStoreError {
    /// True when the caller violated an ingestion precondition rather than
    /// sending a bad query.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Window(_) | Self::Read(_))
    }

    /// True for errors describing an unsatisfiable scan range.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyStore
                | Self::StartBeforeOldest
                | Self::StartAfterNewest
                | Self::EndAfterLatest
                | Self::StartNotBeforeEnd
        )
    }
}
