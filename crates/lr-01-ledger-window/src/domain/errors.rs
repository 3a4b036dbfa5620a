//! # Window Errors

use thiserror::Error;

/// Errors raised by [`crate::LedgerBucketWindow`].
///
/// All variants indicate a programming or configuration mistake in the
/// caller, never a condition a client request can trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Zero retention window.
    #[error("retention window must be positive")]
    InvalidCapacity,

    /// Append skipped, repeated or reordered a ledger.
    #[error("ledgers not contiguous: expected ledger sequence {expected} but received {received}")]
    NonContiguous { expected: u32, received: u32 },

    /// The newest bucket already holds `u32::MAX`.
    #[error("ledger sequence {last} has no successor")]
    SequenceExhausted { last: u32 },
}
