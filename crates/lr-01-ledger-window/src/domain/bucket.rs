//! # Ledger Bucket
//!
//! One closed ledger's worth of content.

use serde::{Deserialize, Serialize};

/// Content produced by a single ledger, tagged with its sequence and close time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBucket<T> {
    pub ledger_seq: u32,
    /// Unix close timestamp (seconds).
    pub ledger_close_timestamp: i64,
    pub bucket_content: T,
}

impl<T> LedgerBucket<T> {
    pub fn new(ledger_seq: u32, ledger_close_timestamp: i64, bucket_content: T) -> Self {
        Self {
            ledger_seq,
            ledger_close_timestamp,
            bucket_content,
        }
    }
}
