//! # Domain Entities
//!
//! A transaction as retained by the store, and what a lookup returns.

use serde::{Deserialize, Serialize};
use shared_types::{ContractEvent, Hash, LedgerInfo, TransactionEnvelope, TransactionResult};

/// Everything known about one applied transaction.
///
/// Shared between the outer hash and, for fee-bumps, the inner hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Hash of the outer envelope.
    pub hash: Hash,
    pub envelope: TransactionEnvelope,
    pub result: TransactionResult,
    pub meta: Vec<u8>,
    pub diagnostic_events: Vec<ContractEvent>,
    pub fee_bump: bool,
    /// 1-based position within the ledger.
    pub application_order: u32,
    /// Ledger that applied the transaction.
    pub ledger: LedgerInfo,
}

impl Transaction {
    pub fn successful(&self) -> bool {
        self.result.successful
    }
}

/// Hashes indexed for one ledger, in application order. Fee-bumps contribute
/// their inner hash first, then the outer hash.
pub type LedgerHashes = Vec<Hash>;

/// Debug helper: first 8 bytes of a hash as hex.
pub fn short_hash(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}
