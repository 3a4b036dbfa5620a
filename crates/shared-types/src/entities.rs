//! # Core Ledger Entities
//!
//! The payload handed to the retention stores once per closed ledger, and the
//! summary types the stores report back.
//!
//! ## Clusters
//!
//! - **Ledger**: `LedgerCloseMeta`, `TransactionMeta`, `TransactionEnvelope`
//! - **Events**: `ContractEvent`, `ContractEventType`
//! - **Summaries**: `LedgerInfo`, `StoreRange`

use serde::{Deserialize, Serialize};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

// =============================================================================
// CLUSTER A: SUMMARIES
// =============================================================================

/// Sequence and close time of one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerInfo {
    /// Ledger sequence number.
    pub sequence: u32,
    /// Unix close timestamp (seconds).
    pub close_time: i64,
}

/// Oldest and newest ledgers currently retained by a store.
///
/// Both ends are `LedgerInfo::default()` when the store is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreRange {
    pub first_ledger: LedgerInfo,
    pub last_ledger: LedgerInfo,
}

// =============================================================================
// CLUSTER B: EVENTS
// =============================================================================

/// Origin of a contract event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractEventType {
    /// Emitted by the host itself (e.g. fee or upgrade bookkeeping).
    System,
    /// Emitted by a contract.
    Contract,
    /// Debug output; never retained by the event store.
    Diagnostic,
}

impl ContractEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Contract => "contract",
            Self::Diagnostic => "diagnostic",
        }
    }
}

/// One event emitted while applying an operation.
///
/// Topics and data are opaque encoded values; the stores never look inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEvent {
    pub event_type: ContractEventType,
    /// Emitting contract, absent for some system events.
    pub contract_id: Option<Hash>,
    pub topics: Vec<Vec<u8>>,
    pub data: Vec<u8>,
}

// =============================================================================
// CLUSTER C: LEDGER PAYLOAD
// =============================================================================

/// Signed transaction envelope as submitted to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEnvelope {
    /// A plain transaction.
    Transaction {
        /// Encoded signature payload the hash is computed over.
        payload: Vec<u8>,
        operation_count: u32,
    },
    /// A fee-bump wrapping an inner transaction.
    FeeBump {
        payload: Vec<u8>,
        /// Payload of the wrapped transaction.
        inner_payload: Vec<u8>,
        /// Operation count of the wrapped transaction.
        operation_count: u32,
    },
}

impl TransactionEnvelope {
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Transaction { payload, .. } | Self::FeeBump { payload, .. } => payload,
        }
    }

    pub fn inner_payload(&self) -> Option<&[u8]> {
        match self {
            Self::Transaction { .. } => None,
            Self::FeeBump { inner_payload, .. } => Some(inner_payload),
        }
    }

    pub fn operation_count(&self) -> u32 {
        match self {
            Self::Transaction {
                operation_count, ..
            }
            | Self::FeeBump {
                operation_count, ..
            } => *operation_count,
        }
    }

    pub fn is_fee_bump(&self) -> bool {
        matches!(self, Self::FeeBump { .. })
    }
}

/// Outcome of applying a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionResult {
    pub successful: bool,
    pub fee_charged: i64,
    /// Encoded result as produced by the node.
    pub encoded: Vec<u8>,
}

/// Everything the node reports about one applied transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub envelope: TransactionEnvelope,
    pub result: TransactionResult,
    /// Encoded application meta (ledger entry changes).
    pub meta: Vec<u8>,
    /// Contract events grouped by operation index.
    pub operation_events: Vec<Vec<ContractEvent>>,
    pub diagnostic_events: Vec<ContractEvent>,
}

/// A closed ledger, delivered once per sequence number in increasing order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerCloseMeta {
    pub ledger_sequence: u32,
    /// Unix close timestamp (seconds).
    pub close_time: i64,
    /// Transactions in application order.
    pub transactions: Vec<TransactionMeta>,
}

impl LedgerCloseMeta {
    pub fn ledger_info(&self) -> LedgerInfo {
        LedgerInfo {
            sequence: self.ledger_sequence,
            close_time: self.close_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_accessors() {
        let plain = TransactionEnvelope::Transaction {
            payload: vec![1, 2],
            operation_count: 3,
        };
        assert_eq!(plain.payload(), &[1, 2]);
        assert!(plain.inner_payload().is_none());
        assert!(!plain.is_fee_bump());
        assert_eq!(plain.operation_count(), 3);

        let bump = TransactionEnvelope::FeeBump {
            payload: vec![9],
            inner_payload: vec![1, 2],
            operation_count: 1,
        };
        assert_eq!(bump.inner_payload(), Some(&[1u8, 2][..]));
        assert!(bump.is_fee_bump());
    }

    #[test]
    fn test_store_range_default_is_zeroed() {
        let range = StoreRange::default();
        assert_eq!(range.first_ledger.sequence, 0);
        assert_eq!(range.last_ledger.close_time, 0);
    }

    #[test]
    fn test_event_type_serializes_lowercase() {
        let json = serde_json::to_string(&ContractEventType::Contract).unwrap();
        assert_eq!(json, "\"contract\"");
    }
}
