//! Builders for closed ledgers.
//!
//! Close times start at [`GENESIS_CLOSE_TIME`] and advance five seconds per
//! ledger, so `close_time(seq)` is predictable in assertions.

use lr_05_rpc_service::{RpcService, ServiceConfig};
use prometheus::Registry;
use shared_types::{
    network_id, transaction_hash, ContractEvent, ContractEventType, Hash, LedgerCloseMeta,
    TransactionEnvelope, TransactionMeta, TransactionResult,
};

pub const PASSPHRASE: &str = "Ledger RPC Integration Network";
pub const GENESIS_CLOSE_TIME: i64 = 1_700_000_000;

pub fn close_time(sequence: u32) -> i64 {
    GENESIS_CLOSE_TIME + i64::from(sequence) * 5
}

pub fn contract_event(contract: u8, topic: &[u8], data: &[u8]) -> ContractEvent {
    ContractEvent {
        event_type: ContractEventType::Contract,
        contract_id: Some([contract; 32]),
        topics: vec![topic.to_vec()],
        data: data.to_vec(),
    }
}

/// A plain transaction with one operation per event list.
pub fn transaction(
    payload: impl Into<Vec<u8>>,
    successful: bool,
    operation_events: Vec<Vec<ContractEvent>>,
) -> TransactionMeta {
    let payload = payload.into();
    TransactionMeta {
        envelope: TransactionEnvelope::Transaction {
            operation_count: operation_events.len().max(1) as u32,
            payload: payload.clone(),
        },
        result: TransactionResult {
            successful,
            fee_charged: 100,
            encoded: vec![u8::from(successful)],
        },
        meta: payload,
        operation_events,
        diagnostic_events: vec![],
    }
}

pub fn fee_bump(payload: impl Into<Vec<u8>>, inner_payload: impl Into<Vec<u8>>) -> TransactionMeta {
    let payload = payload.into();
    TransactionMeta {
        envelope: TransactionEnvelope::FeeBump {
            payload: payload.clone(),
            inner_payload: inner_payload.into(),
            operation_count: 1,
        },
        ..transaction(payload, true, vec![])
    }
}

pub fn ledger(sequence: u32, transactions: Vec<TransactionMeta>) -> LedgerCloseMeta {
    LedgerCloseMeta {
        ledger_sequence: sequence,
        close_time: close_time(sequence),
        transactions,
    }
}

/// Ledger with one successful transaction emitting a contract-1 `transfer`
/// event, and one failed transaction whose events must never be served.
pub fn busy_ledger(sequence: u32) -> LedgerCloseMeta {
    let seq = sequence.to_be_bytes();
    ledger(
        sequence,
        vec![
            transaction(
                format!("ok-{}", sequence),
                true,
                vec![vec![contract_event(1, b"transfer", &seq)]],
            ),
            transaction(
                format!("failed-{}", sequence),
                false,
                vec![vec![contract_event(2, b"transfer", &seq)]],
            ),
        ],
    )
}

pub fn hash_of(payload: impl AsRef<[u8]>) -> Hash {
    transaction_hash(&network_id(PASSPHRASE), payload.as_ref())
}

pub fn config(event_retention: u32, transaction_retention: u32) -> ServiceConfig {
    ServiceConfig {
        network_passphrase: PASSPHRASE.to_string(),
        event_ledger_retention_window: event_retention,
        transaction_ledger_retention_window: transaction_retention,
        ..ServiceConfig::default()
    }
}

/// Service with its limiter metrics in a private registry.
pub fn service(event_retention: u32, transaction_retention: u32) -> RpcService {
    RpcService::new(config(event_retention, transaction_retention), &Registry::new())
        .expect("valid test configuration")
}
