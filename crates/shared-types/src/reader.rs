//! # Ledger Transaction Reader
//!
//! Walks the transactions of a [`LedgerCloseMeta`] in application order and
//! attaches their network-scoped hashes.

use sha2::{Digest, Sha256};

use crate::entities::{
    ContractEvent, Hash, LedgerCloseMeta, TransactionEnvelope, TransactionResult,
};
use crate::errors::LedgerReadError;

/// Highest 1-based transaction index in a ledger. Event ids keep 20 bits of it.
pub const MAX_TRANSACTIONS_PER_LEDGER: u32 = (1 << 20) - 1;

/// Most operations one transaction may carry. Event ids keep 12 bits of the
/// 0-based operation index.
pub const MAX_OPERATIONS_PER_TRANSACTION: u32 = 1 << 12;

/// Hash of the network passphrase. Scopes transaction hashes to one network.
pub fn network_id(network_passphrase: &str) -> Hash {
    Sha256::digest(network_passphrase.as_bytes()).into()
}

/// `sha256(network_id || payload)`.
pub fn transaction_hash(network_id: &Hash, payload: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(payload);
    hasher.finalize().into()
}

/// One transaction of a closed ledger, borrowed from the payload.
#[derive(Debug, Clone, Copy)]
pub struct LedgerTransaction<'a> {
    /// 1-based application order within the ledger.
    pub index: u32,
    /// Hash of the outer envelope.
    pub hash: Hash,
    /// Hash of the wrapped transaction for fee-bumps.
    pub inner_hash: Option<Hash>,
    pub envelope: &'a TransactionEnvelope,
    pub result: &'a TransactionResult,
    pub meta: &'a [u8],
    pub operation_events: &'a [Vec<ContractEvent>],
    pub diagnostic_events: &'a [ContractEvent],
}

impl<'a> LedgerTransaction<'a> {
    pub fn successful(&self) -> bool {
        self.result.successful
    }

    /// Contract events as `(op_index, event_index, event)` in emission order.
    pub fn events(&self) -> impl Iterator<Item = (u32, u32, &'a ContractEvent)> + 'a {
        let operation_events = self.operation_events;
        operation_events
            .iter()
            .enumerate()
            .flat_map(|(op_index, events)| {
                events
                    .iter()
                    .enumerate()
                    .map(move |(event_index, event)| (op_index as u32, event_index as u32, event))
            })
    }
}

/// Iterator over the transactions of one ledger.
///
/// Yields an error (and then stops) on the first malformed transaction.
pub struct LedgerTransactionReader<'a> {
    network_id: Hash,
    ledger: &'a LedgerCloseMeta,
    position: usize,
    failed: bool,
}

impl<'a> LedgerTransactionReader<'a> {
    pub fn new(network_passphrase: &str, ledger: &'a LedgerCloseMeta) -> Self {
        Self {
            network_id: network_id(network_passphrase),
            ledger,
            position: 0,
            failed: false,
        }
    }

    pub fn ledger_sequence(&self) -> u32 {
        self.ledger.ledger_sequence
    }

    fn read(&self, position: usize) -> Result<LedgerTransaction<'a>, LedgerReadError> {
        let tx = &self.ledger.transactions[position];
        let ledger = self.ledger.ledger_sequence;
        let index = check_index(ledger, position)?;

        if tx.envelope.payload().is_empty() {
            return Err(LedgerReadError::EmptyPayload { ledger, index });
        }
        let operations = tx.envelope.operation_count();
        if operations > MAX_OPERATIONS_PER_TRANSACTION {
            return Err(LedgerReadError::TooManyOperations {
                ledger,
                index,
                operations,
                max: MAX_OPERATIONS_PER_TRANSACTION,
            });
        }
        if tx.operation_events.len() > operations as usize {
            return Err(LedgerReadError::OperationEventsMismatch {
                ledger,
                index,
                reported: tx.operation_events.len(),
                operations,
            });
        }

        Ok(LedgerTransaction {
            index,
            hash: transaction_hash(&self.network_id, tx.envelope.payload()),
            inner_hash: tx
                .envelope
                .inner_payload()
                .map(|inner| transaction_hash(&self.network_id, inner)),
            envelope: &tx.envelope,
            result: &tx.result,
            meta: &tx.meta,
            operation_events: &tx.operation_events,
            diagnostic_events: &tx.diagnostic_events,
        })
    }
}

/// 1-based application index of the transaction at `position`.
fn check_index(ledger: u32, position: usize) -> Result<u32, LedgerReadError> {
    let index = u32::try_from(position + 1).unwrap_or(u32::MAX);
    if index > MAX_TRANSACTIONS_PER_LEDGER {
        return Err(LedgerReadError::TooManyTransactions {
            ledger,
            index,
            max: MAX_TRANSACTIONS_PER_LEDGER,
        });
    }
    Ok(index)
}

impl<'a> Iterator for LedgerTransactionReader<'a> {
    type Item = Result<LedgerTransaction<'a>, LedgerReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.ledger.transactions.len() {
            return None;
        }
        let item = self.read(self.position);
        self.position += 1;
        self.failed = item.is_err();
        Some(item)
    }
}
