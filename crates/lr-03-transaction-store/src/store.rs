//! # Transaction Store
//!
//! Hash → transaction index over the last `N` ledgers.
//!
//! The window of per-ledger hash lists is authoritative; the map is a derived
//! view updated in the same critical section. Every hash in a live bucket
//! resolves in the map and every map entry belongs to a live ledger.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{Hash, LedgerCloseMeta, LedgerInfo, LedgerTransactionReader, StoreRange};
use tracing::debug;

use lr_01_ledger_window::{LedgerBucket, LedgerBucketWindow};

use crate::domain::{LedgerHashes, Transaction, TransactionStoreError};

struct Inner {
    transactions: HashMap<Hash, Arc<Transaction>>,
    transactions_by_ledger: LedgerBucketWindow<LedgerHashes>,
}

impl Inner {
    fn store_range(&self) -> StoreRange {
        match (
            self.transactions_by_ledger.first(),
            self.transactions_by_ledger.last(),
        ) {
            (Some(first), Some(last)) => StoreRange {
                first_ledger: ledger_info(first),
                last_ledger: ledger_info(last),
            },
            _ => StoreRange::default(),
        }
    }

    /// Drop the map entries of an evicted ledger. An entry re-indexed by a
    /// newer ledger stays.
    fn forget(&mut self, evicted: &LedgerBucket<LedgerHashes>) -> usize {
        let mut removed = 0;
        for hash in &evicted.bucket_content {
            let owned_by_evicted = self
                .transactions
                .get(hash)
                .is_some_and(|tx| tx.ledger.sequence == evicted.ledger_seq);
            if owned_by_evicted {
                self.transactions.remove(hash);
                removed += 1;
            }
        }
        removed
    }
}

fn ledger_info<T>(bucket: &LedgerBucket<T>) -> LedgerInfo {
    LedgerInfo {
        sequence: bucket.ledger_seq,
        close_time: bucket.ledger_close_timestamp,
    }
}

pub struct TransactionStore {
    network_passphrase: String,
    inner: RwLock<Inner>,
}

impl TransactionStore {
    pub fn new(
        network_passphrase: impl Into<String>,
        retention_window: u32,
    ) -> Result<Self, TransactionStoreError> {
        Ok(Self {
            network_passphrase: network_passphrase.into(),
            inner: RwLock::new(Inner {
                transactions: HashMap::new(),
                transactions_by_ledger: LedgerBucketWindow::new(retention_window)?,
            }),
        })
    }

    /// Index every transaction of a newly closed ledger.
    ///
    /// The ledger is read and hashed before the write lock is taken. On a
    /// contiguity error neither the window nor the map changes.
    pub fn ingest(&self, ledger: &LedgerCloseMeta) -> Result<(), TransactionStoreError> {
        let ledger_info = ledger.ledger_info();
        let mut hashes = Vec::with_capacity(ledger.transactions.len());
        let mut entries = Vec::with_capacity(ledger.transactions.len());

        for tx in LedgerTransactionReader::new(&self.network_passphrase, ledger) {
            let tx = tx?;
            let stored = Arc::new(Transaction {
                hash: tx.hash,
                envelope: tx.envelope.clone(),
                result: tx.result.clone(),
                meta: tx.meta.to_vec(),
                diagnostic_events: tx.diagnostic_events.to_vec(),
                fee_bump: tx.envelope.is_fee_bump(),
                application_order: tx.index,
                ledger: ledger_info,
            });
            if let Some(inner_hash) = tx.inner_hash {
                hashes.push(inner_hash);
                entries.push((inner_hash, Arc::clone(&stored)));
            }
            hashes.push(tx.hash);
            entries.push((tx.hash, stored));
        }

        let indexed = entries.len();
        let mut inner = self.inner.write();
        let evicted = inner.transactions_by_ledger.append(
            ledger_info.sequence,
            ledger_info.close_time,
            hashes,
        )?;
        let removed = evicted.as_ref().map_or(0, |bucket| inner.forget(bucket));
        inner.transactions.extend(entries);

        debug!(
            ledger = ledger_info.sequence,
            indexed,
            evicted_ledger = evicted.as_ref().map(|bucket| bucket.ledger_seq),
            removed,
            "Ingested ledger transactions"
        );
        Ok(())
    }

    /// Look up a transaction by outer or inner hash.
    ///
    /// The retained range is reported even on a miss so callers can tell
    /// "too old" from "unknown".
    pub fn get_transaction(&self, hash: &Hash) -> (Option<Transaction>, StoreRange) {
        let inner = self.inner.read();
        let range = inner.store_range();
        let tx = inner.transactions.get(hash).map(|tx| Transaction::clone(tx));
        (tx, range)
    }

    /// Newest retained ledger, or the default when empty.
    pub fn get_latest_ledger(&self) -> LedgerInfo {
        self.inner.read().store_range().last_ledger
    }

    pub fn ledger_range(&self) -> StoreRange {
        self.inner.read().store_range()
    }

    /// Number of indexed hashes (fee-bumps count twice).
    pub fn indexed_hashes(&self) -> usize {
        self.inner.read().transactions.len()
    }
}
