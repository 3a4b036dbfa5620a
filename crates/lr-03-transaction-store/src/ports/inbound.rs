//! # Inbound Ports (Driving Ports)
//!
//! Lookups the RPC layer performs against the transaction store.

use shared_types::{Hash, LedgerInfo, StoreRange};

use crate::domain::Transaction;
use crate::store::TransactionStore;

/// Read side of the transaction store.
pub trait TransactionStoreApi: Send + Sync {
    /// Transaction by outer or inner hash, plus the retained ledger range.
    fn get_transaction(&self, hash: &Hash) -> (Option<Transaction>, StoreRange);

    /// Newest retained ledger, default when empty.
    fn get_latest_ledger(&self) -> LedgerInfo;

    /// Oldest and newest retained ledgers.
    fn transaction_ledger_range(&self) -> StoreRange;
}

impl TransactionStoreApi for TransactionStore {
    fn get_transaction(&self, hash: &Hash) -> (Option<Transaction>, StoreRange) {
        TransactionStore::get_transaction(self, hash)
    }

    fn get_latest_ledger(&self) -> LedgerInfo {
        TransactionStore::get_latest_ledger(self)
    }

    fn transaction_ledger_range(&self) -> StoreRange {
        self.ledger_range()
    }
}
