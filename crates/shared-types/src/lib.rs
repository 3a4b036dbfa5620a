//! # Shared Types Crate
//!
//! Ledger payload model and summary types shared by the retention stores and
//! the RPC layer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `LedgerCloseMeta` is the only ingestion input.
//! - **One Hash Rule**: transaction hashes are computed in exactly one place,
//!   [`LedgerTransactionReader`], so every store agrees on them.

pub mod entities;
pub mod errors;
pub mod reader;

pub use entities::*;
pub use errors::*;
pub use reader::{
    network_id, transaction_hash, LedgerTransaction, LedgerTransactionReader,
    MAX_OPERATIONS_PER_TRANSACTION, MAX_TRANSACTIONS_PER_LEDGER,
};
