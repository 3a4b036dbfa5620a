//! # Transaction Store (lr-03)
//!
//! Point lookups of applied transactions by hash over the last `N` ledgers.
//!
//! ## Dual Index
//!
//! ```text
//! LedgerBucketWindow<Vec<Hash>>        HashMap<Hash, Arc<Transaction>>
//! [ L6: h1 h2 | L7: h3 | L8: hi ho ] ──→ h1 h2 h3 hi ho
//!      ↑ evicted with L9: h1 h2 removed in the same write lock
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Index consistency | Evict and insert under one write lock | store.rs `ingest` |
//! | Fee-bump aliasing | Inner and outer hash share one `Arc` | store.rs `ingest` |
//! | Range always reported | `get_transaction` returns the range on a miss | store.rs |

pub mod domain;
pub mod ports;
pub mod store;

pub use domain::*;
pub use ports::TransactionStoreApi;
pub use store::TransactionStore;
