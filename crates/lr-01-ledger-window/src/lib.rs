//! # Ledger Bucket Window (lr-01)
//!
//! A fixed-capacity ring of per-ledger buckets. Each store that retains the
//! last `N` ledgers of something (events, transaction hashes) keeps it in a
//! [`LedgerBucketWindow`] and locks it itself.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Contiguity | `append` accepts only `oldest + len`, rejects without mutating |
//! | Capacity | `len() <= capacity()`; a full window evicts its oldest bucket |
//! | Order | `get(0)` is the oldest bucket, `get(len - 1)` the newest |
//!
//! ```text
//! [ L8 | L9 | L6 | L7 ]   capacity 4, next accepted L10
//!             ↑
//!           start = get(0), the oldest bucket
//! ```

pub mod domain;

pub use domain::bucket::LedgerBucket;
pub use domain::errors::WindowError;
pub use domain::window::LedgerBucketWindow;
