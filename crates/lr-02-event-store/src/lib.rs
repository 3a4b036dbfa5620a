//! # Event Store (lr-02)
//!
//! In-memory retention window of contract events, scanned by cursor.
//!
//! ## Data Flow
//!
//! ```text
//! LedgerCloseMeta ──ingest──→ [LedgerTransactionReader] ──→ Vec<Event> per ledger
//!                                                              │
//!                                                              ↓
//! getEvents ──scan(EventRange)──→ [LedgerBucketWindow<Vec<Event>>] ──→ visitor
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Cursor order | Events stored in `(tx, op, event)` order per ledger | store.rs `read_events` |
//! | Range checks | Fixed validation order, first failure wins | store.rs `validate_range` |
//! | Scan isolation | Whole scan under one read lock | store.rs `scan` |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): cursor, event, filter, errors
//! - **Ports Layer** (`ports/`): `EventStoreApi` consumed by the RPC layer
//! - **Store** (`store.rs`): the locked window itself

pub mod domain;
pub mod ports;
pub mod store;

pub use domain::*;
pub use ports::EventStoreApi;
pub use store::{EventRange, EventStore};
