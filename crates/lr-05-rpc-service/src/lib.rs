//! # Ledger RPC Service (lr-05)
//!
//! JSON-RPC method handlers over the event and transaction stores, each
//! behind its own backlog and duration limiter, plus the ingestion fan-out
//! that keeps both stores current.
//!
//! ## Request Path
//!
//! ```text
//! RpcRequest ──→ MethodRegistry::dispatch ──→ Instrumented
//!                                               └─ RequestDuration
//!                                                    └─ BacklogQueue
//!                                                         └─ getEvents / getTransaction / ...
//! ```
//!
//! ## Ingestion Path
//!
//! ```text
//! LedgerCloseMeta ──→ LedgerIngestor ──┬──→ EventStore::ingest
//!                                      └──→ TransactionStore::ingest
//! ```
//!
//! ## Methods
//!
//! | Method | Store | Default limits |
//! |--------|-------|----------------|
//! | `getHealth` | transactions | 1000 queued, 5s |
//! | `getEvents` | events | 1000 queued, 10s |
//! | `getLatestLedger` | transactions | 1000 queued, 5s |
//! | `getTransaction` | transactions | 1000 queued, 5s |

pub mod config;
pub mod errors;
pub mod ingest;
pub mod methods;
pub mod registry;
pub mod service;

pub use config::ServiceConfig;
pub use errors::ServiceError;
pub use ingest::{IngestError, LedgerIngestor};
pub use registry::{global_http_layers, MethodRegistry, GLOBAL_LIMITER_NAME};
pub use service::RpcService;
