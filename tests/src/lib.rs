//! # Ledger-RPC Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks for ingest and scan
//! └── src/
//!     ├── fixtures.rs   # ledger and transaction builders
//!     └── integration/  # cross-crate flows
//!         ├── ingest_and_query.rs
//!         └── limiter_stack.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lr-tests
//! cargo test -p lr-tests integration::limiter_stack
//! cargo bench -p lr-tests
//! ```

pub mod fixtures;
pub mod integration;
