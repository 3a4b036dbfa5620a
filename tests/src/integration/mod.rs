//! Cross-crate flows: ingestion through the stores to the RPC methods, and
//! the limiter stack wrapped around them.

pub mod ingest_and_query;
pub mod limiter_stack;
pub mod pagination_properties;
