//! Ports for the transaction store.

pub mod inbound;

pub use inbound::TransactionStoreApi;
