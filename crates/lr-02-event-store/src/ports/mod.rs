//! Ports for the event store.

pub mod inbound;

pub use inbound::EventStoreApi;
