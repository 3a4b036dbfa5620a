//! # Inbound Ports (Driving Ports)
//!
//! Query API the RPC layer calls on the event store.

use shared_types::{ContractEvent, StoreRange};

use crate::domain::{Cursor, EventStoreError};
use crate::store::{EventRange, EventStore};

/// Read side of the event store.
///
/// Object safe so method handlers can hold an `Arc<dyn EventStoreApi>`.
pub trait EventStoreApi: Send + Sync {
    /// Visit events in `range` in cursor order until `visit` returns `false`.
    ///
    /// ## Returns
    ///
    /// - `Ok(seq)`: sequence of the newest retained ledger
    /// - `Err(..)`: one of the range errors, nothing visited
    fn scan_events(
        &self,
        range: EventRange,
        visit: &mut dyn FnMut(&ContractEvent, Cursor, i64) -> bool,
    ) -> Result<u32, EventStoreError>;

    /// Oldest and newest retained ledgers.
    fn event_ledger_range(&self) -> StoreRange;
}

impl EventStoreApi for EventStore {
    fn scan_events(
        &self,
        range: EventRange,
        visit: &mut dyn FnMut(&ContractEvent, Cursor, i64) -> bool,
    ) -> Result<u32, EventStoreError> {
        self.scan(range, visit)
    }

    fn event_ledger_range(&self) -> StoreRange {
        self.ledger_range()
    }
}
