//! # Stored Event
//!
//! An event as kept in a ledger bucket: contents plus its position inside the
//! ledger. The ledger sequence lives on the bucket, so the cursor is derived.

use shared_types::ContractEvent;

use super::cursor::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub contents: ContractEvent,
    pub tx_index: u32,
    pub op_index: u32,
    pub event_index: u32,
}

impl Event {
    pub fn cursor(&self, ledger_seq: u32) -> Cursor {
        Cursor {
            ledger: ledger_seq,
            tx: self.tx_index,
            op: self.op_index,
            event: self.event_index,
        }
    }
}

/// Suffix of `events` whose cursors are `>= start`.
///
/// `events` must be sorted by `(tx, op, event)` and all belong to
/// `start.ledger`.
pub fn seek(events: &[Event], start: Cursor) -> &[Event] {
    let index = events.partition_point(|event| event.cursor(start.ledger) < start);
    &events[index..]
}
