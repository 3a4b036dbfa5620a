//! # Event Store
//!
//! Retains the contract events of the last `N` ledgers and serves ordered
//! range scans over them.
//!
//! Ingestion takes the write lock once per ledger. Scans hold the read lock
//! for their whole duration, so visitors must not block.

use parking_lot::RwLock;
use shared_types::{
    ContractEvent, ContractEventType, LedgerCloseMeta, LedgerInfo, LedgerTransactionReader,
    StoreRange,
};
use tracing::debug;

use lr_01_ledger_window::LedgerBucketWindow;

use crate::domain::cursor::Cursor;
use crate::domain::errors::EventStoreError;
use crate::domain::event::{seek, Event};

/// `[start, end)` interval of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRange {
    /// Inclusive start.
    pub start: Cursor,
    /// Raise `start` to the oldest retained ledger instead of failing.
    pub clamp_start: bool,
    /// Exclusive end.
    pub end: Cursor,
    /// Lower `end` to just past the newest retained ledger instead of failing.
    pub clamp_end: bool,
}

impl EventRange {
    /// Everything currently retained.
    pub fn all() -> Self {
        Self {
            start: Cursor::MIN,
            clamp_start: true,
            end: Cursor::MAX,
            clamp_end: true,
        }
    }
}

pub struct EventStore {
    network_passphrase: String,
    window: RwLock<LedgerBucketWindow<Vec<Event>>>,
}

impl EventStore {
    /// Create a store retaining the events of `retention_window` ledgers.
    pub fn new(
        network_passphrase: impl Into<String>,
        retention_window: u32,
    ) -> Result<Self, EventStoreError> {
        Ok(Self {
            network_passphrase: network_passphrase.into(),
            window: RwLock::new(LedgerBucketWindow::new(retention_window)?),
        })
    }

    /// Add the events of a newly closed ledger, evicting the oldest ledger
    /// once the window is full.
    ///
    /// Events of failed transactions and diagnostic events are skipped.
    pub fn ingest(&self, ledger: &LedgerCloseMeta) -> Result<(), EventStoreError> {
        let events = read_events(&self.network_passphrase, ledger)?;
        self.append(ledger.ledger_sequence, ledger.close_time, events)
    }

    fn append(
        &self,
        ledger_seq: u32,
        close_time: i64,
        events: Vec<Event>,
    ) -> Result<(), EventStoreError> {
        let count = events.len();
        let evicted = self.window.write().append(ledger_seq, close_time, events)?;
        debug!(
            ledger = ledger_seq,
            events = count,
            evicted_ledger = evicted.as_ref().map(|bucket| bucket.ledger_seq),
            "Ingested ledger events"
        );
        Ok(())
    }

    /// Visit every event in `range` in ascending cursor order.
    ///
    /// `visit` receives the event, its cursor and the ledger close time and
    /// returns `false` to stop early. Returns the sequence of the newest
    /// retained ledger, also when stopped early.
    pub fn scan<F>(&self, range: EventRange, mut visit: F) -> Result<u32, EventStoreError>
    where
        F: FnMut(&ContractEvent, Cursor, i64) -> bool,
    {
        let window = self.window.read();
        let range = validate_range(&window, range)?;

        let oldest = window.get(0).ledger_seq;
        let latest = window.get(window.len() - 1).ledger_seq;
        let first = range.start.ledger - oldest;

        for i in first..window.len() {
            let bucket = window.get(i);
            let events = if i == first {
                seek(&bucket.bucket_content, range.start)
            } else {
                &bucket.bucket_content[..]
            };
            for event in events {
                let cursor = event.cursor(bucket.ledger_seq);
                if cursor >= range.end {
                    return Ok(latest);
                }
                if !visit(&event.contents, cursor, bucket.ledger_close_timestamp) {
                    return Ok(latest);
                }
            }
        }
        Ok(latest)
    }

    /// Oldest and newest retained ledgers.
    pub fn ledger_range(&self) -> StoreRange {
        let window = self.window.read();
        match (window.first(), window.last()) {
            (Some(first), Some(last)) => StoreRange {
                first_ledger: LedgerInfo {
                    sequence: first.ledger_seq,
                    close_time: first.ledger_close_timestamp,
                },
                last_ledger: LedgerInfo {
                    sequence: last.ledger_seq,
                    close_time: last.ledger_close_timestamp,
                },
            },
            _ => StoreRange::default(),
        }
    }

    pub fn retention_window(&self) -> u32 {
        self.window.read().capacity()
    }
}

/// Check `range` against the window and apply clamping.
///
/// Checks run in a fixed order and the first failure wins.
fn validate_range(
    window: &LedgerBucketWindow<Vec<Event>>,
    mut range: EventRange,
) -> Result<EventRange, EventStoreError> {
    let (Some(oldest), Some(newest)) = (window.first(), window.last()) else {
        return Err(EventStoreError::EmptyStore);
    };

    let min = Cursor::ledger_start(oldest.ledger_seq);
    if range.start < min {
        if !range.clamp_start {
            return Err(EventStoreError::StartBeforeOldest);
        }
        range.start = min;
    }

    // No bound once the newest ledger is u32::MAX; every cursor is inside it.
    if let Some(max) = newest.ledger_seq.checked_add(1).map(Cursor::ledger_start) {
        if range.start >= max {
            return Err(EventStoreError::StartAfterNewest);
        }
        if range.end > max {
            if !range.clamp_end {
                return Err(EventStoreError::EndAfterLatest);
            }
            range.end = max;
        }
    }

    if range.start >= range.end {
        return Err(EventStoreError::StartNotBeforeEnd);
    }
    Ok(range)
}

/// Events of the successful transactions of `ledger`, in cursor order.
fn read_events(
    network_passphrase: &str,
    ledger: &LedgerCloseMeta,
) -> Result<Vec<Event>, EventStoreError> {
    let mut events = Vec::new();
    for tx in LedgerTransactionReader::new(network_passphrase, ledger) {
        let tx = tx?;
        if !tx.successful() {
            continue;
        }
        for (op_index, event_index, contents) in tx.events() {
            if contents.event_type == ContractEventType::Diagnostic {
                continue;
            }
            events.push(Event {
                contents: contents.clone(),
                tx_index: tx.index,
                op_index,
                event_index,
            });
        }
    }
    Ok(events)
}
