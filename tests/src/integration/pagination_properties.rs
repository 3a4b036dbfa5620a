//! # Pagination Properties
//!
//! Paging through the event store one cursor at a time must visit exactly
//! the events a single full scan visits, whatever the retention window,
//! ledger shapes and page size.

#[cfg(test)]
mod tests {
    use lr_02_event_store::{Cursor, EventRange, EventStore};
    use proptest::prelude::*;
    use shared_types::LedgerCloseMeta;

    use crate::fixtures::{contract_event, ledger, transaction, PASSPHRASE};

    /// Ledger `sequence` with one successful transaction per entry of
    /// `events_per_tx`, each emitting that many events from one operation.
    fn shaped_ledger(sequence: u32, events_per_tx: &[u8]) -> LedgerCloseMeta {
        let transactions = events_per_tx
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let events = (0..count)
                    .map(|n| contract_event(1, b"transfer", &[i as u8, n]))
                    .collect();
                transaction(format!("tx-{}-{}", sequence, i), true, vec![events])
            })
            .collect();
        ledger(sequence, transactions)
    }

    fn page(store: &EventStore, start: Cursor, limit: usize) -> Vec<Cursor> {
        let range = EventRange {
            start,
            clamp_start: false,
            end: Cursor::MAX,
            clamp_end: true,
        };
        let mut cursors = Vec::new();
        store
            .scan(range, |_, cursor, _| {
                cursors.push(cursor);
                cursors.len() < limit
            })
            .unwrap();
        cursors
    }

    proptest! {
        #[test]
        fn prop_paging_visits_every_event_once(
            retention in 1u32..6,
            shapes in prop::collection::vec(prop::collection::vec(0u8..4, 0..4), 1..10),
            limit in 1usize..5,
        ) {
            let store = EventStore::new(PASSPHRASE, retention).unwrap();
            for (i, shape) in shapes.iter().enumerate() {
                store.ingest(&shaped_ledger(i as u32 + 1, shape)).unwrap();
            }

            let mut everything = Vec::new();
            store
                .scan(EventRange::all(), |_, cursor, _| {
                    everything.push(cursor);
                    true
                })
                .unwrap();

            let oldest = store.ledger_range().first_ledger.sequence;
            let mut paged = Vec::new();
            let mut start = Cursor::ledger_start(oldest);
            loop {
                let cursors = page(&store, start, limit);
                prop_assert!(cursors.len() <= limit);
                match cursors.last() {
                    Some(last) => start = last.successor(),
                    None => break,
                }
                paged.extend(cursors);
            }

            prop_assert_eq!(&paged, &everything);
            prop_assert!(paged.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
