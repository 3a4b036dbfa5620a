//! # Ledger-RPC Store Benchmarks
//!
//! | Path | Operation | Target |
//! |------|-----------|--------|
//! | Event store | ingest one ledger into a full window | < 100µs |
//! | Event store | filtered scan over the whole window | linear in events |
//! | Transaction store | lookup by hash | < 1µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lr_02_event_store::{EventFilter, EventRange, EventStore};
use lr_03_transaction_store::TransactionStore;
use lr_tests::fixtures::{busy_ledger, contract_event, hash_of, ledger, transaction, PASSPHRASE};
use shared_types::LedgerCloseMeta;
use std::time::Duration;

/// Ledger with `txs` successful transactions, two events each.
fn wide_ledger(sequence: u32, txs: u32) -> LedgerCloseMeta {
    let transactions = (0..txs)
        .map(|i| {
            transaction(
                format!("bench-{}-{}", sequence, i),
                true,
                vec![vec![
                    contract_event((i % 4) as u8, b"transfer", &i.to_be_bytes()),
                    contract_event((i % 4) as u8, b"mint", &i.to_be_bytes()),
                ]],
            )
        })
        .collect();
    ledger(sequence, transactions)
}

fn bench_event_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("lr-02-event-store");
    group.measurement_time(Duration::from_secs(5));

    for txs in [10u32, 100, 1000] {
        let store = EventStore::new(PASSPHRASE, 64).unwrap();
        let mut sequence = 0u32;
        group.throughput(Throughput::Elements(u64::from(txs) * 2));
        group.bench_with_input(BenchmarkId::new("ingest_ledger", txs), &txs, |b, &txs| {
            b.iter_batched(
                || {
                    sequence += 1;
                    wide_ledger(sequence, txs)
                },
                |ledger| store.ingest(black_box(&ledger)).unwrap(),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_event_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("lr-02-event-store");

    let store = EventStore::new(PASSPHRASE, 128).unwrap();
    for seq in 1..=128 {
        store.ingest(&wide_ledger(seq, 50)).unwrap();
    }
    let filter: EventFilter = serde_json::from_value(serde_json::json!({
        "contractIds": [hex::encode([1u8; 32])],
        "topics": [[hex::encode(b"mint")]]
    }))
    .unwrap();

    group.throughput(Throughput::Elements(128 * 50 * 2));
    group.bench_function("scan_full_window", |b| {
        b.iter(|| {
            let mut seen = 0u32;
            store
                .scan(EventRange::all(), |_event, _cursor, _close_time| {
                    seen += 1;
                    true
                })
                .unwrap();
            black_box(seen)
        })
    });
    group.bench_function("scan_filtered", |b| {
        b.iter(|| {
            let mut matched = 0u32;
            store
                .scan(EventRange::all(), |event, _cursor, _close_time| {
                    if filter.matches(event) {
                        matched += 1;
                    }
                    true
                })
                .unwrap();
            black_box(matched)
        })
    });
    group.finish();
}

fn bench_transaction_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lr-03-transaction-store");

    let store = TransactionStore::new(PASSPHRASE, 256).unwrap();
    for seq in 1..=256 {
        store.ingest(&busy_ledger(seq)).unwrap();
    }
    let hit = hash_of("ok-200");
    let miss = hash_of("never-ingested");

    group.bench_function("get_transaction_hit", |b| {
        b.iter(|| black_box(store.get_transaction(black_box(&hit))))
    });
    group.bench_function("get_transaction_miss", |b| {
        b.iter(|| black_box(store.get_transaction(black_box(&miss))))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_event_ingest,
    bench_event_scan,
    bench_transaction_lookup
);
criterion_main!(benches);
