//! # Ingest and Query
//!
//! Closed ledgers go in through `RpcService::on_ledger_closed` and come back
//! out through `dispatch`, exercising reader, window, both stores and the
//! method handlers together.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use lr_02_event_store::{Cursor, EventRange, EventStore};
    use lr_04_request_limiters::{codes, RpcRequest};
    use lr_05_rpc_service::RpcService;
    use serde_json::{json, Value};
    use shared_types::LedgerCloseMeta;
    use tokio_util::sync::CancellationToken;

    use crate::fixtures::{
        busy_ledger, close_time, fee_bump, hash_of, ledger, service, transaction, PASSPHRASE,
    };

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn ingest_all(service: &RpcService, ledgers: impl IntoIterator<Item = LedgerCloseMeta>) {
        for ledger in ledgers {
            service.on_ledger_closed(&ledger).unwrap();
        }
    }

    async fn call(service: &RpcService, method: &str, params: Value) -> Result<Value, (i32, String)> {
        service
            .dispatch(CancellationToken::new(), RpcRequest::new(method, params))
            .await
            .map_err(|e| (e.code, e.message))
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_events_paginate_across_ledgers() {
        let service = service(10, 10);
        ingest_all(&service, (1..=6).map(busy_ledger));

        let first = call(
            &service,
            "getEvents",
            json!({ "startLedger": 1, "pagination": { "limit": 4 } }),
        )
        .await
        .unwrap();
        let events = first["events"].as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(first["latestLedger"], 6);

        // Failed transactions never contribute events.
        assert!(events
            .iter()
            .all(|e| e["contractId"] == hex::encode([1u8; 32])));
        assert_eq!(events[0]["id"], Cursor::new(1, 1, 0, 0).to_string());

        let cursor = events[3]["pagingToken"].clone();
        let second = call(
            &service,
            "getEvents",
            json!({ "pagination": { "cursor": cursor, "limit": 4 } }),
        )
        .await
        .unwrap();
        let ledgers: Vec<u64> = second["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["ledger"].as_u64().unwrap())
            .collect();
        assert_eq!(ledgers, vec![5, 6]);

        let last = second["events"][1]["pagingToken"].clone();
        let third = call(
            &service,
            "getEvents",
            json!({ "pagination": { "cursor": last } }),
        )
        .await
        .unwrap();
        assert_eq!(third["events"], json!([]));
    }

    #[tokio::test]
    async fn test_evicted_start_ledger_is_invalid_request() {
        let service = service(2, 10);
        ingest_all(&service, (1..=4).map(busy_ledger));

        let (code, message) = call(&service, "getEvents", json!({ "startLedger": 1 }))
            .await
            .unwrap_err();
        assert_eq!(code, codes::INVALID_REQUEST);
        assert_eq!(message, "start is before oldest ledger");

        let ok = call(&service, "getEvents", json!({ "startLedger": 3 }))
            .await
            .unwrap();
        assert_eq!(ok["events"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_ledgers_are_skipped() {
        let service = service(10, 10);
        ingest_all(
            &service,
            vec![busy_ledger(5), ledger(6, vec![]), busy_ledger(7), busy_ledger(8)],
        );

        let response = call(&service, "getEvents", json!({ "startLedger": 5 }))
            .await
            .unwrap();
        let ledgers: Vec<u64> = response["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["ledger"].as_u64().unwrap())
            .collect();
        assert_eq!(ledgers, vec![5, 7, 8]);
        assert_eq!(response["latestLedger"], 8);
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    #[tokio::test]
    async fn test_transaction_lookup_follows_retention() {
        let service = service(10, 3);
        ingest_all(
            &service,
            (1..=5).map(|seq| ledger(seq, vec![transaction(format!("tx-{}", seq), true, vec![])])),
        );

        let evicted = call(
            &service,
            "getTransaction",
            json!({ "hash": hex::encode(hash_of("tx-1")) }),
        )
        .await
        .unwrap();
        assert_eq!(evicted["status"], "NOT_FOUND");
        assert_eq!(evicted["oldestLedger"], 3);
        assert_eq!(evicted["latestLedger"], 5);
        assert_eq!(evicted["latestLedgerCloseTime"], close_time(5));

        let found = call(
            &service,
            "getTransaction",
            json!({ "hash": hex::encode(hash_of("tx-4")) }),
        )
        .await
        .unwrap();
        assert_eq!(found["status"], "SUCCESS");
        assert_eq!(found["ledger"], 4);
        assert_eq!(found["applicationOrder"], 1);
        assert_eq!(found["feeBump"], false);
        assert_eq!(found["envelope"], hex::encode("tx-4"));
    }

    #[tokio::test]
    async fn test_fee_bump_and_failed_transactions() {
        let service = service(10, 10);
        ingest_all(
            &service,
            vec![ledger(
                1,
                vec![
                    transaction("plain-failed", false, vec![]),
                    fee_bump("outer", "inner"),
                ],
            )],
        );

        let failed = call(
            &service,
            "getTransaction",
            json!({ "hash": hex::encode(hash_of("plain-failed")) }),
        )
        .await
        .unwrap();
        assert_eq!(failed["status"], "FAILED");

        for payload in ["outer", "inner"] {
            let bumped = call(
                &service,
                "getTransaction",
                json!({ "hash": hex::encode(hash_of(payload)) }),
            )
            .await
            .unwrap();
            assert_eq!(bumped["status"], "SUCCESS");
            assert_eq!(bumped["feeBump"], true);
            assert_eq!(bumped["applicationOrder"], 2);
        }

        let (code, _) = call(&service, "getTransaction", json!({ "hash": "abcd" }))
            .await
            .unwrap_err();
        assert_eq!(code, codes::INVALID_PARAMS);
    }

    // =========================================================================
    // LEDGER STATUS
    // =========================================================================

    #[tokio::test]
    async fn test_latest_ledger_and_health() {
        let service = service(10, 10);

        let (code, _) = call(&service, "getHealth", Value::Null).await.unwrap_err();
        assert_eq!(code, codes::INTERNAL_ERROR);

        let fresh = LedgerCloseMeta {
            close_time: now(),
            ..ledger(1, vec![])
        };
        service.on_ledger_closed(&fresh).unwrap();

        let latest = call(&service, "getLatestLedger", Value::Null).await.unwrap();
        assert_eq!(latest["sequence"], 1);

        let health = call(&service, "getHealth", Value::Null).await.unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["latestLedger"], 1);
        assert_eq!(health["ledgerRetentionWindow"], 10);
    }

    #[tokio::test]
    async fn test_stale_ledger_is_unhealthy() {
        let service = service(10, 10);
        service.on_ledger_closed(&ledger(1, vec![])).unwrap();

        let (code, message) = call(&service, "getHealth", Value::Null).await.unwrap_err();
        assert_eq!(code, codes::INTERNAL_ERROR);
        assert!(message.contains("is too high"));
    }

    // =========================================================================
    // INGESTION
    // =========================================================================

    #[test]
    fn test_gap_leaves_both_stores_untouched() {
        let service = service(5, 5);
        service.on_ledger_closed(&busy_ledger(1)).unwrap();

        let failures = service.on_ledger_closed(&busy_ledger(3)).unwrap_err();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.is_invariant_violation()));

        let ingestor = service.ingestor();
        assert_eq!(ingestor.transaction_store().get_latest_ledger().sequence, 1);
        assert_eq!(ingestor.event_store().ledger_range().last_ledger.sequence, 1);
        service.on_ledger_closed(&busy_ledger(2)).unwrap();
    }

    /// Readers scanning while a writer ingests always see a consistent,
    /// ascending window.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_scans_consistent_under_concurrent_ingest() {
        let store = Arc::new(EventStore::new(PASSPHRASE, 8).unwrap());
        store.ingest(&busy_ledger(1)).unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || {
                for seq in 2..=300 {
                    store.ingest(&busy_ledger(seq)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::task::spawn_blocking(move || {
                    for _ in 0..200 {
                        let mut previous: Option<Cursor> = None;
                        let mut ledgers = Vec::new();
                        let latest = store
                            .scan(EventRange::all(), |_event, cursor, _close_time| {
                                if let Some(prev) = previous {
                                    assert!(prev < cursor);
                                }
                                previous = Some(cursor);
                                ledgers.push(cursor.ledger);
                                true
                            })
                            .unwrap();
                        // One event per retained ledger, contiguous, ending at latest.
                        assert!(ledgers.len() <= 8);
                        assert_eq!(ledgers.last().copied(), Some(latest));
                        assert!(ledgers.windows(2).all(|w| w[1] == w[0] + 1));
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
